//! CSV export of discovered contacts, prefixed by a compliance notice.

mod error;

pub use error::ExportError;

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::contact::Contact;
use crate::pipeline::ValidationVerdict;

pub const DEFAULT_FILENAME: &str = "followup_contacts.csv";
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const LEGAL_NOTICE: &str = "\
# HR CONTACT DISCOVERY TOOL - LEGAL & ETHICAL NOTICE
#
# This file contains contact information for PROFESSIONAL B2B USE ONLY.
#
# REQUIREMENTS FOR USE:
# 1. Only use for legitimate job application follow-up purposes
# 2. MUST include an opt-out/unsubscribe option in ALL emails sent
# 3. Comply with GDPR, CAN-SPAM Act, and other applicable regulations
# 4. Respect data subject rights (access, correction, deletion)
# 5. Do NOT use for spam, marketing, or unsolicited communications
# 6. Obtain explicit consent where required by law
#
# PRIVACY NOTICE:
# - This data should be stored securely and deleted when no longer needed
# - Do not share this data with third parties without proper authorization
# - Personal email addresses (@gmail, @yahoo, etc.) should NOT be used
#
# By using this data, you agree to comply with all applicable laws and regulations.
#
";

/// One CSV line; field order is the column order.
#[derive(Serialize)]
struct Row<'a> {
    name: &'a str,
    title: &'a str,
    email: Option<&'a str>,
    linkedin_url: &'a str,
    email_valid: Option<bool>,
    mx_valid: Option<bool>,
    validation_message: Option<&'a str>,
    company_domain: &'a str,
    export_date: &'a str,
}

#[derive(Debug, Clone)]
pub struct ContactExporter {
    output_dir: PathBuf,
    include_notice: bool,
    export_date: Option<NaiveDateTime>,
}

impl ContactExporter {
    /// Creates `output_dir` (and parents) if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)
            .map_err(|source| ExportError::create_dir(&output_dir, source))?;
        Ok(Self {
            output_dir,
            include_notice: true,
            export_date: None,
        })
    }

    pub fn with_notice(mut self, include: bool) -> Self {
        self.include_notice = include;
        self
    }

    /// Pins the `export_date` column instead of using the local clock.
    pub fn with_export_date(mut self, date: NaiveDateTime) -> Self {
        self.export_date = Some(date);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Serializes `contacts` to CSV bytes, notice included.
    pub fn render(&self, contacts: &[Contact]) -> Result<Vec<u8>, ExportError> {
        let date = self
            .export_date
            .unwrap_or_else(|| Local::now().naive_local())
            .format(DATE_FORMAT)
            .to_string();

        let mut out = Vec::new();
        if self.include_notice {
            out.extend_from_slice(LEGAL_NOTICE.as_bytes());
        }
        let mut writer = csv::Writer::from_writer(out);
        for contact in contacts {
            writer.serialize(Row {
                name: &contact.name,
                title: &contact.title,
                email: contact.email.as_deref(),
                linkedin_url: &contact.linkedin_url,
                email_valid: contact.email_valid,
                mx_valid: contact.mx_valid,
                validation_message: contact.validation_message.as_deref(),
                company_domain: &contact.company_domain,
                export_date: &date,
            })?;
        }
        writer
            .into_inner()
            .map_err(|err| ExportError::Csv(err.into_error().into()))
    }

    /// Writes `contacts` to `output_dir/filename`. Nothing is written for an empty list.
    pub fn export_to_csv(
        &self,
        contacts: &[Contact],
        filename: &str,
    ) -> Result<Option<PathBuf>, ExportError> {
        if contacts.is_empty() {
            tracing::warn!("no contacts to export");
            return Ok(None);
        }
        let path = self.output_dir.join(filename);
        let bytes = self.render(contacts)?;
        write_all_atomically(&path, &bytes)?;
        tracing::info!(path = %path.display(), count = contacts.len(), "contacts exported");
        Ok(Some(path))
    }

    /// Copies verdict `i` onto contact `i`, then exports. Extra contacts keep their
    /// current validation fields.
    pub fn export_with_validation(
        &self,
        contacts: &mut [Contact],
        verdicts: &[ValidationVerdict],
        filename: &str,
    ) -> Result<Option<PathBuf>, ExportError> {
        for (contact, verdict) in contacts.iter_mut().zip(verdicts) {
            contact.apply_verdict(verdict);
        }
        self.export_to_csv(contacts, filename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub total_contacts: usize,
    pub valid_emails: usize,
    pub with_linkedin: usize,
    pub unique_companies: usize,
}

impl ExportSummary {
    pub fn of(contacts: &[Contact]) -> Self {
        Self {
            total_contacts: contacts.len(),
            valid_emails: contacts.iter().filter(|c| c.has_valid_email()).count(),
            with_linkedin: contacts.iter().filter(|c| !c.linkedin_url.is_empty()).count(),
            unique_companies: contacts
                .iter()
                .map(|c| c.company_domain.as_str())
                .collect::<HashSet<_>>()
                .len(),
        }
    }
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Contacts:      {}", self.total_contacts)?;
        writeln!(f, "Valid Emails:        {}", self.valid_emails)?;
        writeln!(f, "LinkedIn Profiles:   {}", self.with_linkedin)?;
        write!(f, "Unique Companies:    {}", self.unique_companies)
    }
}

fn write_all_atomically(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let written = File::create(&tmp)
        .and_then(|mut f| {
            f.write_all(bytes)?;
            f.sync_all()
        })
        .map_err(|source| ExportError::write(&tmp, source))
        .and_then(|()| fs::rename(&tmp, path).map_err(|source| ExportError::write(path, source)));
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}
