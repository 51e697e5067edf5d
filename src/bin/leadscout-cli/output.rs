use std::fmt::Display;
use std::path::Path;

use anyhow::Result;
use leadscout::lookup::HunterVerification;
use leadscout::{AppliedPattern, Contact, ExportSummary, ValidationVerdict};
use serde::Serialize;

const RULE: &str = "────────────────────────────────────────────────────────────";
const DOUBLE_RULE: &str = "============================================================";

/// Human progress goes to stdout, or to stderr when stdout carries the JSON report.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    json: bool,
}

impl Console {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn line(&self, text: impl Display) {
        if self.json {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }

    pub fn rule(&self) {
        self.line(RULE);
    }

    pub fn step(&self, index: usize, title: &str) {
        self.line(format_args!("\n[STEP {index}/4] {title}"));
    }
}

#[derive(Debug, Serialize)]
pub struct HunterCheck {
    pub email: String,
    pub verification: Option<HunterVerification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub company: &'a str,
    pub domain: &'a str,
    pub pattern: &'a AppliedPattern,
    pub contacts: &'a [Contact],
    pub validations: &'a [ValidationVerdict],
    pub hunter: &'a [HunterCheck],
    pub summary: ExportSummary,
    pub export_path: Option<&'a Path>,
}

pub fn write_json(report: &Report<'_>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn print_target(console: &Console, company: &str, domain: &str, max_results: usize) {
    console.line("\nStarting HR contact discovery...\n");
    console.line(format_args!("Target Company: {company}"));
    console.line(format_args!("Domain: {domain}"));
    console.line(format_args!("Max Results: {max_results}"));
    console.rule();
}

pub fn print_pattern(console: &Console, applied: &AppliedPattern) {
    match &applied.discovered {
        Some(found) => console.line(format_args!(
            "   pattern: {} (from {} samples)",
            found.pattern, found.sample_count
        )),
        None => console.line(format_args!("   pattern: {} (fallback)", applied.pattern)),
    }
}

pub fn print_contacts(console: &Console, contacts: &[Contact]) {
    console.line("\nContacts Found:");
    console.rule();
    for (i, contact) in contacts.iter().enumerate() {
        console.line(format_args!("\n{}. {}", i + 1, contact.name));
        console.line(format_args!("   Title: {}", contact.title));
        console.line(format_args!(
            "   Email: {}",
            contact.email.as_deref().unwrap_or("-")
        ));
        console.line(format_args!("   LinkedIn: {}", contact.linkedin_url));
    }
}

pub fn print_verdict(console: &Console, verdict: &ValidationVerdict) {
    if verdict.valid {
        console.line(format_args!("   [OK]      {}", verdict.email));
    } else {
        console.line(format_args!(
            "   [INVALID] {} :: {}",
            verdict.email, verdict.message
        ));
    }
    for warning in &verdict.warnings {
        console.line(format_args!("             warning: {warning}"));
    }
}

pub fn print_hunter(console: &Console, check: &HunterCheck) {
    match (&check.verification, &check.error) {
        (_, Some(err)) => console.line(format_args!("   [ERROR]   {} :: {err}", check.email)),
        (Some(v), None) => console.line(format_args!(
            "   [HUNTER]  {} :: status={} score={} result={}",
            check.email,
            v.status.as_deref().unwrap_or("?"),
            v.score.map_or_else(|| "?".to_string(), |s| s.to_string()),
            v.result.as_deref().unwrap_or("?"),
        )),
        (None, None) => console.line(format_args!("   [HUNTER]  {} :: no data", check.email)),
    }
}

pub fn print_summary(console: &Console, summary: &ExportSummary) {
    console.line(format_args!("\n{DOUBLE_RULE}"));
    console.line("EXPORT SUMMARY");
    console.line(DOUBLE_RULE);
    console.line(summary);
    console.line(DOUBLE_RULE);

    console.line("\nNEXT STEPS:");
    console.line("1. Review the contacts in the CSV file");
    console.line("2. Personalize your outreach emails");
    console.line("3. IMPORTANT: Include an opt-out/unsubscribe option");
    console.line("4. Follow up professionally and respectfully");
    console.line("5. Track responses and respect opt-out requests");
    console.line("\nREMEMBER: This tool is for professional B2B use only.");
    console.line("   Always comply with GDPR, CAN-SPAM, and privacy regulations.\n");
}
