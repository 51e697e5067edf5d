#![forbid(unsafe_code)]
//! leadscout: recruiting contact discovery and email validation.
//!
//! The validation core (syntax, MX, SMTP probe, batch) is usable on its own; search,
//! pattern lookup, address generation and CSV export build the lead-discovery flow on top.

pub mod contact;
pub mod export;
pub mod generator;
pub mod lookup;
pub mod mx;
pub mod pipeline;
pub mod search;
pub mod smtp_verify;
pub mod validator;

pub use contact::Contact;
pub use export::{ContactExporter, ExportError, ExportSummary};
pub use generator::{AppliedPattern, generate_email, generate_for_contacts, split_name};
pub use lookup::{HunterClient, LookupError, PatternLookup};
pub use mx::{Error as MxError, MailabilityChecker, MxCheck, MxRecord, MxStatus, check_mx};
pub use pipeline::{
    BatchOptions, BatchValidator, EmailValidationPipeline, SmtpCheck, SystemPipeline,
    ValidationVerdict,
};
pub use search::{DuckDuckGoHtml, LeadSearcher, SearchOptions, SearchProvider, filter_by_title};
pub use smtp_verify::{
    CancellationToken, MailboxProbe, SmtpProbe, SmtpProbeOptions, SmtpProbeOutcome,
    check_mailaddress_exists,
};
pub use validator::{PersonalDomains, SyntaxChecker, SyntaxReport};
