use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use super::{BatchOptions, BatchValidator, EmailValidationPipeline, SmtpCheck};
use crate::mx::MxCheck;
use crate::smtp_verify::{MailboxProbe, SmtpProbeError, SmtpProbeOutcome, SmtpReply};
use crate::validator::SyntaxChecker;

type ProbeFn = dyn Fn(&str) -> Result<SmtpProbeOutcome, SmtpProbeError> + Send + Sync;

/// MX stage answering from a fixed set of mailable domains.
pub(crate) struct StubMx {
    mailable: HashSet<String>,
    pub(crate) lookups: AtomicUsize,
}

impl StubMx {
    pub(crate) fn mailable<'a>(domains: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            mailable: domains.into_iter().map(str::to_string).collect(),
            lookups: AtomicUsize::new(0),
        }
    }
}

impl MxCheck for StubMx {
    fn has_mail_exchanger(&self, domain: &str) -> bool {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.mailable.contains(domain)
    }
}

pub(crate) struct StubProbe {
    on_probe: Box<ProbeFn>,
    pub(crate) calls: AtomicUsize,
}

impl StubProbe {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<SmtpProbeOutcome, SmtpProbeError> + Send + Sync + 'static,
    {
        Self {
            on_probe: Box::new(f),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn accepting() -> Self {
        Self::new(|_| {
            Ok(SmtpProbeOutcome::Accepted {
                reply: SmtpReply::new(250, "2.1.5 Ok"),
            })
        })
    }

    pub(crate) fn unreachable() -> Self {
        Self::new(|address| panic!("probe must not run for {address}"))
    }
}

impl MailboxProbe for StubProbe {
    fn probe(
        &self,
        address: &str,
        _timeout: Duration,
    ) -> Result<SmtpProbeOutcome, SmtpProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.on_probe)(address)
    }
}

fn pipeline(probe: StubProbe) -> EmailValidationPipeline<StubMx, StubProbe> {
    EmailValidationPipeline::new(
        SyntaxChecker::default(),
        StubMx::mailable(["company.com", "b.com", "d.com", "gmail.com"]),
        probe,
    )
}

#[test]
fn invalid_syntax_stops_before_dns() {
    let pipeline = pipeline(StubProbe::unreachable());
    let verdict = pipeline.validate("not-an-email", true);

    assert!(!verdict.valid);
    assert!(!verdict.syntax_valid);
    assert!(!verdict.mx_valid);
    assert_eq!(verdict.smtp, SmtpCheck::NotChecked);
    assert_eq!(verdict.message, "Invalid email format");
    assert_eq!(pipeline.mx.lookups.load(Ordering::SeqCst), 0);
}

#[test]
fn empty_input_keeps_raw_email() {
    let verdict = pipeline(StubProbe::unreachable()).validate("   ", false);
    assert!(!verdict.valid);
    assert_eq!(verdict.email, "   ");
    assert_eq!(verdict.message, "Email is empty");
}

#[test]
fn mx_absence_invalidates() {
    let verdict = pipeline(StubProbe::unreachable()).validate("jane@nomail.example", true);

    assert!(!verdict.valid);
    assert!(verdict.syntax_valid);
    assert!(!verdict.mx_valid);
    assert_eq!(verdict.smtp, SmtpCheck::NotChecked);
    assert_eq!(verdict.message, "Domain has no valid MX records");
}

#[test]
fn valid_without_smtp_is_not_checked() {
    let pipeline = pipeline(StubProbe::unreachable());
    let verdict = pipeline.validate("John.Doe@Company.com", false);

    assert!(verdict.valid);
    assert!(verdict.syntax_valid);
    assert!(verdict.mx_valid);
    assert_eq!(verdict.smtp, SmtpCheck::NotChecked);
    assert_eq!(verdict.smtp.as_bool(), None);
    assert_eq!(verdict.email, "john.doe@company.com");
    assert_eq!(verdict.message, "Email appears valid");
    assert!(verdict.warnings.is_empty());
    assert_eq!(pipeline.probe.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn personal_domain_is_a_warning() {
    let verdict = pipeline(StubProbe::unreachable()).validate("JOHN@GMAIL.COM", false);

    assert!(verdict.valid);
    assert_eq!(verdict.email, "john@gmail.com");
    assert_eq!(
        verdict.warnings,
        vec!["WARNING: Personal email domain detected (potential GDPR concern)"]
    );
}

#[test]
fn accepted_probe_is_valid() {
    let pipeline = pipeline(StubProbe::accepting());
    let verdict = pipeline.validate("jane@company.com", true);

    assert!(verdict.valid);
    assert_eq!(verdict.smtp, SmtpCheck::Accepted);
    assert_eq!(verdict.smtp.as_bool(), Some(true));
    assert_eq!(verdict.message, "Email appears valid");
    assert_eq!(pipeline.probe.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn rejected_probe_invalidates_with_code() {
    let verdict = pipeline(StubProbe::new(|_| {
        Ok(SmtpProbeOutcome::Rejected {
            reply: SmtpReply::new(550, "5.1.1 User unknown"),
        })
    }))
    .validate("ghost@company.com", true);

    assert!(!verdict.valid);
    assert!(verdict.mx_valid);
    assert_eq!(verdict.smtp, SmtpCheck::Rejected);
    assert!(verdict.message.contains("550"), "message: {}", verdict.message);
}

#[test]
fn indeterminate_probe_stays_valid_with_warning() {
    let verdict = pipeline(StubProbe::new(|_| {
        Ok(SmtpProbeOutcome::indeterminate("SMTP connection timeout"))
    }))
    .validate("jane@company.com", true);

    assert!(verdict.valid);
    assert_eq!(verdict.smtp, SmtpCheck::Indeterminate);
    assert_eq!(verdict.smtp.as_bool(), None);
    assert_eq!(verdict.warnings, vec!["SMTP connection timeout"]);
}

#[test]
fn probe_without_mx_invalidates() {
    let verdict = pipeline(StubProbe::new(|_| {
        Err(SmtpProbeError::no_mail_exchanger("company.com"))
    }))
    .validate("jane@company.com", true);

    assert!(!verdict.valid);
    assert!(!verdict.mx_valid);
    assert_eq!(verdict.message, "No MX records found for domain");
}

#[test]
fn probe_input_error_is_indeterminate() {
    let verdict = pipeline(StubProbe::new(|address| {
        Err(SmtpProbeError::invalid_address(address))
    }))
    .validate("jane@company.com", true);

    assert!(verdict.valid);
    assert_eq!(verdict.smtp, SmtpCheck::Indeterminate);
    assert!(verdict.warnings[0].starts_with("Verification error"));
}

#[test]
fn repeated_runs_are_identical() {
    let pipeline = pipeline(StubProbe::new(|address| {
        if address.starts_with("ghost") {
            Ok(SmtpProbeOutcome::Rejected {
                reply: SmtpReply::new(550, "no such user"),
            })
        } else {
            Ok(SmtpProbeOutcome::indeterminate("SMTP server disconnected"))
        }
    }));
    for address in ["jane@company.com", "ghost@company.com", "bad", "x@gmail.com"] {
        let first = pipeline.validate(address, true);
        let second = pipeline.validate(address, true);
        assert_eq!(first, second);
    }
}

#[test]
fn batch_preserves_order_and_length() {
    let validator = BatchValidator::new(pipeline(StubProbe::unreachable()));
    let verdicts = validator.validate_all(&["a@b.com", "not-an-email", "c@d.com"], false);

    assert_eq!(verdicts.len(), 3);
    assert_eq!(verdicts[0].email, "a@b.com");
    assert!(verdicts[0].valid);
    assert!(!verdicts[1].valid);
    assert_eq!(verdicts[1].message, "Invalid email format");
    assert_eq!(verdicts[2].email, "c@d.com");
    assert!(verdicts[2].valid);
}

#[test]
fn batch_keeps_duplicates() {
    let validator = BatchValidator::new(pipeline(StubProbe::accepting()));
    let verdicts = validator.validate_all(&["a@b.com", "a@b.com"], true);
    assert_eq!(verdicts.len(), 2);
    assert_eq!(validator.pipeline().probe().calls.load(Ordering::SeqCst), 2);
}

#[test]
fn empty_batch_is_empty() {
    let validator = BatchValidator::new(pipeline(StubProbe::unreachable())).with_concurrency(4);
    let verdicts = validator.validate_all::<&str>(&[], true);
    assert!(verdicts.is_empty());
}

#[test]
fn parallel_batch_matches_sequential_order() {
    let addresses: Vec<String> = (0..20)
        .map(|i| {
            if i % 3 == 0 {
                format!("broken{i}")
            } else {
                format!("user{i}@company.com")
            }
        })
        .collect();

    let sequential = BatchValidator::new(pipeline(StubProbe::accepting()));
    let parallel = BatchValidator::new(pipeline(StubProbe::accepting())).with_concurrency(4);

    let expected = sequential.validate_all(addresses.as_slice(), true);
    let actual = parallel.validate_all(addresses.as_slice(), true);
    assert_eq!(actual, expected);
    for (verdict, address) in actual.iter().zip(&addresses) {
        assert_eq!(&verdict.email, address);
    }
}

#[test]
fn parallel_batch_caps_smtp_connections() {
    let in_flight = std::sync::Arc::new(AtomicUsize::new(0));
    let peak = std::sync::Arc::new(Mutex::new(0usize));
    let probe = {
        let in_flight = in_flight.clone();
        let peak = peak.clone();
        StubProbe::new(move |_| {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            {
                let mut peak = peak.lock().expect("peak lock");
                *peak = (*peak).max(now);
            }
            thread::sleep(Duration::from_millis(15));
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(SmtpProbeOutcome::Accepted {
                reply: SmtpReply::new(250, "Ok"),
            })
        })
    };
    let addresses: Vec<String> = (0..12).map(|i| format!("user{i}@company.com")).collect();
    let validator = BatchValidator::new(pipeline(probe)).with_options(BatchOptions {
        concurrency: 6,
        max_smtp_connections: 2,
    });

    let verdicts = validator.validate_all(addresses.as_slice(), true);
    assert_eq!(verdicts.len(), 12);
    assert!(verdicts.iter().all(|verdict| verdict.valid));
    assert!(*peak.lock().expect("peak lock") <= 2);
}
