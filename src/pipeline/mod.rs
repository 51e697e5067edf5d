//! Per-address validation: syntax, then MX, then an optional SMTP probe.
//!
//! Every failure along the way ends up in the returned [`ValidationVerdict`]; the pipeline
//! never returns an error and never panics on network faults.

mod batch;
mod types;

pub use batch::{BatchOptions, BatchValidator};
pub use types::{SmtpCheck, ValidationVerdict};

use std::time::Duration;

use trust_dns_resolver::Resolver;

use crate::mx::{self, MailabilityChecker, MxCheck, MxOptions};
use crate::smtp_verify::{
    MailboxProbe, SmtpProbe, SmtpProbeError, SmtpProbeOptions, SmtpProbeOutcome,
};
use crate::validator::SyntaxChecker;

use types::{MSG_APPEARS_VALID, MSG_NO_MX, MSG_PROBE_NO_MX};

pub const DEFAULT_SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Pipeline wired to the system resolver.
pub type SystemPipeline = EmailValidationPipeline<MailabilityChecker<Resolver>, SmtpProbe<Resolver>>;

#[derive(Debug, Clone)]
pub struct EmailValidationPipeline<M, P> {
    syntax: SyntaxChecker,
    mx: M,
    probe: P,
    smtp_timeout: Duration,
}

impl SystemPipeline {
    /// Builds a pipeline whose MX stage and probe each own a system resolver.
    pub fn from_system_conf(
        syntax: SyntaxChecker,
        mx_options: &MxOptions,
        probe_options: SmtpProbeOptions,
    ) -> Result<Self, mx::Error> {
        let checker = MailabilityChecker::from_system_conf(mx_options)?;
        let probe = SmtpProbe::new(mx::system_resolver(mx_options)?, probe_options);
        Ok(Self::new(syntax, checker, probe))
    }
}

impl<M: MxCheck, P: MailboxProbe> EmailValidationPipeline<M, P> {
    pub fn new(syntax: SyntaxChecker, mx: M, probe: P) -> Self {
        Self {
            syntax,
            mx,
            probe,
            smtp_timeout: DEFAULT_SMTP_TIMEOUT,
        }
    }

    pub fn with_smtp_timeout(mut self, timeout: Duration) -> Self {
        self.smtp_timeout = timeout;
        self
    }

    pub fn smtp_timeout(&self) -> Duration {
        self.smtp_timeout
    }

    pub fn syntax_checker(&self) -> &SyntaxChecker {
        &self.syntax
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn validate(&self, email: &str, check_smtp: bool) -> ValidationVerdict {
        self.validate_with(email, check_smtp, &self.probe)
    }

    /// Same as [`validate`](Self::validate) but probing through `probe`.
    pub(crate) fn validate_with<Q>(
        &self,
        email: &str,
        check_smtp: bool,
        probe: &Q,
    ) -> ValidationVerdict
    where
        Q: MailboxProbe + ?Sized,
    {
        let syntax = self.syntax.check_syntax(email);
        if !syntax.valid {
            tracing::debug!(email, message = %syntax.message, "syntax check failed");
            return ValidationVerdict::rejected(syntax.email, syntax.message);
        }

        let mut verdict = ValidationVerdict {
            syntax_valid: true,
            ..ValidationVerdict::rejected(syntax.email.clone(), String::new())
        };
        if syntax.personal_domain_warning {
            verdict.warnings.push(syntax.message.clone());
        }

        let domain = syntax.domain().unwrap_or_default();
        verdict.mx_valid = self.mx.has_mail_exchanger(domain);
        if !verdict.mx_valid {
            verdict.message = MSG_NO_MX.to_string();
            return verdict;
        }

        if !check_smtp {
            verdict.valid = true;
            verdict.message = MSG_APPEARS_VALID.to_string();
            return verdict;
        }

        match probe.probe(&verdict.email, self.smtp_timeout) {
            Ok(SmtpProbeOutcome::Accepted { .. }) => {
                verdict.smtp = SmtpCheck::Accepted;
                verdict.valid = true;
                verdict.message = MSG_APPEARS_VALID.to_string();
            }
            Ok(outcome @ SmtpProbeOutcome::Rejected { .. }) => {
                verdict.smtp = SmtpCheck::Rejected;
                verdict.message = outcome.message();
            }
            Ok(outcome @ SmtpProbeOutcome::Indeterminate { .. }) => {
                verdict.smtp = SmtpCheck::Indeterminate;
                verdict.valid = true;
                verdict.message = MSG_APPEARS_VALID.to_string();
                verdict.warnings.push(outcome.message());
            }
            Err(SmtpProbeError::NoMailExchanger { .. }) => {
                verdict.mx_valid = false;
                verdict.message = MSG_PROBE_NO_MX.to_string();
            }
            Err(err) => {
                verdict.smtp = SmtpCheck::Indeterminate;
                verdict.valid = true;
                verdict.message = MSG_APPEARS_VALID.to_string();
                verdict.warnings.push(format!("Verification error: {err}"));
            }
        }

        tracing::info!(
            email = %verdict.email,
            valid = verdict.valid,
            smtp = %verdict.smtp,
            "address validated"
        );
        verdict
    }
}

#[cfg(test)]
pub(crate) mod tests;
