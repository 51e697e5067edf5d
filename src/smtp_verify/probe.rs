use std::time::Duration;

use trust_dns_resolver::Resolver;

use crate::mx::{LookupMx, MxOptions, resolve_with, system_resolver};
use crate::smtp_verify::error::SmtpProbeError;
use crate::smtp_verify::options::SmtpProbeOptions;
use crate::smtp_verify::session::{Deadline, SessionError, SmtpSession};
use crate::smtp_verify::types::{SmtpProbeOutcome, SmtpReply};

/// Seam used by the validation pipeline; stubbed in tests.
pub trait MailboxProbe {
    fn probe(&self, address: &str, timeout: Duration)
    -> Result<SmtpProbeOutcome, SmtpProbeError>;
}

impl<T: MailboxProbe + ?Sized> MailboxProbe for &T {
    fn probe(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<SmtpProbeOutcome, SmtpProbeError> {
        (**self).probe(address, timeout)
    }
}

/// One-shot probe using the system resolver.
pub fn check_mailaddress_exists(
    address: &str,
    options: &SmtpProbeOptions,
    timeout: Duration,
) -> Result<SmtpProbeOutcome, SmtpProbeError> {
    SmtpProbe::from_system_conf(&MxOptions::default(), options.clone())?.probe(address, timeout)
}

/// Asks the preferred MX of an address whether it would accept mail for it.
///
/// The dialogue stops after `RCPT TO`: no `DATA` is ever sent.
#[derive(Debug, Clone)]
pub struct SmtpProbe<R> {
    resolver: R,
    options: SmtpProbeOptions,
}

impl SmtpProbe<Resolver> {
    pub fn from_system_conf(
        mx_options: &MxOptions,
        options: SmtpProbeOptions,
    ) -> Result<Self, SmtpProbeError> {
        Ok(Self::new(system_resolver(mx_options)?, options))
    }
}

impl<R: LookupMx> SmtpProbe<R> {
    pub fn new(resolver: R, options: SmtpProbeOptions) -> Self {
        Self { resolver, options }
    }

    pub fn options(&self) -> &SmtpProbeOptions {
        &self.options
    }

    pub fn probe(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<SmtpProbeOutcome, SmtpProbeError> {
        let address = address.trim();
        let (local, domain) = address
            .rsplit_once('@')
            .filter(|(local, domain)| !local.is_empty() && !domain.is_empty())
            .ok_or_else(|| SmtpProbeError::invalid_address(address))?;

        let status = match resolve_with(&self.resolver, domain) {
            Ok(status) => status,
            Err(err) if err.is_input_error() => {
                return Err(SmtpProbeError::invalid_address(address));
            }
            Err(err) => {
                tracing::warn!(domain, error = %err, "MX re-resolution failed before probe");
                return Ok(SmtpProbeOutcome::indeterminate(format!(
                    "Verification error: {err}"
                )));
            }
        };
        let Some(primary) = status.primary() else {
            return Err(SmtpProbeError::no_mail_exchanger(domain));
        };

        let ascii_domain = idna::domain_to_ascii(domain.trim_end_matches('.'))
            .map_err(|_| SmtpProbeError::invalid_address(address))?;
        let recipient = format!("{local}@{ascii_domain}");
        let deadline = Deadline::after(timeout, self.options.cancel.clone());

        let outcome = match self.dialogue(&primary.exchange, &recipient, deadline) {
            Ok(outcome) => outcome,
            Err(err) => outcome_for_error(&err),
        };
        tracing::info!(address, host = %primary.exchange, %outcome, "SMTP probe finished");
        Ok(outcome)
    }

    fn dialogue(
        &self,
        host: &str,
        recipient: &str,
        deadline: Deadline,
    ) -> Result<SmtpProbeOutcome, SessionError> {
        let mut session = SmtpSession::connect(host, self.options.port, deadline)?;

        let greeting = session.read_reply()?;
        if !greeting.is_positive_completion() {
            return Ok(SmtpProbeOutcome::indeterminate_reply(greeting));
        }

        let helo = session.send_command(&format!("HELO {}", self.options.helo_domain))?;
        if !helo.is_positive_completion() {
            return Ok(SmtpProbeOutcome::indeterminate_reply(helo));
        }

        let mail = session.send_command(&format!("MAIL FROM:<{}>", self.options.mail_from))?;
        if !mail.is_positive_completion() {
            return Ok(SmtpProbeOutcome::indeterminate_reply(mail));
        }

        let rcpt = session.send_command(&format!("RCPT TO:<{recipient}>"))?;
        session.quit();
        Ok(classify_recipient(rcpt))
    }
}

impl<R: LookupMx> MailboxProbe for SmtpProbe<R> {
    fn probe(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<SmtpProbeOutcome, SmtpProbeError> {
        SmtpProbe::probe(self, address, timeout)
    }
}

fn classify_recipient(reply: SmtpReply) -> SmtpProbeOutcome {
    match reply.code {
        // service closing channel: says nothing about the mailbox
        421 => SmtpProbeOutcome::indeterminate_reply(reply),
        _ if reply.is_positive_completion() => SmtpProbeOutcome::Accepted { reply },
        _ if reply.is_transient_failure() || reply.is_permanent_failure() => {
            SmtpProbeOutcome::Rejected { reply }
        }
        code => SmtpProbeOutcome::Indeterminate {
            reason: format!("Unexpected SMTP response: {code}"),
            reply: Some(reply),
        },
    }
}

fn outcome_for_error(err: &SessionError) -> SmtpProbeOutcome {
    let reason = match err {
        SessionError::TimedOut => "SMTP connection timeout".to_string(),
        SessionError::Disconnected => "SMTP server disconnected".to_string(),
        SessionError::Cancelled => "SMTP probe cancelled".to_string(),
        SessionError::Protocol(detail) => format!("Unexpected SMTP response: {detail}"),
        SessionError::Connect { .. } | SessionError::Io { .. } => {
            format!("Verification error: {err}")
        }
    };
    SmtpProbeOutcome::indeterminate(reason)
}
