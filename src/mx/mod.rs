//! DNS MX resolution and the "can this domain receive mail" check.
//!
//! [`MailabilityChecker::has_mail_exchanger`] answers `false` only on a definitive
//! absence (NXDOMAIN, NoAnswer, no nameserver). Timeouts and other resolver faults
//! answer `true`: a flaky resolver must not reject otherwise plausible addresses. The
//! price is that `true` never proves deliverability.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{LookupMx, system_resolver};
pub use types::{MxOptions, MxRecord, MxStatus};

pub(crate) use resolver::resolve_with;

use trust_dns_resolver::Resolver;

/// Seam used by the validation pipeline.
pub trait MxCheck {
    fn has_mail_exchanger(&self, domain: &str) -> bool;
}

/// Lookup MX records for `domain` using the system resolver and default options.
pub fn check_mx(domain: &str) -> Result<MxStatus, Error> {
    let resolver = system_resolver(&MxOptions::default())?;
    resolve_with(&resolver, domain)
}

#[derive(Debug, Clone)]
pub struct MailabilityChecker<R> {
    resolver: R,
}

impl MailabilityChecker<Resolver> {
    pub fn from_system_conf(options: &MxOptions) -> Result<Self, Error> {
        Ok(Self::new(system_resolver(options)?))
    }
}

impl<R: LookupMx> MailabilityChecker<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolve(&self, domain: &str) -> Result<MxStatus, Error> {
        resolve_with(&self.resolver, domain)
    }

    pub fn has_mail_exchanger(&self, domain: &str) -> bool {
        match self.resolve(domain) {
            Ok(status) => {
                tracing::debug!(domain, ?status, "MX lookup answered");
                status.has_records()
            }
            Err(err) if err.is_input_error() => {
                tracing::debug!(domain, error = %err, "domain not resolvable");
                false
            }
            Err(err) => {
                tracing::warn!(
                    domain,
                    error = %err,
                    "MX lookup inconclusive, treating domain as mailable"
                );
                true
            }
        }
    }
}

impl<R: LookupMx> MxCheck for MailabilityChecker<R> {
    fn has_mail_exchanger(&self, domain: &str) -> bool {
        MailabilityChecker::has_mail_exchanger(self, domain)
    }
}
