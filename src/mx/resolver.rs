use std::sync::Arc;

use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
    system_conf::read_system_conf,
};

use super::{Error, MxOptions, MxRecord, MxStatus};

/// Source of MX answers. Implemented by the system [`Resolver`] and by test stubs.
///
/// Implementations return the records in any order; [`resolve_with`] sorts them.
pub trait LookupMx {
    fn lookup_mx(&self, ascii_domain: &str) -> Result<MxStatus, Error>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, ascii_domain: &str) -> Result<MxStatus, Error> {
        match Resolver::mx_lookup(self, ascii_domain) {
            Ok(lookup) => {
                let mut records = Vec::new();
                for mx in lookup.iter() {
                    let exchange = normalize_exchange(mx.exchange().to_utf8());
                    records.push(MxRecord::new(mx.preference(), exchange));
                }
                if records.is_empty() {
                    Ok(MxStatus::NoRecords)
                } else {
                    Ok(MxStatus::Records(records))
                }
            }
            Err(err) => classify_failure(ascii_domain, err),
        }
    }
}

impl<T: LookupMx + ?Sized> LookupMx for &T {
    fn lookup_mx(&self, ascii_domain: &str) -> Result<MxStatus, Error> {
        (**self).lookup_mx(ascii_domain)
    }
}

impl<T: LookupMx + ?Sized> LookupMx for Arc<T> {
    fn lookup_mx(&self, ascii_domain: &str) -> Result<MxStatus, Error> {
        (**self).lookup_mx(ascii_domain)
    }
}

/// Builds a resolver from the system configuration with bounded query time.
pub fn system_resolver(options: &MxOptions) -> Result<Resolver, Error> {
    let (config, mut opts) = read_system_conf().map_err(Error::resolver_init)?;
    opts.timeout = options.timeout;
    opts.attempts = options.attempts.max(1);
    Resolver::new(config, opts).map_err(Error::resolver_init)
}

/// Normalizes `domain`, queries `resolver` and sorts/dedups the answer.
pub(crate) fn resolve_with<R>(resolver: &R, domain: &str) -> Result<MxStatus, Error>
where
    R: LookupMx + ?Sized,
{
    let ascii = normalize_domain(domain)?;
    match resolver.lookup_mx(&ascii)? {
        MxStatus::Records(mut records) => {
            records.sort();
            records.dedup();
            if records.is_empty() {
                Ok(MxStatus::NoRecords)
            } else {
                Ok(MxStatus::Records(records))
            }
        }
        absent => Ok(absent),
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, Error> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(Error::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(Error::idna)
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

enum Failure {
    Absent(MxStatus),
    Timeout,
    Other,
}

fn classify_failure(domain: &str, err: ResolveError) -> Result<MxStatus, Error> {
    let failure = match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::NXDomain => Failure::Absent(MxStatus::DomainNotFound),
            ResponseCode::ServFail | ResponseCode::Refused => {
                Failure::Absent(MxStatus::NoNameservers)
            }
            _ => Failure::Absent(MxStatus::NoRecords),
        },
        ResolveErrorKind::NoConnections => Failure::Absent(MxStatus::NoNameservers),
        ResolveErrorKind::Timeout => Failure::Timeout,
        _ => Failure::Other,
    };
    match failure {
        Failure::Absent(status) => Ok(status),
        Failure::Timeout => Err(Error::timeout(domain)),
        Failure::Other => Err(Error::lookup(err)),
    }
}
