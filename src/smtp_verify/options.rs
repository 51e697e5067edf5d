use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Configuration knobs for [`SmtpProbe`](super::SmtpProbe).
///
/// The HELO name and envelope sender are deliberately generic so the probe does not
/// identify the operator.
#[derive(Debug, Clone)]
pub struct SmtpProbeOptions {
    pub helo_domain: String,
    pub mail_from: String,
    pub port: u16,
    pub cancel: Option<CancellationToken>,
}

impl Default for SmtpProbeOptions {
    fn default() -> Self {
        Self {
            helo_domain: "example.com".to_string(),
            mail_from: "verify@example.com".to_string(),
            port: 25,
            cancel: None,
        }
    }
}

/// Shared flag used to abort in-flight probes (e.g. on Ctrl-C).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
