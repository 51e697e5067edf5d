//! SMTP mailbox probing.
//!
//! [`SmtpProbe`] connects to the preferred MX of an address and walks the dialogue up to
//! `RCPT TO`, then quits. The reply to `RCPT TO` decides the [`SmtpProbeOutcome`]:
//! 2xx accepts, other 4xx/5xx reject, everything else (timeouts, disconnects, 421,
//! cancellation, garbage) stays indeterminate.
//!
//! Each probe carries its own deadline and socket; nothing is shared between probes, so
//! any number can run concurrently.

mod error;
mod options;
mod probe;
mod session;
mod types;

pub use error::SmtpProbeError;
pub use options::{CancellationToken, SmtpProbeOptions};
pub use probe::{MailboxProbe, SmtpProbe, check_mailaddress_exists};
pub use types::{SmtpProbeOutcome, SmtpReply};

#[cfg(test)]
mod tests;
