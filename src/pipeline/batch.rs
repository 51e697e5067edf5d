use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crate::mx::MxCheck;
use crate::pipeline::{EmailValidationPipeline, ValidationVerdict};
use crate::smtp_verify::{MailboxProbe, SmtpProbeError, SmtpProbeOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker threads. `1` validates sequentially on the calling thread.
    pub concurrency: usize,
    /// Upper bound on simultaneously open SMTP connections across all workers.
    pub max_smtp_connections: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            max_smtp_connections: 2,
        }
    }
}

/// Applies a pipeline to a list of addresses, preserving order and length.
#[derive(Debug, Clone)]
pub struct BatchValidator<M, P> {
    pipeline: EmailValidationPipeline<M, P>,
    options: BatchOptions,
}

impl<M, P> BatchValidator<M, P>
where
    M: MxCheck + Sync,
    P: MailboxProbe + Sync,
{
    pub fn new(pipeline: EmailValidationPipeline<M, P>) -> Self {
        Self {
            pipeline,
            options: BatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.options.concurrency = concurrency;
        self
    }

    pub fn options(&self) -> BatchOptions {
        self.options
    }

    pub fn pipeline(&self) -> &EmailValidationPipeline<M, P> {
        &self.pipeline
    }

    /// One verdict per input, in input order. Duplicates are validated twice.
    pub fn validate_all<S>(&self, addresses: &[S], check_smtp: bool) -> Vec<ValidationVerdict>
    where
        S: AsRef<str> + Sync,
    {
        let workers = self.options.concurrency.max(1).min(addresses.len());
        if workers <= 1 {
            return addresses
                .iter()
                .map(|address| self.pipeline.validate(address.as_ref(), check_smtp))
                .collect();
        }

        tracing::debug!(
            count = addresses.len(),
            workers,
            max_smtp = self.options.max_smtp_connections,
            "validating batch in parallel"
        );
        let gate = Semaphore::new(self.options.max_smtp_connections.max(1));
        let probe = GatedProbe {
            inner: self.pipeline.probe(),
            gate: &gate,
        };
        let next = AtomicUsize::new(0);

        let mut slots: Vec<Option<ValidationVerdict>> = vec![None; addresses.len()];
        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        let mut done = Vec::new();
                        loop {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            let Some(address) = addresses.get(index) else {
                                break;
                            };
                            let verdict =
                                self.pipeline
                                    .validate_with(address.as_ref(), check_smtp, &probe);
                            done.push((index, verdict));
                        }
                        done
                    })
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(done) => {
                        for (index, verdict) in done {
                            slots[index] = Some(verdict);
                        }
                    }
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });

        slots.into_iter().flatten().collect()
    }
}

/// Counting semaphore bounding concurrent SMTP sessions.
struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

struct Permit<'a>(&'a Semaphore);

impl Semaphore {
    fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    fn acquire(&self) -> Permit<'_> {
        let mut permits = self.permits.lock().unwrap_or_else(PoisonError::into_inner);
        while *permits == 0 {
            permits = self
                .available
                .wait(permits)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *permits -= 1;
        Permit(self)
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let mut permits = self.0.permits.lock().unwrap_or_else(PoisonError::into_inner);
        *permits += 1;
        self.0.available.notify_one();
    }
}

struct GatedProbe<'a, P> {
    inner: &'a P,
    gate: &'a Semaphore,
}

impl<P: MailboxProbe> MailboxProbe for GatedProbe<'_, P> {
    fn probe(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<SmtpProbeOutcome, SmtpProbeError> {
        let _permit = self.gate.acquire();
        self.inner.probe(address, timeout)
    }
}
