use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Context, Result};
use leadscout::CancellationToken;

pub const EXIT_INTERRUPTED: u8 = 130;

/// Ctrl-C state shared with the signal handler.
///
/// While the notice prompt is open, Ctrl-C exits cleanly. Afterwards the first press
/// cancels in-flight work through the token and the second one exits with 130.
#[derive(Debug, Clone)]
pub struct Interrupt {
    token: CancellationToken,
    prompting: Arc<AtomicBool>,
    presses: Arc<AtomicUsize>,
}

impl Interrupt {
    pub fn install() -> Result<Self> {
        let interrupt = Self {
            token: CancellationToken::new(),
            prompting: Arc::new(AtomicBool::new(false)),
            presses: Arc::new(AtomicUsize::new(0)),
        };
        let handler = interrupt.clone();
        ctrlc::set_handler(move || handler.on_signal()).context("install Ctrl-C handler")?;
        Ok(interrupt)
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn set_prompting(&self, prompting: bool) {
        self.prompting.store(prompting, Ordering::SeqCst);
    }

    fn on_signal(&self) {
        if self.prompting.load(Ordering::SeqCst) {
            eprintln!("\n\nExiting...");
            process::exit(0);
        }
        if self.presses.fetch_add(1, Ordering::SeqCst) == 0 {
            self.token.cancel();
            eprintln!("\nInterrupt received, stopping after the current step (Ctrl-C again to force).");
        } else {
            eprintln!("\n\nOperation cancelled by user.");
            process::exit(i32::from(EXIT_INTERRUPTED));
        }
    }
}
