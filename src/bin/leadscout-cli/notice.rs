use std::io::{self, BufRead};

use anyhow::{Context, Result, bail};

use crate::interrupt::Interrupt;
use crate::output::Console;

const BANNER: &str = "
╔════════════════════════════════════════════════════════════════╗
║                                                                ║
║          LEADSCOUT - HR CONTACT DISCOVERY                      ║
║          Professional B2B Contact Discovery                    ║
║                                                                ║
║  LEGAL NOTICE: For professional job application follow-up      ║
║  use only. Always include opt-out options.                     ║
║                                                                ║
╚════════════════════════════════════════════════════════════════╝
";

const NOTICE: &str = "
LEGAL & ETHICAL REQUIREMENTS:
────────────────────────────────────────────────────────────────

By using this tool, you agree to:

  [+] Use ONLY for legitimate job application follow-up
  [+] Include opt-out/unsubscribe options in ALL emails
  [+] Comply with GDPR, CAN-SPAM, and applicable regulations
  [+] Respect data subject rights (access, correction, deletion)
  [+] Only contact professional business email addresses
  [+] Store data securely and delete when no longer needed

  [-] Do NOT use for spam or unsolicited marketing
  [-] Do NOT contact personal email addresses (@gmail, @yahoo, etc.)
  [-] Do NOT share data with unauthorized third parties

Press Enter to continue or Ctrl+C to exit...";

pub fn print_banner(console: &Console) {
    console.line(BANNER);
}

/// Shows the notice and waits for Enter. Ctrl-C during the wait exits with 0.
pub fn confirm(console: &Console, interrupt: &Interrupt) -> Result<()> {
    console.line(NOTICE);

    interrupt.set_prompting(true);
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line);
    interrupt.set_prompting(false);

    if read.context("read confirmation from stdin")? == 0 {
        bail!("stdin closed before the legal notice was acknowledged (use --skip-notice)");
    }
    Ok(())
}
