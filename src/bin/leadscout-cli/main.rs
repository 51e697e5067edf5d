mod args;
mod interrupt;
mod logging;
mod notice;
mod output;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use leadscout::lookup::{HunterClient, HunterOptions, LookupError, PatternLookup};
use leadscout::mx::MxOptions;
use leadscout::search::{DuckDuckGoHtml, LeadSearcher, SearchOptions, filter_by_title};
use leadscout::{
    BatchOptions, BatchValidator, Contact, ContactExporter, ExportSummary, SmtpProbeOptions,
    SyntaxChecker, SystemPipeline, generate_for_contacts,
};

use crate::args::Cli;
use crate::interrupt::{EXIT_INTERRUPTED, Interrupt};
use crate::output::{Console, HunterCheck, Report};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("\n\nError: {err:#}");
            ExitCode::FAILURE
        }
    }
}

// codes de sortie : 0 OK, 1 aucun contact / erreur fatale, 130 interruption
fn run(cli: &Cli) -> Result<ExitCode> {
    cli.validate()?;
    let console = Console::new(cli.is_json());
    let interrupt = Interrupt::install()?;

    notice::print_banner(&console);
    if !cli.skip_notice {
        notice::confirm(&console, &interrupt)?;
    }

    let company = cli.company.trim();
    let domain = cli.domain();
    output::print_target(&console, company, &domain, cli.max_results);

    console.step(1, "Searching for HR contacts on LinkedIn...");
    let provider = DuckDuckGoHtml::new(SEARCH_TIMEOUT).context("build search client")?;
    let searcher = LeadSearcher::new(
        provider,
        SearchOptions {
            delay: cli.search_delay(),
            cancel: Some(interrupt.token().clone()),
            ..SearchOptions::default()
        },
    );
    let found = searcher.search_contacts(company, &domain, cli.max_results);
    let mut contacts = filter_by_title(found, &cli.titles);
    if interrupt.is_cancelled() {
        return Ok(cancelled(&console));
    }
    if contacts.is_empty() {
        console.line("\nNo contacts found. Try adjusting your search criteria.");
        return Ok(ExitCode::FAILURE);
    }

    console.step(2, "Generating email addresses...");
    let hunter = HunterClient::new(cli.hunter_api_key.clone(), HunterOptions::default())
        .context("build Hunter.io client")?;
    let lookup: Option<&dyn PatternLookup> = if hunter.has_api_key() {
        Some(&hunter as &dyn PatternLookup)
    } else {
        tracing::warn!("no Hunter.io API key, email pattern discovery disabled");
        None
    };
    let applied = generate_for_contacts(&mut contacts, &domain, lookup);
    output::print_pattern(&console, &applied);
    output::print_contacts(&console, &contacts);

    console.step(3, "Validating email addresses...");
    let pipeline = SystemPipeline::from_system_conf(
        SyntaxChecker::default(),
        &MxOptions::default(),
        probe_options(cli, &interrupt),
    )
    .context("initialize DNS resolver")?
    .with_smtp_timeout(cli.smtp_timeout());
    let validator = BatchValidator::new(pipeline).with_options(BatchOptions {
        concurrency: cli.concurrency,
        max_smtp_connections: cli.max_smtp_connections,
    });
    let addresses: Vec<String> = contacts
        .iter()
        .map(|contact| contact.email.clone().unwrap_or_default())
        .collect();
    let verdicts = validator.validate_all(addresses.as_slice(), cli.validate_smtp);
    for verdict in &verdicts {
        output::print_verdict(&console, verdict);
    }

    let hunter_checks = if cli.hunter_verify {
        verify_with_hunter(&console, &hunter, &contacts, &interrupt)
    } else {
        Vec::new()
    };
    if interrupt.is_cancelled() {
        return Ok(cancelled(&console));
    }

    let export_path = if cli.no_export {
        console.step(4, "Export skipped (--no-export flag used)");
        for (contact, verdict) in contacts.iter_mut().zip(&verdicts) {
            contact.apply_verdict(verdict);
        }
        None
    } else {
        console.step(4, "Exporting to CSV...");
        let exporter = ContactExporter::new(&cli.output_dir)
            .with_context(|| format!("prepare {}", cli.output_dir.display()))?
            .with_notice(!cli.no_csv_notice);
        exporter
            .export_with_validation(&mut contacts, &verdicts, &cli.output)
            .with_context(|| format!("export {}", cli.output))?
    };

    let summary = ExportSummary::of(&contacts);
    output::print_summary(&console, &summary);
    if let Some(path) = &export_path {
        console.line(format_args!("SUCCESS! Contacts exported to: {}\n", path.display()));
    }
    if cli.is_json() {
        output::write_json(&Report {
            company,
            domain: &domain,
            pattern: &applied,
            contacts: &contacts,
            validations: &verdicts,
            hunter: &hunter_checks,
            summary,
            export_path: export_path.as_deref(),
        })?;
    }

    console.line("HR contact discovery completed successfully!");
    Ok(ExitCode::SUCCESS)
}

fn probe_options(cli: &Cli, interrupt: &Interrupt) -> SmtpProbeOptions {
    let defaults = SmtpProbeOptions::default();
    SmtpProbeOptions {
        helo_domain: cli.helo.clone().unwrap_or(defaults.helo_domain),
        mail_from: cli.mail_from.clone().unwrap_or(defaults.mail_from),
        cancel: Some(interrupt.token().clone()),
        ..SmtpProbeOptions::default()
    }
}

fn verify_with_hunter(
    console: &Console,
    hunter: &HunterClient,
    contacts: &[Contact],
    interrupt: &Interrupt,
) -> Vec<HunterCheck> {
    if !hunter.has_api_key() {
        tracing::warn!("--hunter-verify ignored: {}", LookupError::MissingApiKey);
        return Vec::new();
    }

    let mut checks = Vec::with_capacity(contacts.len());
    for email in contacts.iter().filter_map(|contact| contact.email.as_deref()) {
        if interrupt.is_cancelled() {
            break;
        }
        let check = match hunter.verify_email(email) {
            Ok(verification) => HunterCheck {
                email: email.to_string(),
                verification,
                error: None,
            },
            Err(err) => HunterCheck {
                email: email.to_string(),
                verification: None,
                error: Some(err.to_string()),
            },
        };
        output::print_hunter(console, &check);
        checks.push(check);
    }
    checks
}

fn cancelled(console: &Console) -> ExitCode {
    console.line("\n\nOperation cancelled by user.");
    ExitCode::from(EXIT_INTERRUPTED)
}
