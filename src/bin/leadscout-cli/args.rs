use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use leadscout::export::DEFAULT_FILENAME;
use leadscout::lookup::API_KEY_ENV;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "leadscout-cli",
    version,
    about = "Recherche de contacts RH pour le suivi de candidatures (usage B2B uniquement)"
)]
pub struct Cli {
    /// nom de l'entreprise (ex: "Acme Corporation")
    #[arg(long)]
    pub company: String,

    /// domaine de l'entreprise (ex: acme.com)
    #[arg(long)]
    pub domain: String,

    /// nombre maximum de contacts à trouver
    #[arg(long, default_value_t = 10)]
    pub max_results: usize,

    /// nom du fichier CSV produit
    #[arg(long, default_value = DEFAULT_FILENAME)]
    pub output: String,

    /// répertoire de sortie (créé si absent)
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// vérifie les boîtes via SMTP (plus lent, parfois bloqué)
    #[arg(long)]
    pub validate_smtp: bool,

    /// timeout par sonde SMTP (secondes, 1 à 3600)
    #[arg(
        long = "smtp-timeout",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..=3600)
    )]
    pub smtp_timeout_secs: u64,

    /// nom utilisé pour HELO
    #[arg(long)]
    pub helo: Option<String>,

    /// enveloppe MAIL FROM
    #[arg(long = "from")]
    pub mail_from: Option<String>,

    /// saute l'avertissement légal (uniquement si déjà lu et accepté)
    #[arg(long)]
    pub skip_notice: bool,

    /// n'exporte pas en CSV (affiche seulement les résultats)
    #[arg(long)]
    pub no_export: bool,

    /// n'écrit pas l'avertissement légal en tête du CSV
    #[arg(long)]
    pub no_csv_notice: bool,

    /// nombre de validations en parallèle
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// connexions SMTP simultanées maximum
    #[arg(long, default_value_t = 2)]
    pub max_smtp_connections: usize,

    /// pause entre deux requêtes de recherche (ms)
    #[arg(long = "search-delay-ms", default_value_t = 2_000)]
    pub search_delay_ms: u64,

    /// clé API Hunter.io
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub hunter_api_key: Option<String>,

    /// vérifie aussi chaque adresse via l'API Hunter.io
    #[arg(long)]
    pub hunter_verify: bool,

    /// ne garde que les titres contenant l'un de ces termes (répétable)
    #[arg(long = "titles", num_args = 1..)]
    pub titles: Vec<String>,

    /// format: human|json
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// verbosité des logs (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn validate(&self) -> Result<()> {
        if self.company.trim().is_empty() {
            bail!("--company must not be empty");
        }
        let domain = self.domain.trim();
        if domain.is_empty() || !domain.contains('.') || domain.contains('@') {
            bail!("invalid --domain '{}', expected e.g. acme.com", self.domain);
        }
        if self.max_results == 0 {
            bail!("--max-results must be at least 1");
        }
        if self.concurrency == 0 || self.max_smtp_connections == 0 {
            bail!("--concurrency and --max-smtp-connections must be at least 1");
        }
        if self.output.trim().is_empty() {
            bail!("--output must not be empty");
        }
        Ok(())
    }

    pub fn domain(&self) -> String {
        self.domain.trim().to_lowercase()
    }

    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_secs(self.smtp_timeout_secs)
    }

    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = <Cli as Parser>::try_parse_from([
            "leadscout-cli",
            "--company",
            "Acme",
            "--domain",
            "Acme.IO",
        ])
        .expect("parse");
        assert_eq!(cli.max_results, 10);
        assert_eq!(cli.output, DEFAULT_FILENAME);
        assert_eq!(cli.concurrency, 1);
        assert_eq!(cli.format, OutputFormat::Human);
        assert_eq!(cli.domain(), "acme.io");
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn rejects_bad_domain() {
        let cli = <Cli as Parser>::try_parse_from([
            "leadscout-cli",
            "--company",
            "Acme",
            "--domain",
            "localhost",
        ])
        .expect("parse");
        assert!(cli.validate().is_err());
    }

    #[test]
    fn smtp_timeout_is_bounded() {
        let parse = |secs: &str| {
            <Cli as Parser>::try_parse_from([
                "leadscout-cli",
                "--company",
                "Acme",
                "--domain",
                "acme.io",
                "--smtp-timeout",
                secs,
            ])
        };
        assert!(parse("18446744073709551615").is_err());
        assert!(parse("0").is_err());
        let cli = parse("30").expect("parse");
        assert_eq!(cli.smtp_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn titles_and_verbosity() {
        let cli = <Cli as Parser>::try_parse_from([
            "leadscout-cli",
            "--company",
            "Acme",
            "--domain",
            "acme.io",
            "--titles",
            "recruiter",
            "talent",
            "-vv",
            "--format",
            "json",
        ])
        .expect("parse");
        assert_eq!(cli.titles, ["recruiter", "talent"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.is_json());
    }
}
