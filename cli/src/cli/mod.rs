mod output;
mod submit;

use anyhow::{Context, Result};
use cook_core::utils::config::Settings;
use cook_core::utils::logging;
use std::path::PathBuf;
use structopt::{clap::AppSettings, StructOpt};

use self::{output::ConsoleReporter, submit::SubmitCommand};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "cs",
    about = "Submit jobs to Cook scheduler clusters",
    global_settings = &[AppSettings::DisableHelpSubcommand]
)]
pub struct Cli {
    /// Settings file to use (default: ~/.cs.json)
    #[structopt(short = "C", long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Name of the configured cluster to use
    #[structopt(short, long)]
    cluster: Option<String>,

    /// URL of an ad-hoc cluster to use
    #[structopt(short, long)]
    url: Option<String>,

    /// Only print job UUIDs
    #[structopt(short, long)]
    silent: bool,

    /// Log debug output to stderr
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    cmd: AppCommand,
}

#[derive(StructOpt, Debug)]
pub enum AppCommand {
    /// Create a job for a command
    #[structopt(name = "submit")]
    Submit(SubmitCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load(self.config.as_deref())?;
        logging::init(
            settings.logging.file.as_deref(),
            logging::level_from_name(&settings.logging.level),
            self.verbose,
        )?;
        log::debug!("Settings: {:?}", settings);

        let clusters = settings
            .select_clusters(self.cluster.as_deref(), self.url.as_deref())
            .context("Failed to select clusters")?;
        let reporter = ConsoleReporter::new(self.silent);

        match self.cmd {
            AppCommand::Submit(cmd) => cmd.execute(&settings, &clusters, &reporter).await,
        }
    }
}
