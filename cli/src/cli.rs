//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::domain::command::CommandLine;
use crate::domain::config::ConfigOverrides;
use crate::infra::config::{DEFAULT_CONFIG_PATH, YamlConfigStore};
use crate::output::{OutputContext, json};

/// Exit code for invalid settings or arguments (`EX_USAGE`).
pub const EXIT_USAGE: i32 = 64;

/// The current command line, shell-quoted for the `sudo` hint.
#[must_use]
pub fn reinvocation(argv: impl IntoIterator<Item = String>) -> String {
    let mut argv = argv.into_iter();
    let program = argv.next().unwrap_or_else(|| "birthday-provision".to_string());
    CommandLine::new(program).args(argv).to_string()
}

/// Provision this host to run the birthday bot as a systemd service
#[derive(Parser, Debug)]
#[command(name = "birthday-provision", version)]
pub struct Cli {
    /// Settings file (YAML); a missing file means defaults
    #[arg(short, long, env = "BIRTHDAY_PROVISION_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// systemd unit name, also the default install directory name
    #[arg(long, value_name = "NAME")]
    pub service_name: Option<String>,

    /// Installation directory [default: /opt/<service-name>]
    #[arg(long, value_name = "DIR")]
    pub install_dir: Option<PathBuf>,

    /// Account that owns the files and runs the bot
    #[arg(long, value_name = "USER")]
    pub service_user: Option<String>,

    /// Host timezone, e.g. Europe/Moscow
    #[arg(long, value_name = "TZ")]
    pub timezone: Option<String>,

    /// Git repository to clone into the install directory
    #[arg(long, value_name = "URL")]
    pub repo: Option<String>,

    /// Start the service once it is enabled
    #[arg(long)]
    pub start: bool,

    /// Generate a unit file when the sources do not ship one
    #[arg(long)]
    pub generate_unit: bool,

    /// Show what would change without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    /// Log diagnostic events to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Execute the provisioning run and return the process exit code.
    pub async fn run(self, reinvoke: &str) -> i32 {
        let flags = AppFlags {
            output: OutputFlags { no_color: self.no_color, quiet: self.quiet, json: self.json },
            dry_run: self.dry_run,
        };
        let app = match self.build_app(&flags) {
            Ok(app) => app,
            Err(e) => {
                report_usage_error(&flags.output, &e);
                return EXIT_USAGE;
            }
        };
        commands::provision::run(&app, reinvoke).await
    }

    /// Load settings, apply flags and validate before touching the host.
    fn build_app(&self, flags: &AppFlags) -> Result<AppContext> {
        let store = YamlConfigStore::new(&self.config);
        let config = store.load()?.with_overrides(self.overrides());
        config.validate()?;
        tracing::debug!(path = %store.path().display(), ?config, "settings resolved");
        Ok(AppContext::new(flags, config))
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            service_name: self.service_name.clone(),
            install_dir: self.install_dir.clone(),
            service_user: self.service_user.clone(),
            timezone: self.timezone.clone(),
            repository: self.repo.clone(),
            start_service: self.start,
            generate_unit: self.generate_unit,
        }
    }
}

fn report_usage_error(flags: &OutputFlags, error: &anyhow::Error) {
    let message = format!("{error:#}");
    if flags.json {
        match json::format_error(&message, EXIT_USAGE) {
            Ok(doc) => println!("{doc}"),
            Err(_) => eprintln!("Error: {message}"),
        }
    } else {
        OutputContext::new(flags.no_color, flags.quiet, false).error(&message);
    }
}
