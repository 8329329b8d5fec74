//! reaper: terminate unhealthy and off-version instances across
//! autoscaling groups without dropping any group below a healthy floor.
//!
//! # Usage
//!
//! ```text
//! reaper run --inventory fleet.json --ledger terminations.jsonl \
//!     --dry-run false --minimum-instance-count 2 --canonical-version 1.4.0
//! reaper describe --inventory fleet.json --groups api,worker
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{DescribeArgs, RunArgs};

#[derive(Parser)]
#[command(
    name = "reaper",
    about = "Terminate unhealthy and off-version autoscaling instances",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one termination pass over every selected group.
    ///
    /// Dry run is on by default: decisions are computed and reported,
    /// nothing is terminated. Pass `--dry-run false` to execute.
    Run(RunArgs),
    /// Show groups with their probed instance versions.
    Describe(DescribeArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env().add_directive("reaper=info".parse()?);
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    match cli.command {
        Commands::Run(args) => commands::run::run(&args).await,
        Commands::Describe(args) => commands::describe::describe(&args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use reaper_core::{ReaperConfig, SemanticVersion};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn run_args(cli: Cli) -> RunArgs {
        match cli.command {
            Commands::Run(args) => args,
            Commands::Describe(_) => panic!("expected run"),
        }
    }

    #[test]
    fn run_defaults() {
        let args = run_args(parse(&["reaper", "run"]));
        let config = ReaperConfig::default();

        let policy = args.policy(&config).unwrap();
        assert!(policy.is_dry_run);
        assert_eq!(policy.minimum_instance_count, 1);
        assert!(policy.only_terminate_old_versions);
        assert!(policy.canonical_version.is_none());
        assert!(policy.group_name_filter.is_empty());

        let probe = args.provider.probe_target(&config).unwrap();
        assert_eq!(probe.port, 80);
        assert_eq!(probe.path, "/version/");
        assert_eq!(args.format, "text");
    }

    #[test]
    fn run_flags_override_config() {
        let config = ReaperConfig::from_toml(
            r#"
            [policy]
            minimum_instance_count = 3
            dry_run = true
            groups = ["billing"]

            [probe]
            port = 8080
            "#,
        )
        .unwrap();

        let args = run_args(parse(&[
            "reaper",
            "run",
            "--dry-run",
            "false",
            "--minimum-instance-count",
            "2",
            "--groups",
            "api, worker,,",
            "--canonical-version",
            "v1.4.0",
            "--probe-timeout",
            "500ms",
        ]));

        let policy = args.policy(&config).unwrap();
        assert!(!policy.is_dry_run);
        assert_eq!(policy.minimum_instance_count, 2);
        assert_eq!(policy.group_name_filter, vec!["api", "worker"]);
        assert_eq!(policy.canonical_version, Some(SemanticVersion::new(1, 4, 0)));

        let probe = args.provider.probe_target(&config).unwrap();
        assert_eq!(probe.port, 8080);
        assert_eq!(probe.timeout, Duration::from_millis(500));
    }

    #[test]
    fn malformed_canonical_version_is_rejected() {
        let args = run_args(parse(&["reaper", "run", "--canonical-version", "latest"]));
        assert!(args.policy(&ReaperConfig::default()).is_err());
    }

    #[test]
    fn https_probe_is_rejected() {
        let args = run_args(parse(&["reaper", "run", "--scheme", "https"]));
        assert!(args.provider.probe_target(&ReaperConfig::default()).is_err());
    }

    #[test]
    fn inventory_is_required() {
        let args = run_args(parse(&["reaper", "run"]));
        assert!(args.provider.inventory_provider(&ReaperConfig::default()).is_err());
    }

    #[test]
    fn config_file_supplies_provider() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("reaper.toml");
        std::fs::write(
            &config_path,
            r#"
            [provider]
            region = "us-west-2"
            inventory = "/srv/fleet.json"
            "#,
        )
        .unwrap();

        let args = run_args(parse(&[
            "reaper",
            "run",
            "--config",
            config_path.to_str().unwrap(),
        ]));
        let config = args.provider.load().unwrap();
        let provider = args.provider.inventory_provider(&config).unwrap();
        assert_eq!(provider.region(), "us-west-2");
    }

    #[test]
    fn log_format_is_global() {
        let cli = parse(&["reaper", "run", "--log-format", "json"]);
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
