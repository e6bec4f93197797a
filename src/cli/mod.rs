//! Command-line parsing for the poll aggregation and seat projection engine.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! aggregation/projection code. Every option can also be set from the
//! environment (a `.env` file is loaded first).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::aggregate::DEFAULT_ALPHA;
use crate::domain::NationalBaselinePolicy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "katelect", version, about = "Canadian poll aggregator and seat projector")]
pub struct Cli {
    /// Log directive(s) added to `RUST_LOG` (e.g. `debug` or `katelect::swing=trace`).
    #[arg(long, global = true, default_value = "info", env = "KATELECT_LOG")]
    pub log: String,

    /// Data directory holding `polls/`, `results/`, `districts/` and the outputs.
    #[arg(long, global = true, default_value = "data", env = "KATELECT_DATA_DIR")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate and smooth every region's polls, then write averages and latest files.
    Aggregate(EngineArgs),
    /// Project riding winners and seat counts from the national latest values.
    Project(EngineArgs),
    /// Aggregate, then project from the in-memory national snapshot.
    Run(EngineArgs),
    /// Plot a region's published smoothed series.
    Plot(PlotArgs),
    /// Look up published results.
    #[command(subcommand)]
    Show(ShowCommand),
}

/// Options shared by the engine commands.
#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// Exponential smoothing constant (0 < alpha <= 1).
    #[arg(long, default_value_t = DEFAULT_ALPHA, env = "KATELECT_ALPHA")]
    pub alpha: f64,

    /// Candidate baseline election years, newest first.
    #[arg(long, value_delimiter = ',', default_value = "2021,2019", env = "KATELECT_YEARS")]
    pub years: Vec<u16>,

    /// Riding-code prefix of the province where the bloc runs candidates.
    #[arg(long, default_value = "24", env = "KATELECT_BLOC_PREFIX")]
    pub bloc_prefix: String,

    /// Region code whose latest values feed the swing model.
    #[arg(long, default_value = "federal", env = "KATELECT_NATIONAL_REGION")]
    pub national_region: String,

    /// How the national baseline for swing ratios is chosen.
    #[arg(long, value_enum, default_value_t = NationalBaselinePolicy::FirstAssigned, env = "KATELECT_BASELINE_POLICY")]
    pub baseline_policy: NationalBaselinePolicy,

    /// Export per-riding projections to CSV.
    #[arg(long)]
    pub export_csv: Option<PathBuf>,

    /// Render the national series as an ASCII plot after aggregating.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for plotting a published series.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Region display name (`federal`, `quebec`, `ontario`, ...).
    #[arg(long)]
    pub region: String,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Subcommand)]
pub enum ShowCommand {
    /// Regions with published averages.
    Regions,
    /// Latest values and changes for a region.
    Latest {
        /// Region display name.
        region: String,
    },
    /// Projected shares and winner for a riding.
    Riding {
        /// Riding code.
        code: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_defaults() {
        let cli = Cli::try_parse_from(["katelect", "run"]).unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.alpha, 0.25);
        assert_eq!(args.years, vec![2021, 2019]);
        assert_eq!(args.bloc_prefix, "24");
        assert_eq!(args.baseline_policy, NationalBaselinePolicy::FirstAssigned);
    }

    #[test]
    fn parses_policy_years_and_lookups() {
        let cli = Cli::try_parse_from([
            "katelect",
            "--data-dir",
            "/tmp/polls",
            "project",
            "--years",
            "2019,2015",
            "--baseline-policy",
            "per-riding-year",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/polls"));
        let Command::Project(args) = cli.command else {
            panic!("expected project");
        };
        assert_eq!(args.years, vec![2019, 2015]);
        assert_eq!(args.baseline_policy, NationalBaselinePolicy::PerRidingYear);

        let cli = Cli::try_parse_from(["katelect", "show", "riding", "24001"]).unwrap();
        assert!(matches!(cli.command, Command::Show(ShowCommand::Riding { code }) if code == "24001"));

        let cli = Cli::try_parse_from(["katelect", "show", "regions"]).unwrap();
        assert!(matches!(cli.command, Command::Show(ShowCommand::Regions)));
    }
}
