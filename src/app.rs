//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the log subscriber
//! - runs aggregation and/or projection
//! - prints reports/plots and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use crate::aggregate::validate_alpha;
use crate::cli::{Cli, Command, EngineArgs, PlotArgs, ShowCommand};
use crate::domain::{RunConfig, region_name};
use crate::error::AppError;
use crate::io::DataPaths;
use crate::store::ArtifactStore;

pub mod pipeline;

/// Entry point for the `katelect` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log)?;

    match cli.command {
        Command::Aggregate(args) => {
            let config = run_config_from_args(&cli.data_dir, &args)?;
            handle_aggregate(&config).map(|_| ())
        }
        Command::Project(args) => {
            let config = run_config_from_args(&cli.data_dir, &args)?;
            let (date, polling) = pipeline::published_national_polling(&config)?;
            handle_project(&config, date, polling)
        }
        Command::Run(args) => {
            let config = run_config_from_args(&cli.data_dir, &args)?;
            let run = handle_aggregate(&config)?;
            let national = run.regions.get(&config.national_region).ok_or_else(|| {
                AppError::new(
                    3,
                    format!("National region '{}' produced no series.", config.national_region),
                )
            })?;
            handle_project(&config, national.latest.date, national.latest.latest_values)
        }
        Command::Plot(args) => handle_plot(&cli.data_dir, &args),
        Command::Show(show) => handle_show(&cli.data_dir, show),
    }
}

fn init_logging(directive: &str) -> Result<(), AppError> {
    let directive: Directive = directive
        .parse()
        .map_err(|e| AppError::new(2, format!("Invalid log directive '{directive}': {e}")))?;
    let filter = EnvFilter::from_default_env().add_directive(directive);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn handle_aggregate(config: &RunConfig) -> Result<pipeline::AggregationRun, AppError> {
    let run = pipeline::run_aggregation(config)?;
    println!("{}", crate::report::format_aggregation_summary(&run));

    if let Some(national) = run.regions.get(&config.national_region) {
        println!(
            "{}",
            crate::report::format_snapshot(&config.national_region, &national.latest)
        );
        if config.plot {
            let plot = crate::plot::render_series_plot(&national.series, config.plot_width, config.plot_height);
            println!("{plot}");
        }
    }

    Ok(run)
}

fn handle_project(config: &RunConfig, date: chrono::NaiveDate, polling: crate::domain::PartyShares) -> Result<(), AppError> {
    let run = pipeline::run_projection(config, date, polling)?;

    println!("{}", crate::report::format_projection_summary(&run));
    println!("{}", crate::report::format_seat_table(&run.tally));

    // Optional export.
    if let Some(path) = &config.export_csv {
        crate::io::write_projections_csv(path, run.batch.projections.values())?;
    }

    Ok(())
}

fn handle_plot(data_dir: &std::path::Path, args: &PlotArgs) -> Result<(), AppError> {
    let store = ArtifactStore::load(&DataPaths::new(data_dir))?;
    let series = store.averages(&args.region)?;
    println!("{}", crate::plot::render_series_plot(series, args.width, args.height));
    Ok(())
}

fn handle_show(data_dir: &std::path::Path, show: ShowCommand) -> Result<(), AppError> {
    let store = ArtifactStore::load(&DataPaths::new(data_dir))?;
    match show {
        ShowCommand::Regions => {
            let regions = store.regions();
            if regions.is_empty() {
                println!("No regions published.");
            }
            for name in regions {
                println!("{name}");
            }
        }
        ShowCommand::Latest { region } => {
            let snapshot = store.latest(&region)?;
            println!("{}", crate::report::format_snapshot(&region, snapshot));
        }
        ShowCommand::Riding { code } => {
            let projection = store.riding(&code)?;
            println!("{}", crate::report::format_riding(projection));
        }
    }
    Ok(())
}

/// Build a validated `RunConfig` from CLI arguments.
pub fn run_config_from_args(data_dir: &std::path::Path, args: &EngineArgs) -> Result<RunConfig, AppError> {
    let alpha = validate_alpha(args.alpha)?;
    if args.years.is_empty() {
        return Err(AppError::new(2, "At least one candidate baseline year is required."));
    }
    if region_name(&args.national_region).is_none() {
        return Err(AppError::new(
            2,
            format!("Unknown national region code '{}'.", args.national_region),
        ));
    }

    Ok(RunConfig {
        data_dir: data_dir.to_path_buf(),
        alpha,
        years: args.years.clone(),
        bloc_prefix: args.bloc_prefix.clone(),
        national_region: args.national_region.clone(),
        baseline_policy: args.baseline_policy,
        export_csv: args.export_csv.clone(),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn engine_args(argv: &[&str]) -> EngineArgs {
        let mut full = vec!["katelect", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Run(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_carries_cli_values() {
        let args = engine_args(&["--alpha", "0.5", "--years", "2019", "--export-csv", "out.csv"]);
        let config = run_config_from_args(Path::new("/srv/data"), &args).unwrap();
        assert_eq!(config.alpha, 0.5);
        assert_eq!(config.years, vec![2019]);
        assert_eq!(config.data_dir, Path::new("/srv/data"));
        assert_eq!(config.export_csv.as_deref(), Some(Path::new("out.csv")));
    }

    #[test]
    fn invalid_alpha_and_region_are_config_errors() {
        let args = engine_args(&["--alpha", "1.5"]);
        assert_eq!(run_config_from_args(Path::new("data"), &args).unwrap_err().exit_code(), 2);

        let args = engine_args(&["--national-region", "yukon"]);
        assert_eq!(run_config_from_args(Path::new("data"), &args).unwrap_err().exit_code(), 2);
    }
}
