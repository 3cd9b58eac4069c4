//! Runner binary for the strata pipeline jobs.
//!
//! Each job (`extract`, `transform`, `load`) is independently invocable and
//! exchanges staged-path manifests with the others; `run` chains all three
//! in-process. An external scheduler is expected to serialize invocations,
//! since concurrent overlapping runs are not protected against.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use strata::pipeline::Pipeline;
use strata::secrets::CredentialProvider;
use strata::source::PgSourceClient;
use strata::staging::run_time_from_key;
use strata::store::object::FsObjectStore;
use strata::load::PgWarehouseLoader;

use crate::config::{
    RunnerConfig, SOURCE_CREDENTIALS, WAREHOUSE_CREDENTIALS, connection_from_credentials,
    credential_provider, load_runner_config,
};
use crate::error::{RunnerError, RunnerResult};

mod config;
mod error;

#[derive(Debug, Parser)]
#[command(name = "strata-runner", about = "Warehouse ETL pipeline jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract changed rows into raw staging.
    Extract {
        /// File receiving the staged-path manifest.
        #[arg(long, default_value = "extract-manifest.json")]
        manifest_out: PathBuf,
    },
    /// Transform staged raw tables into warehouse-shaped parquet.
    Transform {
        /// Staged-path manifest produced by the extract job.
        #[arg(long)]
        manifest: PathBuf,
        /// File receiving the transformed-path manifest.
        #[arg(long, default_value = "transform-manifest.json")]
        manifest_out: PathBuf,
    },
    /// Append transformed tables into the warehouse.
    Load {
        /// Transformed-path manifest produced by the transform job.
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Run extract, transform and load back to back.
    Run,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let runner_config = match load_runner_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err.render_report());
            return ExitCode::FAILURE;
        }
    };

    strata_telemetry::tracing::init_tracing(env!("CARGO_BIN_NAME"));

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("{}", RunnerError::from(err).render_report());
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = runtime.block_on(async_main(cli, runner_config)) {
        error!("{err}");
        eprintln!("{}", err.render_report());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn async_main(cli: Cli, runner_config: RunnerConfig) -> RunnerResult<()> {
    // Credentials are resolved once per run, before any other I/O; a missing
    // entry aborts here.
    let credentials = credential_provider(&runner_config);
    let source_connection = connection_from_credentials(
        credentials.get_credentials(SOURCE_CREDENTIALS).await?,
        &runner_config.pipeline.source,
    );
    let warehouse_connection = connection_from_credentials(
        credentials.get_credentials(WAREHOUSE_CREDENTIALS).await?,
        &runner_config.pipeline.warehouse,
    );

    let store = FsObjectStore::new(&runner_config.storage_root);
    let source = PgSourceClient::connect(&source_connection).await?;
    let warehouse = PgWarehouseLoader::connect(&warehouse_connection).await?;

    let pipeline = Pipeline::new(runner_config.pipeline, store, source, warehouse);

    match cli.command {
        Command::Extract { manifest_out } => {
            let report = pipeline.run_extract(Utc::now().naive_utc()).await?;
            write_manifest(&manifest_out, &report.staged_paths)?;

            info!(
                staged_tables = report.staged_paths.len(),
                manifest = %manifest_out.display(),
                "extract job finished"
            );
        }
        Command::Transform {
            manifest,
            manifest_out,
        } => {
            let staged_paths = read_manifest(&manifest)?;

            // The run timestamp is recovered from the staged keys so that
            // transformed tables land next to the raw ones; a pathless run
            // (nothing staged) still gets a timestamp for the calendar
            // dimension.
            let run_started_at = staged_paths
                .first()
                .and_then(|path| run_time_from_key(path))
                .unwrap_or_else(|| Utc::now().naive_utc());

            let report = pipeline
                .run_transform(&staged_paths, run_started_at, Utc::now().date_naive())
                .await?;
            write_manifest(&manifest_out, &report.transformed_paths)?;

            info!(
                transformed_tables = report.transformed_paths.len(),
                manifest = %manifest_out.display(),
                "transform job finished"
            );
        }
        Command::Load { manifest } => {
            let transformed_paths = read_manifest(&manifest)?;
            let report = pipeline.run_load(&transformed_paths).await?;

            info!(tables = report.appended_rows.len(), "load job finished");
        }
        Command::Run => {
            let report = pipeline.run(Utc::now().naive_utc()).await?;

            info!(
                staged_tables = report.extract.staged_paths.len(),
                transformed_tables = report.transform.transformed_paths.len(),
                loaded_tables = report.load.appended_rows.len(),
                "full run finished"
            );
        }
    }

    Ok(())
}

/// Reads a staged-path manifest: a JSON array of key strings.
fn read_manifest(path: &Path) -> RunnerResult<Vec<String>> {
    let body = std::fs::read(path)?;
    Ok(serde_json::from_slice(&body)?)
}

/// Writes a staged-path manifest.
fn write_manifest(path: &Path, paths: &[String]) -> RunnerResult<()> {
    let body = serde_json::to_vec_pretty(paths)?;
    std::fs::write(path, body)?;
    Ok(())
}
