mod adapters;
mod application;
mod cli;
mod config;
mod dependency_graph;
mod ports;
mod shared;

use adapters::outbound::console::{StderrProgressReporter, SummaryPrinter};
use adapters::outbound::filesystem::{FileSystemWriter, PackageJsonReader};
use adapters::outbound::network::NpmRegistryClient;
use adapters::outbound::scanner::JavaScriptPackageScanner;
use adapters::outbound::ManifestRouter;
use application::dto::WalkRequest;
use application::use_cases::WalkDependenciesUseCase;
use clap::Parser;
use cli::{Args, Command};
use config::Settings;
use dependency_graph::domain::DependencySpec;
use ports::outbound::OutputPresenter;
use shared::error::{DepwalkError, ExitCode};
use shared::Result;
use std::path::Path;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                ExitCode::InvalidArguments
            } else {
                ExitCode::Success
            };
            process::exit(code.as_i32());
        }
    };

    if let Err(e) = run(args).await {
        eprintln!("\n❌ An error occurred:\n");
        eprintln!("{}", e);

        // Display error chain
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("\nCaused by: {}", err);
            source = err.source();
        }

        eprintln!();
        process::exit(ExitCode::ApplicationError.as_i32());
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let working_dir = std::env::current_dir().map_err(|e| DepwalkError::InvalidProjectPath {
        path: ".".into(),
        reason: e.to_string(),
    })?;

    let options = args.command.options();
    let config_file = config::load_config(options.config.as_deref(), &working_dir)?;
    let settings = Settings::resolve(options, config_file)?;
    tracing::debug!(?settings, "effective settings");

    let request = build_request(&args.command, &working_dir, &settings)?;

    // Create adapters (Dependency Injection)
    let timeout = Duration::from_secs(settings.timeout_secs);
    let manifest_source = ManifestRouter::new(
        NpmRegistryClient::with_registry(&settings.registry_url, timeout)?,
        PackageJsonReader::new(&working_dir),
    );
    let package_scanner = JavaScriptPackageScanner::new(timeout)?;
    let progress_reporter = StderrProgressReporter::new();

    let use_case = WalkDependenciesUseCase::new(manifest_source, package_scanner, progress_reporter);
    let result = use_case.execute(request).await?;

    let payload = result.to_json()?;
    let writer = FileSystemWriter::for_output_name(&settings.output);
    writer.present(&payload)?;

    SummaryPrinter::print(&result);
    Ok(())
}

fn build_request(command: &Command, working_dir: &Path, settings: &Settings) -> Result<WalkRequest> {
    let builder = WalkRequest::builder()
        .max_depth(settings.max_depth)
        .concurrency_limit(settings.concurrency);

    let builder = match command {
        Command::Cwd(_) => builder.project_path(working_dir),
        Command::From { package, .. } => builder.package(DependencySpec::parse(package)?),
    };

    builder.build()
}
