//! pgprovision - Main entry point
//!
//! Parses the command line, builds the configuration, picks the platform
//! profile and runs its steps. The process exits non-zero at the first
//! failed step.

use std::io;

use anyhow::Context;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use pgprovision::cli::Cli;
use pgprovision::platform::{resolve_platform, HostInfo};
use pgprovision::prompt::apply_prompts;
use pgprovision::report::write_plan;
use pgprovision::{
    for_platform, pipeline, process_guard, sanity, ConsoleReporter, HttpFetcher, Mode,
    ProcessGuard, ProvisionConfig, RegistryStore, StdinPrompter, SystemRunner, Toolbox,
    ZipExtractor,
};

/// Logs go to stderr; stdout carries the step progress.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    info!("pgprovision {} starting up", env!("CARGO_PKG_VERSION"));

    // Children are terminated on SIGINT/SIGTERM; the guard covers normal exit
    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }
    let guard = ProcessGuard::new();

    let cli = Cli::parse_args();
    debug!(mode = %cli.mode, dry_run = cli.dry_run, "CLI arguments parsed");

    let code = match run(&cli) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("✗ {:#}", e);
            1
        }
    };

    drop(guard);
    std::process::exit(code);
}

/// Returns whether every step succeeded.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration file: {:?}", path);
            ProvisionConfig::load_from_file(path)?
        }
        None => ProvisionConfig::default(),
    };
    cli.apply_overrides(&mut config);

    if let Some(path) = &cli.save_config {
        config.validate()?;
        config.save_to_file(path)?;
        println!("✓ Configuration saved to {}", path.display());
        return Ok(true);
    }

    let host = HostInfo::detect();
    let kind = resolve_platform(cli.platform, &host)?;
    let profile = for_platform(kind);

    let prompts = cli.pending_prompts(profile.prompts(cli.mode));
    if !prompts.is_empty() {
        apply_prompts(&mut config, &prompts, &mut StdinPrompter)
            .context("Failed to read answer from stdin")?;
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    let runner = SystemRunner::new();
    let fetcher = HttpFetcher::new()?;
    let extractor = ZipExtractor::new();
    let store = RegistryStore::new(&runner, config.registry_key.clone());
    let tools = Toolbox {
        runner: &runner,
        fetcher: &fetcher,
        extractor: &extractor,
        store: &store,
    };

    let steps = profile.steps(cli.mode, &config, tools)?;
    info!(
        platform = %kind,
        mode = %cli.mode,
        mutating = cli.mode.is_mutating(),
        "pipeline ready"
    );
    println!("pgprovision {} ({})", cli.mode, kind);

    if cli.dry_run {
        info!("Dry run: {} step(s) planned, nothing executed", steps.len());
        write_plan(&mut io::stdout().lock(), &pipeline::plan(&steps))?;
        return Ok(true);
    }

    let mut reporter = ConsoleReporter::stdout();
    let run = pipeline::run(steps, &mut reporter);

    if cli.mode == Mode::Test {
        if let Some(hint) = run
            .failed_at()
            .and_then(|step| step.strip_prefix("check-"))
            .and_then(|binary| sanity::package_for_binary(binary).map(|pkg| (binary, pkg)))
        {
            println!("  {} is provided by the '{}' package", hint.0, hint.1);
        }
    }

    info!(status = %run.status(), "run finished");
    Ok(run.is_succeeded())
}
