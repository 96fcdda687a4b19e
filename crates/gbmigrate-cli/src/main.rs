mod commands;
mod logging;
mod progress;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, ConvertArgs, ServeArgs};
use dotenv::dotenv;
use gbmigrate_core::{AppConfig, BatchEngine, Classifier, Converter, SilentReporter};
use progress::CliReporter;
use std::path::Path;
use std::process;
use tracing::{debug, error};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {:#}", err);
            process::exit(1);
        }
    };

    match args.command {
        Some(Commands::Convert(convert_args)) => run_convert(config, convert_args),
        Some(Commands::ConvertFile { path }) => run_convert_file(&config, &path),
        Some(Commands::Serve(serve_args)) => run_serve(config, serve_args)?,
        Some(Commands::PrintConfig) => {
            let rendered =
                toml::to_string_pretty(&config).context("rendering configuration as TOML")?;
            println!("{}", rendered);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => gbmigrate_core::config::load_configuration_from(path)
            .with_context(|| format!("reading {}", path.display())),
        None => gbmigrate_core::config::load_configuration().context("reading Config.toml"),
    }
}

/// Per-file failures are reported, never turned into a failing exit status.
fn run_convert(mut config: AppConfig, args: ConvertArgs) {
    if !args.roots.is_empty() {
        config.root_paths = args.roots;
    }
    if !args.extensions.is_empty() {
        config.extensions = args.extensions;
    }
    config.ignore_patterns.extend(args.ignore_patterns);
    if let Some(threshold) = args.threshold {
        config.confidence_threshold = threshold;
    }
    if let Some(encoding) = args.source_encoding {
        config.source_encoding = encoding.into();
    }

    if config.root_paths.is_empty() {
        error!("No root paths given on the command line or in the configuration");
        return;
    }
    debug!("config: {:?}", config);

    let engine = BatchEngine::new(config).dry_run(args.dry_run);

    if args.json {
        let report = engine.run(&SilentReporter);
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(err) => error!("Error serializing report: {}", err),
        }
    } else {
        engine.run(&CliReporter::new());
    }
}

fn run_convert_file(config: &AppConfig, path: &Path) {
    let classifier = Classifier::new(config.confidence_threshold);
    let converter = Converter::new(config.source_encoding);
    let outcome =
        gbmigrate_core::convert_path(&classifier, &converter, &path.to_string_lossy());

    if outcome.success {
        println!("{}", outcome.message.green());
    } else {
        println!("{}", outcome.message.red());
    }
}

fn run_serve(mut config: AppConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if let Some(storage_dir) = args.storage_dir {
        config.server.storage_dir = storage_dir;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;
    runtime
        .block_on(gbmigrate_core::server::run_server(config))
        .context("running HTTP server")
}
