mod cli;
mod config;
mod domain;
mod error;
mod infra;
mod workflows;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command, ConfigCommand, ProcessArgs};
use config::Config;
use infra::cache;
use infra::extract::CommandExtractor;
use infra::fs::FsRelocator;
use workflows::indexer;
use workflows::pipeline::{Pipeline, ProcessOptions};
use workflows::renamer::SuffixPolicy;
use workflows::sources::{cached::CachedLibrary, live::LiveLibrary, VideoSource};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };

    // Logs go to stderr so that reports on stdout stay parseable.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config_path = config::resolve_config_path(cli.config.as_deref());
    let mut config = Config::load_or_create(&config_path)?;

    match cli.command {
        Command::Process(args) => process(&config, &config_path, args),
        Command::Scan { library } => scan(&config, &config_path, library.as_deref()),
        Command::Config(ConfigCommand::Show) => {
            println!("# {}", config_path.display());
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Config(ConfigCommand::AddLibrary { path, name }) => {
            if !path.is_dir() {
                bail!("Library path is not a directory: {path:?}");
            }
            let name = match name {
                Some(name) => name,
                None => indexer::default_library_name(&path)
                    .with_context(|| format!("Cannot derive a library name from {path:?}, pass --name"))?,
            };
            config.add_library(&name, &path)?;
            config.save(&config_path)?;
            println!("Added library '{name}' at {}", path.display());
            Ok(())
        }
        Command::Config(ConfigCommand::RemoveLibrary { name }) => {
            config.remove_library(&name)?;
            config.save(&config_path)?;
            println!("Removed library '{name}'");
            Ok(())
        }
    }
}

fn process(config: &Config, config_path: &Path, args: ProcessArgs) -> Result<()> {
    if config.media_libraries.is_empty() {
        bail!("No media libraries configured. Add one with `config add-library PATH`");
    }

    let libraries = build_sources(config, config_path, args.use_cache);
    let suffix_policy = match (args.lang, args.keep_suffix) {
        (_, true) => SuffixPolicy::Preserve,
        (Some(tag), false) => SuffixPolicy::Language(tag),
        (None, false) => SuffixPolicy::Language(String::new()),
    };

    let pipeline = Pipeline {
        libraries: &libraries,
        extractor: &CommandExtractor,
        relocator: &FsRelocator,
        subtitle_extensions: &config.subtitle_extensions,
        pack_extensions: &config.subtitle_pack_extensions,
        temp_dir: &config.temp_dir,
        options: ProcessOptions {
            suffix_policy,
            overwrite: args.overwrite,
            threshold: args.threshold.unwrap_or(config.threshold),
            ignore_show_name: args.ignore_show_name,
            dry_run: args.dry_run,
        },
    };
    let reports = pipeline.run(&args.inputs);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{report}");
        }
    }
    Ok(())
}

/// One source per configured library, in config order.
fn build_sources(config: &Config, config_path: &Path, use_cache: bool) -> Vec<Box<dyn VideoSource>> {
    let cache_dir = config.cache_dir(config_path);

    config
        .media_libraries
        .iter()
        .map(|library| -> Box<dyn VideoSource> {
            if use_cache {
                if let Some(index) = cache::load(&cache_dir, &library.library_name) {
                    return Box::new(CachedLibrary::new(
                        &library.library_name,
                        &library.library_path,
                        &index,
                    ));
                }
                warn!(library = %library.library_name, "no cache found, scanning library");
            }
            Box::new(LiveLibrary::new(
                &library.library_name,
                library.library_path.clone(),
                config.video_extensions.clone(),
            ))
        })
        .collect()
}

fn scan(config: &Config, config_path: &Path, only: Option<&str>) -> Result<()> {
    let libraries: Vec<_> = match only {
        Some(name) => vec![config
            .library(name)
            .with_context(|| format!("Library '{name}' not found"))?],
        None => config.media_libraries.iter().collect(),
    };
    if libraries.is_empty() {
        bail!("No media libraries configured. Add one with `config add-library PATH`");
    }

    let cache_dir = config.cache_dir(config_path);
    for library in libraries {
        let index = indexer::scan_library(
            &library.library_name,
            &library.library_path,
            &config.video_extensions,
            &config.subtitle_extensions,
        )?;
        let path = cache::save(&cache_dir, &index)?;
        info!(library = %library.library_name, path = %path.display(), "cache written");
        println!(
            "{}: {} show(s), {} episode(s)",
            library.library_name,
            index.shows.len(),
            index.episode_count()
        );
    }
    Ok(())
}
