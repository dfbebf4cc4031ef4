//! CLI module for docmark

mod args;

pub use args::{Args, Command};

use crate::config::{Config, Overrides, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::generator;
use crate::introspect::SourceIntrospector;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the log subscriber
///
/// `DOCMARK_LOG` takes precedence over the verbosity flag.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env("DOCMARK_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    Config::load_or_default(&path)
}

pub fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Init { config, force } => {
            init_tracing(false);
            let path = config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            init_config(&path, force)?;
            println!("Config written to: {}", path.display());
            Ok(())
        }

        Command::Build {
            modules,
            config,
            output,
            no_root_directories,
            include_dot_files,
            include_underscore_files,
            ignore,
            keep_order,
            verbose,
        } => {
            init_tracing(verbose);
            let mut cfg = load_config(config)?;

            // Merge CLI arguments (CLI takes precedence)
            cfg.merge_cli(Overrides {
                modules,
                output,
                no_root_directories,
                include_dot_files,
                include_underscore_files,
                ignore,
                keep_order,
            });
            cfg.validate_for_build()?;

            if verbose {
                println!("Modules: {:?}", cfg.build.modules);
                println!("Output: {}", cfg.build.output_directory.display());
            }

            let report = generator::build(&cfg, verbose)?;
            println!("{}", report.summary());
            println!(
                "Documentation written to: {}",
                cfg.build.output_directory.display()
            );
            Ok(())
        }

        Command::Clean {
            modules,
            config,
            output,
            verbose,
        } => {
            init_tracing(verbose);
            let mut cfg = load_config(config)?;
            cfg.merge_cli(Overrides {
                modules,
                output,
                ..Default::default()
            });

            let report = generator::clean(&cfg, verbose)?;
            println!("{}", report.summary());
            for dir in &report.dirs_kept {
                println!("  kept {}", dir.display());
            }
            Ok(())
        }

        Command::Inspect { file } => {
            init_tracing(false);
            let mut introspector = SourceIntrospector::new()?;
            let module = introspector.inspect_file(&file)?;
            println!("{}", serde_json::to_string_pretty(&module)?);
            Ok(())
        }

        Command::Version => {
            println!("docmark {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Write the default configuration to `path`
fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::other(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }
    Config::default().save(path)
}
