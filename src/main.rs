use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use sitegen::config::Config;
use sitegen::diagnostics::{render_error, CompileError};
use sitegen::fixture::{Fixture, RunError, Site};

#[derive(Parser)]
#[command(name = "sitegen", version, about = "Static call-site code generator")]
struct Cli {
    /// Path to a sitegen.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log selection and emission at debug level
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rule and strategy chosen for each site
    Select {
        /// Fixture file path
        file: PathBuf,
        /// Only this site
        #[arg(long)]
        site: Option<String>,
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
    /// Print the instruction listing for each site
    Emit {
        /// Fixture file path
        file: PathBuf,
        /// Only this site
        #[arg(long)]
        site: Option<String>,
    },
    /// Emit each site and execute it in the reference VM
    Run {
        /// Fixture file path
        file: PathBuf,
        /// Only this site
        #[arg(long)]
        site: Option<String>,
    },
}

fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        config.log.level.parse().unwrap_or(tracing::Level::WARN)
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .init();
}

fn fail(source: &str, err: &CompileError) -> ! {
    render_error(source, err);
    std::process::exit(1);
}

fn load_fixture(file: &Path) -> Fixture {
    Fixture::load(file).unwrap_or_else(|err| fail("", &err))
}

/// Sites to process, optionally narrowed to one by name.
fn selected_sites<'f>(fixture: &'f Fixture, only: Option<&str>) -> Vec<&'f Site> {
    match only {
        Some(name) => match fixture.site(name) {
            Some(site) => vec![site],
            None => {
                eprintln!("error: no site named '{name}' in {}", fixture.path.display());
                std::process::exit(1);
            }
        },
        None => fixture.sites.iter().collect(),
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match sitegen::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => fail("", &err),
    };
    init_logging(&config, cli.verbose);
    let options = &config.codegen;

    match cli.command {
        Commands::Select { file, site, json } => {
            let fixture = load_fixture(&file);
            let selections: Vec<_> = selected_sites(&fixture, site.as_deref())
                .into_iter()
                .map(|site| fixture.select(site, options))
                .collect();
            if json {
                match serde_json::to_string_pretty(&selections) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("error: could not serialize selections: {e}");
                        std::process::exit(1);
                    }
                }
            } else {
                for s in &selections {
                    match &s.target {
                        Some(target) => println!("{}: {} -> {} ({target})", s.site, s.rule, s.strategy),
                        None => println!("{}: {} -> {}", s.site, s.rule, s.strategy),
                    }
                }
            }
        }
        Commands::Emit { file, site } => {
            let fixture = load_fixture(&file);
            let mut reported = 0;
            for site in selected_sites(&fixture, site.as_deref()) {
                let emitted = match fixture.emit(site, options) {
                    Ok(emitted) => emitted,
                    Err(err) => fail(&fixture.source, &err),
                };
                println!(
                    "== {} ({} -> {}): {}",
                    site.name, emitted.selection.rule, emitted.selection.strategy, emitted.result
                );
                println!("{}", emitted.listing());
                for err in &emitted.diagnostics {
                    render_error(&fixture.source, err);
                }
                reported += emitted.diagnostics.len();
            }
            if reported > 0 {
                eprintln!("{reported} error(s) reported");
                std::process::exit(1);
            }
        }
        Commands::Run { file, site } => {
            let fixture = load_fixture(&file);
            for site in selected_sites(&fixture, site.as_deref()) {
                match fixture.run(site, options) {
                    Ok((emitted, rendered)) => {
                        for err in &emitted.diagnostics {
                            render_error(&fixture.source, err);
                        }
                        println!("{} = {rendered}", site.name);
                    }
                    Err(RunError::Compile(err)) => fail(&fixture.source, &err),
                    Err(err @ RunError::Vm(_)) => {
                        eprintln!("error [{}]: {err}", site.name);
                        std::process::exit(1);
                    }
                }
            }
        }
    }
}
