#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use cicada_core::paths::{absolutize, project_root};
use cicada_core::BuildConfig;
use clap::Parser;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cicada-build")]
#[command(author, version, about = "Builds add-on packs: rewrites script imports and vendors runtime dependencies", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Specifier prefix left untouched by the rewriter (repeatable; replaces the default)
    #[arg(long = "reserved-prefix", global = true, value_name = "PREFIX")]
    reserved_prefixes: Vec<String>,

    /// Package never vendored (repeatable; added to the defaults)
    #[arg(long, global = true, value_name = "PACKAGE")]
    exclude: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Write pack manifests and populate the build tree
    Build,

    /// Remove the build and generated trees
    Clean,

    /// Remove all build outputs, archives included
    Distclean,

    /// Show which dependencies would be vendored and the aliases they add
    Vendor {
        /// Directory vendored packages are staged under (defaults to the build directory)
        #[arg(long, value_name = "PATH")]
        vendor_root: Option<PathBuf>,
    },

    /// Rewrite the imports of a single file and print the result
    Rewrite {
        /// Script to rewrite
        file: PathBuf,

        /// Where the rewritten script is going to live
        #[arg(long, value_name = "PATH")]
        dest: PathBuf,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Build => "build",
            Self::Clean => "clean",
            Self::Distclean => "distclean",
            Self::Vendor { .. } => "vendor",
            Self::Rewrite { .. } => "rewrite",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let current = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let cwd = cli.cwd.map_or_else(|| current.clone(), |p| absolutize(&current, p));
    let root = project_root(&cwd).unwrap_or_else(|| cwd.clone());

    let config = BuildConfig::new(root)
        .with_reserved_prefixes(cli.reserved_prefixes)
        .with_excluded(cli.exclude);

    logging::init(cli.verbose, cli.json);

    let command = cli.command.unwrap_or(Commands::Version);
    let span = tracing::info_span!("cicada", cmd = command.name(), root = %config.root.display());
    let _guard = span.enter();

    match command {
        Commands::Version => commands::version::run(cli.json),
        Commands::Build => commands::build::run(&config, cli.json),
        Commands::Clean => commands::clean::run(&config, cli.json),
        Commands::Distclean => commands::clean::run_dist(&config, cli.json),
        Commands::Vendor { vendor_root } => {
            let vendor_root = vendor_root.map_or_else(|| config.build_path(), |p| absolutize(&cwd, p));
            commands::vendor::run(&config, &vendor_root, cli.json)
        }
        Commands::Rewrite { file, dest } => {
            commands::rewrite::run(&config, &absolutize(&cwd, file), &absolutize(&cwd, dest), cli.json)
        }
    }
}
