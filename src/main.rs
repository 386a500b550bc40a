use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use pkgtools::cli::print_manifest_summary;
use pkgtools::hooks::execute_hooks;
use pkgtools::logging::init_logging;
use pkgtools::manifest::Manifest;

#[derive(Parser)]
#[command(name = "pkgtools")]
#[command(version, about = "Post-install hook tooling for package manifests")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a manifest's post-install actions (invoked by the generated trampoline)
    RunHooks {
        /// Manifest document path
        manifest: PathBuf,
        /// Directory the no-op build file is written into
        #[arg(long, default_value = ".")]
        build_dir: PathBuf,
    },
    /// Show a manifest summary
    Show {
        /// Manifest document path
        manifest: PathBuf,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::RunHooks {
            manifest,
            build_dir,
        } => execute_hooks(&manifest, &build_dir).map(|report| {
            eprintln!(
                "[pkgtools] Ran {} post-install action(s) for {}",
                report.actions_run,
                manifest.display()
            );
        }),
        Commands::Show { manifest } => {
            Manifest::load(&manifest).map(|m| print_manifest_summary(&m))
        }
    };

    if let Err(err) = result {
        eprintln!("[pkgtools] Error: {err}");
        process::exit(1);
    }
}
