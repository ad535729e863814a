#![expect(clippy::print_stdout, clippy::print_stderr)]

use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};
use cube_link_testsuite::evaluator::{KNOWN_PROFILES, ProfileRun, evaluate_observations};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about, version, name = "cube-link-testsuite")]
/// Validates cube-link SHACL profiles against their test fixtures
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the fixtures of a profile
    ///
    /// The shapes are read from `<root>/validation/<profile>.ttl` and the fixtures from `<root>/test/<profile>/`.
    Run {
        /// Name of the profile
        profile: Option<String>,
        /// Directory containing the `validation` and `test` directories
        #[arg(short, long, default_value = ".", value_hint = ValueHint::DirPath)]
        root: PathBuf,
        /// Fail if a `code:imports` directive points to a missing file
        #[arg(long)]
        strict_imports: bool,
    },
    /// Validate the observation fixtures of `<root>/test/observations/` against themselves
    Observations {
        /// Directory containing the `test` directory
        #[arg(short, long, default_value = ".", value_hint = ValueHint::DirPath)]
        root: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let report = match Args::parse().command {
        Command::Run {
            profile,
            root,
            strict_imports,
        } => {
            let Some(profile) = profile else {
                eprintln!("Usage: cube-link-testsuite run <profile> [--root <dir>]");
                eprintln!();
                eprintln!("Available profiles:");
                for profile in KNOWN_PROFILES {
                    eprintln!("  {profile}");
                }
                return Ok(ExitCode::FAILURE);
            };
            let mut run = ProfileRun::new(root, profile);
            if strict_imports {
                run = run.strict_imports();
            }
            run.evaluate()?
        }
        Command::Observations { root } => evaluate_observations(&root),
    };
    print!("{report}");
    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
