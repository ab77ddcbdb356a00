//! C-to-Go transpiler driver
//!
//! Reads typed AST files (JSON, one translation unit per file, produced by
//! the front end) and writes one Go source file next to each, or into a
//! chosen output directory.

use clap::{Parser, Subcommand};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cgt")]
#[command(about = "C-to-Go transpiler")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate typed AST files to Go source
    Translate {
        /// Input AST files (JSON)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (defaults to each input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print diagnostics as JSON on stdout instead of text on stderr
        #[arg(long)]
        diagnostics_json: bool,
    },

    /// List the supported C standard-library functions and their runtime
    /// shims
    Shims,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Translate {
            inputs,
            output_dir,
            diagnostics_json,
        } => translate_files(&inputs, output_dir.as_deref(), diagnostics_json),
        Commands::Shims => {
            list_shims();
            ExitCode::SUCCESS
        }
    }
}

fn translate_files(
    inputs: &[PathBuf],
    output_dir: Option<&Path>,
    diagnostics_json: bool,
) -> ExitCode {
    let mut failed = false;
    let mut warnings = 0usize;

    for input in inputs {
        match translate_one(input, output_dir, diagnostics_json) {
            Ok(warning_count) => warnings += warning_count,
            Err(e) => {
                eprintln!("{}: {}", input.display(), e);
                failed = true;
            }
        }
    }

    if warnings > 0 {
        warn!("{warnings} construct(s) left untranslated");
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn translate_one(
    input: &Path,
    output_dir: Option<&Path>,
    diagnostics_json: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(input)?;
    let unit: cgt_ast::TranslationUnit = serde_json::from_str(&json)?;

    let output = cgt_transpile::transpile(&unit)?;

    if diagnostics_json {
        let rendered: Vec<String> = output.diagnostics.iter().map(|d| d.to_string()).collect();
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        for d in &output.diagnostics {
            eprintln!("{d}");
        }
    }

    let go_path = output_path(input, output_dir);
    fs::write(&go_path, &output.go_source)?;
    info!(
        "{} -> {} ({} warnings)",
        input.display(),
        go_path.display(),
        output.warning_count
    );
    Ok(output.warning_count)
}

/// `foo/bar.json` becomes `foo/bar.go`, or `<dir>/bar.go` when an output
/// directory is given
fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "out".into());
    name.push(".go");
    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn list_shims() {
    let registry = cgt_transpile::shim::ShimRegistry::standard();
    for shim in registry.entries() {
        println!(
            "{:<12} -> {}.{}",
            shim.c_name,
            cgt_transpile::shim::NOARCH_PACKAGE,
            shim.go_name
        );
    }
}
