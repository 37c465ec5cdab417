//! ADM record transform and lint tool.
//!
//! Applies the requested transforms to each input record and writes the
//! result back as JSON. Lint findings are all reported before the exit
//! status reflects them.

use aricodec_core::amm::AdmModule;
use aricodec_core::transform::{self, LintOptions};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Transform and lint ADM module records.
#[derive(Debug, Parser)]
#[command(name = "adm", version)]
struct Args {
    /// Input record files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Transforms to apply, in order (`add-enum`, `canonicalize`).
    #[arg(short = 't', long = "transform")]
    transforms: Vec<String>,
    /// Run lint checks.
    #[arg(long)]
    lint: bool,
    /// With --lint, require hyphenated identifier style.
    #[arg(long)]
    lint_ensure_hyphenated_names: bool,
    /// Write transformed records back to their input paths instead of
    /// stdout.
    #[arg(long)]
    in_place: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(clean) => {
            if clean {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("adm: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<bool, String> {
    let mut clean = true;
    for input in &args.inputs {
        let mut module =
            aricodec_std::load_adm_file(input).map_err(|err| format!("{}: {err}", input.display()))?;

        for name in &args.transforms {
            module = apply(name, module)?;
        }

        if args.lint {
            let options = LintOptions {
                ensure_hyphenated_names: args.lint_ensure_hyphenated_names,
            };
            let issues = transform::lint(&module, options);
            for issue in &issues {
                eprintln!("{}: {issue}", input.display());
            }
            if !issues.is_empty() {
                clean = false;
            }
        }

        if args.transforms.is_empty() {
            continue;
        }
        if args.in_place {
            aricodec_std::save_adm_file(input, &module)
                .map_err(|err| format!("{}: {err}", input.display()))?;
        } else {
            let json = serde_json::to_string_pretty(&module).map_err(|err| err.to_string())?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").map_err(|err| err.to_string())?;
        }
    }
    Ok(clean)
}

fn apply(name: &str, module: AdmModule) -> Result<AdmModule, String> {
    match name {
        "add-enum" => Ok(transform::add_enum(module)),
        "canonicalize" => Ok(transform::canonicalize(module)),
        other => Err(format!("unknown transform {other:?}")),
    }
}
