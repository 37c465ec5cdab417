//! Line-oriented ARI transcoder.
//!
//! Reads one ARI per input line (or one binary item for raw CBOR input),
//! transcodes it, and writes the result. The first failure terminates
//! with a nonzero status.

use aricodec_core::ari::Ari;
use aricodec_core::nickname::{Converter, Mode};
use aricodec_core::text::{EncodeOptions, Encoder};
use aricodec_core::{cbor, text};
use aricodec_std::load_catalog;
use clap::{Parser, ValueEnum};
use std::io::{self, BufRead, Read, Write};
use std::process::ExitCode;

/// Transcoding forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Form {
    /// URI-style text, one per line.
    Text,
    /// Raw binary CBOR.
    Cbor,
    /// Hex-encoded CBOR, one item per line.
    Cborhex,
}

/// Transcode ARIs between text and CBOR forms.
#[derive(Debug, Parser)]
#[command(name = "ari", version)]
struct Args {
    /// Input form.
    #[arg(long, value_enum, default_value = "text")]
    inform: Form,
    /// Output form.
    #[arg(long, value_enum, default_value = "cborhex")]
    outform: Form,
    /// Require every object reference to rewrite into enumeration form.
    #[arg(long)]
    must_nickname: bool,
    /// Reject untyped top-level literals.
    #[arg(long)]
    must_typed: bool,
    /// Require every object reference to resolve against the catalog,
    /// with actual parameters checked against their formals.
    #[arg(long)]
    strict_resolve: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ari: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let catalog = load_catalog();
    tracing::debug!(modules = catalog.module_count(), "catalog loaded");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    if args.inform == Form::Cbor {
        let mut data = Vec::new();
        stdin.lock().read_to_end(&mut data).map_err(|err| err.to_string())?;
        let ari = cbor::decode(&data).map_err(|err| err.to_string())?;
        transcode(args, &catalog, ari, &mut stdout)?;
        return Ok(());
    }

    for line in stdin.lock().lines() {
        let line = line.map_err(|err| err.to_string())?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let ari = match args.inform {
            Form::Text => text::decode(trimmed).map_err(|err| err.to_string())?,
            Form::Cborhex => {
                let data = from_hex(trimmed)?;
                cbor::decode(&data).map_err(|err| err.to_string())?
            }
            Form::Cbor => unreachable!(),
        };
        transcode(args, &catalog, ari, &mut stdout)?;
    }
    Ok(())
}

fn transcode(
    args: &Args,
    catalog: &aricodec_core::catalog::Catalog,
    mut ari: Ari,
    out: &mut impl Write,
) -> Result<(), String> {
    if args.must_typed {
        if let Some(lit) = ari.as_literal() {
            if lit.type_id.is_none() {
                return Err("untyped literal rejected by --must-typed".into());
            }
        }
    }
    if args.strict_resolve {
        catalog.check_ari(&ari).map_err(|err| err.to_string())?;
    }

    // prefer enumerations on the wire, names in text
    let mode = match args.outform {
        Form::Text => Mode::ToName,
        Form::Cbor | Form::Cborhex => Mode::ToEnum,
    };
    Converter::new(mode, catalog, args.must_nickname)
        .convert(&mut ari)
        .map_err(|err| err.to_string())?;

    match args.outform {
        Form::Text => {
            let rendered = Encoder::new(EncodeOptions::canonical()).encode(&ari);
            writeln!(out, "{rendered}").map_err(|err| err.to_string())?;
        }
        Form::Cborhex => {
            let bytes = cbor::encode(&ari).map_err(|err| err.to_string())?;
            let rendered: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
            writeln!(out, "{rendered}").map_err(|err| err.to_string())?;
        }
        Form::Cbor => {
            let bytes = cbor::encode(&ari).map_err(|err| err.to_string())?;
            out.write_all(&bytes).map_err(|err| err.to_string())?;
        }
    }
    Ok(())
}

fn from_hex(text: &str) -> Result<Vec<u8>, String> {
    let cleaned = text.strip_prefix("0x").unwrap_or(text);
    if cleaned.len() % 2 != 0 {
        return Err("odd-length hex input".into());
    }
    (0..cleaned.len())
        .step_by(2)
        .map(|ix| {
            u8::from_str_radix(&cleaned[ix..ix + 2], 16)
                .map_err(|_| format!("bad hex at offset {ix}"))
        })
        .collect()
}
