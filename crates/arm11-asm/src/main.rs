use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use arm11_asm::{assemble, Assembly};
use arm11_rs::decoder::Decoder;
use arm11_rs::disasm::fmt_decoded;
use arm11_rs::isa::arm::ArmDecoder;

#[derive(Parser, Debug)]
#[command(author, version, about = "Assemble an ARM11 source file into a binary image")]
struct Opts {
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
    /// Export the symbol table as JSON
    #[arg(long, value_name = "FILE")]
    symbols: Option<PathBuf>,
    /// Print address, word and disassembly of every emitted word
    #[arg(long)]
    listing: bool,
}

fn listing(asm: &Assembly) -> String {
    let dec = ArmDecoder::new();
    let mut out = String::new();
    for (i, &word) in asm.words.iter().enumerate() {
        let text = if i >= asm.instructions {
            format!(".word {word:#010x}")
        } else {
            dec.decode(word)
                .map(|d| fmt_decoded(&d))
                .unwrap_or_else(|| "<invalid>".to_string())
        };
        out.push_str(&format!("{:#06x}: {word:08x}  {text}\n", i * 4));
    }
    out
}

fn run(opts: &Opts) -> Result<ExitCode> {
    let source = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("The file {} was not found", opts.input.display()))?;

    let asm = match assemble(&source) {
        Ok(asm) => asm,
        Err(errors) => {
            for e in &errors {
                eprintln!("{e}");
            }
            return Ok(ExitCode::FAILURE);
        }
    };
    info!(
        words = asm.words.len(),
        literals = asm.literals().len(),
        symbols = asm.symbols.len(),
        "assembled"
    );

    if let Some(path) = &opts.symbols {
        let json = serde_json::to_string_pretty(&asm.symbols.entries())?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if opts.listing {
        print!("{}", listing(&asm));
    }
    std::fs::write(&opts.output, asm.to_bytes())
        .with_context(|| format!("failed to write {}", opts.output.display()))?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // usage errors exit 1 rather than clap's default of 2
    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            e.print()?;
            return Ok(if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            });
        }
    };
    run(&opts)
}
