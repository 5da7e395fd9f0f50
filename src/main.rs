use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use kaleido_asm::{
    backend::asm_backend::AsmContext,
    cli::Cli,
    compile::compile_src_with,
    frontend::lexer::decode_source,
    repl,
};

fn compile_file(path: &Path, cli: &Cli) -> ExitCode {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: could not read {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let src = decode_source(&bytes);

    let mut context = AsmContext::new();
    let compilation = compile_src_with(&src, &mut context, |unit| {
        if cli.inspect_tree {
            eprintln!("{unit}");
        }
    });

    for err in &compilation.errors {
        eprintln!("Error: {err}");
    }

    let mut listing = String::new();
    if !cli.no_preamble {
        listing.push_str(AsmContext::preamble());
    }
    listing.push_str(&compilation.listing);

    match &cli.output {
        Some(output) => {
            if let Err(e) = fs::write(output, listing) {
                eprintln!("Error: could not write {}: {e}", output.display());
                return ExitCode::FAILURE;
            }
        }
        None => print!("{listing}"),
    }

    if compilation.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match &cli.file {
        Some(path) => compile_file(path, &cli),
        None => {
            repl::asm_gen_driver(cli.inspect_tree);
            ExitCode::SUCCESS
        }
    }
}
