use std::io::{BufRead, Write};

use crate::{
    backend::asm_backend::AsmContext,
    frontend::{
        lexer::{decode_source, Lex},
        parser::{parse_top_level, skip_to_next_unit},
    },
};

// Read-Print-Loop over stdin: every line is parsed into top-level units and
// the assembly for each unit is printed as soon as it is generated. Names
// defined or externed on earlier lines stay callable for the whole session.
pub fn asm_gen_driver(inspect_tree: bool) {
    let mut context = AsmContext::new();
    let mut input_buf = Vec::new();
    let mut stdin = std::io::stdin().lock();

    loop {
        print!("Ready >> ");
        if let Err(e) = std::io::stdout().flush() {
            eprintln!("Error: could not write prompt: {e}");
            break;
        }

        input_buf.clear();
        match stdin.read_until(b'\n', &mut input_buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: could not read input: {e}");
                break;
            }
        }

        let line = decode_source(&input_buf);
        let mut tokens = line.lex().peekable();

        loop {
            match parse_top_level(&mut tokens) {
                Ok(None) => break,

                Ok(Some(unit)) => {
                    if inspect_tree {
                        println!("{unit}");
                    }

                    match context.compile_unit(&unit) {
                        Ok(asm) => print!("{asm}"),
                        Err(e) => eprintln!("Backend error: {e}"),
                    }
                }

                Err(err) => {
                    eprintln!("Frontend error: {err}");
                    skip_to_next_unit(&mut tokens);
                }
            }
        }
    }
}
