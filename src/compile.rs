use crate::{
    backend::asm_backend::AsmContext,
    error::CompileError,
    frontend::{
        ast::TopLevel,
        lexer::Lex,
        parser::{parse_top_level, skip_to_next_unit},
    },
};

/// Result of compiling a whole source text: the listing of every unit that
/// compiled, plus one error for every unit that did not.
#[derive(Debug, Default)]
pub struct Compilation<'src> {
    pub listing: String,
    pub errors: Vec<CompileError<'src>>,
}

impl<'src> Compilation<'src> {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compile every top-level unit in `src`, continuing past units that fail.
/// A failed unit contributes nothing to the listing.
pub fn compile_src<'src>(src: &'src str, context: &mut AsmContext) -> Compilation<'src> {
    compile_src_with(src, context, |_| {})
}

/// Like `compile_src`, handing every parsed unit to `inspect` before it is
/// compiled.
pub fn compile_src_with<'src>(
    src: &'src str,
    context: &mut AsmContext,
    mut inspect: impl FnMut(&TopLevel<'src>),
) -> Compilation<'src> {
    let mut tokens = src.lex().peekable();
    let mut compilation = Compilation::default();

    loop {
        match parse_top_level(&mut tokens) {
            Ok(None) => break,

            Ok(Some(unit)) => {
                inspect(&unit);

                match context.compile_unit(&unit) {
                    Ok(asm) => compilation.listing.push_str(&asm),
                    Err(e) => compilation.errors.push(e.into()),
                }
            }

            Err(e) => {
                compilation.errors.push(e.into());
                skip_to_next_unit(&mut tokens);
            }
        }
    }

    compilation
}

/// Compile `src` into a complete listing, preamble included, stopping at
/// the first unit that fails.
pub fn generate_assembly(src: &str) -> Result<String, CompileError<'_>> {
    let mut context = AsmContext::new();
    let mut tokens = src.lex().peekable();
    let mut listing = AsmContext::preamble().to_string();

    while let Some(unit) = parse_top_level(&mut tokens)? {
        listing.push_str(&context.compile_unit(&unit)?);
    }

    Ok(listing)
}
