use thiserror::Error;

use crate::backend::asm_backend::BackendError;
use crate::frontend::parser::ParserError;

/// Failure of one top-level unit, from either stage of the pipeline.
// Stage errors borrow from the source text and are not exposed via source()
#[derive(Error, PartialEq, Debug)]
pub enum CompileError<'src> {
    #[error("Frontend error: {0}")]
    Frontend(ParserError<'src>),

    #[error("Backend error: {0}")]
    Backend(BackendError<'src>),
}

impl<'src> From<ParserError<'src>> for CompileError<'src> {
    fn from(err: ParserError<'src>) -> Self {
        CompileError::Frontend(err)
    }
}

impl<'src> From<BackendError<'src>> for CompileError<'src> {
    fn from(err: BackendError<'src>) -> Self {
        CompileError::Backend(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_stage() {
        let err: CompileError = ParserError::UnexpectedEOI { expected: "')'" }.into();
        assert_eq!(err.to_string(), "Frontend error: Reached end of input expecting ')'");

        let err: CompileError = BackendError::UnsupportedOperator('<').into();
        assert_eq!(
            err.to_string(),
            "Backend error: Operator '<' is not supported by the assembly backend"
        );
    }
}
