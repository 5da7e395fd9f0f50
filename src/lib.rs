//! Front end and direct AArch64 code generator for the Kaleidoscope toy
//! language.
//!
//! - `frontend` scans source text into tokens and parses them into an AST,
//!   one top-level unit at a time.
//! - `backend` turns each unit into an assembly listing, keeping a
//!   session-wide registry of callable names.
//! - `compile` and `repl` drive the pipeline over a file or stdin.

pub mod backend;
pub mod cli;
pub mod compile;
pub mod error;
pub mod frontend;
pub mod repl;

pub use compile::{compile_src, compile_src_with, generate_assembly, Compilation};
pub use error::CompileError;
