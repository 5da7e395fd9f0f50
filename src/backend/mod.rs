pub mod asm_backend;
pub mod registry;
