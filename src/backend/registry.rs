use std::collections::HashMap;

use crate::frontend::ast::Prototype;

/// What the session knows about one function name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEntry {
    pub arity: usize,
    pub defined: bool,
}

/// Names of every function externed or defined so far in a compilation
/// session. Lives for the whole session and only ever grows; it is passed
/// explicitly to codegen rather than kept as global state.
#[derive(Debug, Default, Clone)]
pub struct SymbolRegistry {
    functions: HashMap<String, FunctionEntry>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.functions.get(name).is_some_and(|entry| entry.defined)
    }

    /// Arity of the most recent declaration. Calls are not checked against
    /// it by the assembly backend.
    pub fn arity(&self, name: &str) -> Option<usize> {
        self.functions.get(name).map(|entry| entry.arity)
    }

    pub fn declare(&mut self, proto: &Prototype) {
        let entry = self
            .functions
            .entry(proto.get_name().to_string())
            .or_insert(FunctionEntry {
                arity: 0,
                defined: false,
            });

        entry.arity = proto.get_num_params();
    }

    pub fn define(&mut self, proto: &Prototype) {
        self.functions.insert(
            proto.get_name().to_string(),
            FunctionEntry {
                arity: proto.get_num_params(),
                defined: true,
            },
        );
    }
}
