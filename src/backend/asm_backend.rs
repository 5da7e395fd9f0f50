use std::collections::HashMap;

use thiserror::Error;

use crate::backend::registry::SymbolRegistry;
use crate::frontend::ast::{ASTExpr, Function, Prototype, TopLevel, ANONYMOUS_FN_NAME};

// Target is AArch64 with Mach-O symbol naming. Every value is a double:
// expressions leave their result in the accumulator, binary operators
// reload their spilled right operand into the scratch register.
pub const ACCUMULATOR: &str = "d0";
pub const SCRATCH: &str = "d1";

/// Floating point argument registers d0-d7.
pub const MAX_REG_ARGS: usize = 8;

/// Platform prefix put in front of every function name.
pub const SYMBOL_PREFIX: char = '_';

const SLOT_SIZE: usize = 8;
const STACK_ALIGN: usize = 16;

type AsmGenResult<'src> = Result<(), BackendError<'src>>;

macro_rules! emit {
    ($context:expr, $($fmt:tt)*) => {
        $context.emit_line(&format!($($fmt)*))
    };
}

// Errors that end code generation for the current top-level unit
#[derive(Error, PartialEq, Debug)]
pub enum BackendError<'src> {
    #[error("Unknown variable name {0}")]
    UnresolvedVariable(&'src str),

    #[error("Undefined function {0}")]
    UnresolvedFunction(&'src str),

    #[error("Operator '{0}' is not supported by the assembly backend")]
    UnsupportedOperator(char),

    #[error("Invalid binary operator '{0}'")]
    InvalidOperator(char),

    #[error("Malformed number literal {0}")]
    InvalidNumber(&'src str),

    #[error("Number {0} cannot be encoded as a floating point move immediate")]
    UnencodableImmediate(&'src str),

    #[error("{name} uses {count} arguments, only {} can be passed in registers", MAX_REG_ARGS)]
    TooManyArguments { name: &'src str, count: usize },

    #[error("Function {0} defined twice")]
    MultipleFunctionDefs(&'src str),
}

pub fn mangle(name: &str) -> String {
    format!("{SYMBOL_PREFIX}{name}")
}

// fmov (immediate) encodes +/- n/16 * 2^r with n in 16..=31 and r in -3..=4
fn is_fmov_immediate(value: f64) -> bool {
    (16..=31).any(|n| (-3..=4).any(|r| f64::from(n) / 16.0 * 2f64.powi(r) == value.abs()))
}

/// Stack frame of one function: every parameter gets an 8 byte slot below
/// the frame pointer, in declaration order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrameLayout {
    function: String,
    offsets: HashMap<String, usize>,
    size: usize,
}

impl FrameLayout {
    pub fn for_prototype(proto: &Prototype) -> Self {
        // A repeated parameter name resolves to its last slot
        let offsets = proto
            .args
            .iter()
            .enumerate()
            .map(|(idx, arg)| (arg.to_string(), Self::slot_offset(idx)))
            .collect();

        let used = proto.args.len() * SLOT_SIZE;

        Self {
            function: proto.get_name().to_string(),
            offsets,
            size: used.div_ceil(STACK_ALIGN) * STACK_ALIGN,
        }
    }

    fn slot_offset(idx: usize) -> usize {
        (idx + 1) * SLOT_SIZE
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.offsets.get(name).copied()
    }

    /// Bytes reserved below the frame pointer, kept 16 byte aligned.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Code generation state for one compilation session.
///
/// The registry outlives every unit; the frame and output buffer are
/// rebuilt for each unit so a failed unit leaves nothing behind.
#[derive(Debug, Default)]
pub struct AsmContext {
    registry: SymbolRegistry,
    frame: FrameLayout,
    out: String,
    anon_count: usize,
}

impl AsmContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    /// Directives that open a listing, emitted once before any function.
    pub fn preamble() -> &'static str {
        "\t.section\t__TEXT,__text,regular,pure_instructions\n\t.build_version macos, 14, 0\n"
    }

    /// Generate the listing for one top-level unit. On error nothing is
    /// returned and the session is left as it was before the call.
    pub fn compile_unit<'src>(&mut self, unit: &TopLevel<'src>) -> Result<String, BackendError<'src>> {
        self.out.clear();

        let res = match unit {
            TopLevel::Function(function) => function.asm_gen(self),
            TopLevel::Extern(proto) => proto.asm_gen(self),
        };

        self.frame = FrameLayout::default();
        let listing = std::mem::take(&mut self.out);

        res.map(|_| listing)
    }

    fn emit_line(&mut self, line: &str) {
        self.out.push('\t');
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn emit_label(&mut self, label: &str) {
        self.out.push_str(label);
        self.out.push_str(":\n");
    }

    fn prologue(&mut self) {
        emit!(self, "stp\tx29, x30, [sp, #-16]!");
        emit!(self, "mov\tx29, sp");
    }

    fn epilogue(&mut self) {
        emit!(self, "ldp\tx29, x30, [sp], #16");
        emit!(self, "ret");
    }

    // Spill the accumulator to its own 16 byte stack slot
    fn push(&mut self) {
        emit!(self, "str\t{ACCUMULATOR}, [sp, #-16]!");
    }

    fn pop(&mut self, reg: &str) {
        emit!(self, "ldr\t{reg}, [sp], #16");
    }

    fn resolves_function(&self, name: &str) -> bool {
        self.registry.contains(name) || self.frame.function == name
    }
}

/// Emits instructions for one AST node into the context's output buffer.
/// Expressions leave their value in the accumulator.
pub trait AsmCodeGen<'src> {
    fn asm_gen(&self, context: &mut AsmContext) -> AsmGenResult<'src>;
}

impl<'src> AsmCodeGen<'src> for ASTExpr<'src> {
    fn asm_gen(&self, context: &mut AsmContext) -> AsmGenResult<'src> {
        use ASTExpr::*;

        match self {
            NumberExpr(text) => {
                let value = text
                    .parse::<f64>()
                    .map_err(|_| BackendError::InvalidNumber(*text))?;

                if value == 0.0 {
                    emit!(context, "fmov\t{ACCUMULATOR}, xzr");
                } else if is_fmov_immediate(value) {
                    emit!(context, "fmov\t{ACCUMULATOR}, #{value:?}");
                } else {
                    return Err(BackendError::UnencodableImmediate(*text));
                }

                Ok(())
            }

            VariableExpr(name) => {
                let offset = context
                    .frame
                    .offset_of(name)
                    .ok_or(BackendError::UnresolvedVariable(*name))?;

                emit!(context, "ldr\t{ACCUMULATOR}, [x29, #-{offset}]");
                Ok(())
            }

            // Right operand first, spilled while the left one is computed
            BinaryExpr { op, left, right } => {
                let mnemonic = match op {
                    '+' => "fadd",
                    '-' => "fsub",
                    '*' => "fmul",
                    '<' => return Err(BackendError::UnsupportedOperator(*op)),
                    other => return Err(BackendError::InvalidOperator(*other)),
                };

                right.asm_gen(context)?;
                context.push();
                left.asm_gen(context)?;
                context.pop(SCRATCH);

                emit!(context, "{mnemonic}\t{ACCUMULATOR}, {ACCUMULATOR}, {SCRATCH}");
                Ok(())
            }

            // Arguments are computed last to first and each one is spilled,
            // so nothing computed later can clobber an argument register.
            // The first argument ends up on top of the stack.
            CallExpr { callee, args } => {
                if args.len() > MAX_REG_ARGS {
                    return Err(BackendError::TooManyArguments {
                        name: *callee,
                        count: args.len(),
                    });
                }

                if !context.resolves_function(callee) {
                    return Err(BackendError::UnresolvedFunction(*callee));
                }

                for arg in args.iter().rev() {
                    arg.asm_gen(context)?;
                    context.push();
                }

                for idx in 0..args.len() {
                    context.pop(&format!("d{idx}"));
                }

                emit!(context, "bl\t{}", mangle(callee));
                Ok(())
            }
        }
    }
}

// Externs only make the name callable, no code is emitted
impl<'src> AsmCodeGen<'src> for Prototype<'src> {
    fn asm_gen(&self, context: &mut AsmContext) -> AsmGenResult<'src> {
        context.registry.declare(self);
        Ok(())
    }
}

impl<'src> AsmCodeGen<'src> for Function<'src> {
    fn asm_gen(&self, context: &mut AsmContext) -> AsmGenResult<'src> {
        let proto = &self.proto;
        let name = proto.get_name();

        if proto.get_num_params() > MAX_REG_ARGS {
            return Err(BackendError::TooManyArguments {
                name,
                count: proto.get_num_params(),
            });
        }

        if context.registry.is_defined(name) {
            return Err(BackendError::MultipleFunctionDefs(name));
        }

        let label = if self.is_anonymous() {
            mangle(&format!("{ANONYMOUS_FN_NAME}_{}", context.anon_count))
        } else {
            mangle(name)
        };

        context.frame = FrameLayout::for_prototype(proto);
        let frame_size = context.frame.size();

        emit!(context, ".globl\t{label}");
        emit!(context, ".p2align\t2");
        context.emit_label(&label);

        context.prologue();
        if frame_size > 0 {
            emit!(context, "sub\tsp, sp, #{frame_size}");
        }

        for idx in 0..proto.get_num_params() {
            emit!(context, "str\td{idx}, [x29, #-{}]", FrameLayout::slot_offset(idx));
        }

        self.body.asm_gen(context)?;

        if frame_size > 0 {
            emit!(context, "add\tsp, sp, #{frame_size}");
        }
        context.epilogue();
        context.out.push('\n');

        // Only a fully generated function becomes callable
        if self.is_anonymous() {
            context.anon_count += 1;
        } else {
            context.registry.define(proto);
        }

        Ok(())
    }
}
