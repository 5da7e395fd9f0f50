use std::fmt;

use itertools::Itertools;

/// Name given to the function wrapping a bare top-level expression.
pub const ANONYMOUS_FN_NAME: &str = "__anonymous_expr";

// Closed set of expression nodes, every traversal matches exhaustively.
// Names and literals borrow from the source buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum ASTExpr<'src> {
    NumberExpr(&'src str),
    VariableExpr(&'src str),
    BinaryExpr {
        op: char,
        left: Box<ASTExpr<'src>>,
        right: Box<ASTExpr<'src>>,
    },
    CallExpr {
        callee: &'src str,
        args: Vec<ASTExpr<'src>>,
    },
}

// Prototype
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype<'src> {
    pub name: &'src str,
    pub args: Vec<&'src str>,
}

impl<'src> Prototype<'src> {
    pub fn new(name: &'src str, args: Vec<&'src str>) -> Self {
        Self { name, args }
    }

    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_FN_NAME, vec![])
    }

    pub fn get_name(&self) -> &'src str {
        self.name
    }

    pub fn get_num_params(&self) -> usize {
        self.args.len()
    }
}

// Function
#[derive(Debug, Clone, PartialEq)]
pub struct Function<'src> {
    pub proto: Box<Prototype<'src>>,
    pub body: Box<ASTExpr<'src>>,
}

impl<'src> Function<'src> {
    /// True for the wrapper the parser builds around a bare expression.
    pub fn is_anonymous(&self) -> bool {
        self.proto.name == ANONYMOUS_FN_NAME
    }
}

/// One parsed top-level unit.
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel<'src> {
    Function(Function<'src>),
    Extern(Prototype<'src>),
}

impl<'src> fmt::Display for ASTExpr<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ASTExpr::*;

        match self {
            NumberExpr(text) => write!(f, "{text}"),
            VariableExpr(name) => write!(f, "{name}"),
            BinaryExpr { op, left, right } => write!(f, "({op} {left} {right})"),
            CallExpr { callee, args } if args.is_empty() => write!(f, "(call {callee})"),
            CallExpr { callee, args } => {
                write!(f, "(call {callee} {})", args.iter().join(" "))
            }
        }
    }
}

impl<'src> fmt::Display for Prototype<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.iter().join(" "))
    }
}

impl<'src> fmt::Display for Function<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(def {} {})", self.proto, self.body)
    }
}

impl<'src> fmt::Display for TopLevel<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopLevel::Function(function) => write!(f, "{function}"),
            TopLevel::Extern(proto) => write!(f, "(extern {proto})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ASTExpr::*;

    #[test]
    fn displaying_trees() {
        let body = BinaryExpr {
            op: '+',
            left: Box::new(VariableExpr("a")),
            right: Box::new(CallExpr {
                callee: "foo",
                args: vec![VariableExpr("b"), NumberExpr("4.0")],
            }),
        };

        let function = Function {
            proto: Box::new(Prototype::new("foo", vec!["a", "b"])),
            body: Box::new(body),
        };

        assert_eq!(
            function.to_string(),
            "(def foo(a b) (+ a (call foo b 4.0)))"
        );

        let ext = TopLevel::Extern(Prototype::new("sin", vec!["x"]));
        assert_eq!(ext.to_string(), "(extern sin(x))");

        assert_eq!(CallExpr { callee: "now", args: vec![] }.to_string(), "(call now)");
    }

    #[test]
    fn anonymous_wrapper_is_recognised() {
        let anon = Function {
            proto: Box::new(Prototype::anonymous()),
            body: Box::new(NumberExpr("1")),
        };
        assert!(anon.is_anonymous());
        assert_eq!(anon.proto.get_num_params(), 0);

        let named = Function {
            proto: Box::new(Prototype::new("one", vec![])),
            body: Box::new(NumberExpr("1")),
        };
        assert!(!named.is_anonymous());
    }
}
