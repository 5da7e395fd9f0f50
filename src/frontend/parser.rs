use std::collections::HashMap;
use std::iter::Peekable;

use lazy_static::lazy_static;
use thiserror::Error;

use crate::frontend::{ast::*, lexer::Token};

// Hash table of binary operators to their precedence, higher binds
// tighter. Anything missing here ends an expression.
lazy_static! {
    static ref OP_PRECEDENCE: HashMap<char, i32> = {
        let mut map = HashMap::new();
        map.insert('<', 10);
        map.insert('+', 20);
        map.insert('-', 20);
        map.insert('*', 40);
        map
    };
}

// Errors raised while parsing. Parsing a unit stops at the first one.
#[derive(Error, PartialEq, Debug)]
pub enum ParserError<'src> {
    #[error("Expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: Token<'src>,
    },

    #[error("Reached end of input expecting {expected}")]
    UnexpectedEOI { expected: &'static str },
}

type ParseResult<'src, T> = Result<T, ParserError<'src>>;

// Small alias for fallible returns of parsing expressions
type ExprParseResult<'src> = ParseResult<'src, Box<ASTExpr<'src>>>;

// Consume the next token, failing unless it is the operator `c`.
fn expect_operator<'src>(
    tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>,
    c: char,
    expected: &'static str,
) -> ParseResult<'src, ()> {
    match tokens.next() {
        Some(token) if token.is_operator(c) => Ok(()),
        Some(found) => Err(ParserError::UnexpectedToken { expected, found }),
        None => Err(ParserError::UnexpectedEOI { expected }),
    }
}

/// top ::= definition | external | expression | ';'
///
/// Returns `Ok(None)` once the tokens are exhausted.
pub fn parse_top_level<'src>(
    tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>,
) -> ParseResult<'src, Option<TopLevel<'src>>> {
    loop {
        match tokens.peek() {
            None => return Ok(None),

            // Eat semicolons and move on
            Some(Token::Operator(';')) => {
                tokens.next();
            }

            Some(Token::FuncDef) => {
                return parse_definition(tokens).map(|f| Some(TopLevel::Function(*f)))
            }

            Some(Token::Extern) => {
                return parse_extern(tokens).map(|p| Some(TopLevel::Extern(*p)))
            }

            Some(_top_level_expr) => {
                return parse_top_level_expr(tokens).map(|f| Some(TopLevel::Function(*f)))
            }
        }
    }
}

/// Skip what is left of a unit that failed to parse, stopping in front of
/// the next 'def', 'extern' or ';' so none of it is taken for a new unit.
pub fn skip_to_next_unit<'src>(tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>) {
    while let Some(token) = tokens.peek() {
        if matches!(token, Token::FuncDef | Token::Extern | Token::Operator(';')) {
            break;
        }

        tokens.next();
    }
}

/// external ::= 'extern' prototype
pub fn parse_extern<'src>(
    tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>,
) -> ParseResult<'src, Box<Prototype<'src>>> {
    // Swallow the 'extern' keyword, parse as prototype
    let _keyword = tokens.next();
    parse_prototype(tokens)
}

/// prototype
///   ::= id '(' id* ')'
pub fn parse_prototype<'src>(
    tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>,
) -> ParseResult<'src, Box<Prototype<'src>>> {
    let name = match tokens.next() {
        Some(Token::Identifier(name)) => name,
        Some(found) => {
            return Err(ParserError::UnexpectedToken {
                expected: "function name in prototype",
                found,
            })
        }
        None => {
            return Err(ParserError::UnexpectedEOI {
                expected: "function name in prototype",
            })
        }
    };

    expect_operator(tokens, '(', "'(' in prototype")?;

    let mut args = vec![];

    while let Some(Token::Identifier(s)) = tokens.peek() {
        args.push(*s);
        let _ = tokens.next();
    }

    expect_operator(tokens, ')', "')' in prototype")?;

    Ok(Box::new(Prototype { name, args }))
}

/// definition ::= 'def' prototype expression
pub fn parse_definition<'src>(
    tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>,
) -> ParseResult<'src, Box<Function<'src>>> {
    // swallow the def keyword
    let _def = tokens.next();

    let proto = parse_prototype(tokens)?;
    let body = parse_expression(tokens)?;

    Ok(Box::new(Function { proto, body }))
}

/// toplevelexpr ::= expression
pub fn parse_top_level_expr<'src>(
    tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>,
) -> ParseResult<'src, Box<Function<'src>>> {
    let body = parse_expression(tokens)?;

    let proto = Box::new(Prototype::anonymous());

    Ok(Box::new(Function { proto, body }))
}

/// primary
///   ::= identifierexpr
///   ::= numberexpr
///   ::= parenexpr
fn parse_primary<'src>(
    tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>,
) -> ExprParseResult<'src> {
    match tokens.next() {
        Some(Token::Identifier(name)) => parse_identifier_expr(name, tokens),

        Some(Token::Number(text)) => Ok(Box::new(ASTExpr::NumberExpr(text))),

        Some(Token::Operator('(')) => parse_paren_expr(tokens),

        Some(found) => Err(ParserError::UnexpectedToken {
            expected: "an expression",
            found,
        }),

        None => Err(ParserError::UnexpectedEOI {
            expected: "an expression",
        }),
    }
}

/// identifierexpr
///   ::= identifier
///   ::= identifier '(' expression* ')'
fn parse_identifier_expr<'src>(
    name: &'src str,
    tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>,
) -> ExprParseResult<'src> {
    // Variable Expression
    if !matches!(tokens.peek(), Some(Token::Operator('('))) {
        return Ok(Box::new(ASTExpr::VariableExpr(name)));
    }

    // Call Expression
    let _open_paren = tokens.next();

    let mut args = vec![];

    if matches!(tokens.peek(), Some(Token::Operator(')'))) {
        let _closed_paren = tokens.next();
        return Ok(Box::new(ASTExpr::CallExpr { callee: name, args }));
    }

    loop {
        args.push(*parse_expression(tokens)?);

        match tokens.next() {
            Some(Token::Operator(')')) => break,
            Some(Token::Operator(',')) => continue,
            Some(found) => {
                return Err(ParserError::UnexpectedToken {
                    expected: "',' or ')' in argument list",
                    found,
                })
            }
            None => {
                return Err(ParserError::UnexpectedEOI {
                    expected: "',' or ')' in argument list",
                })
            }
        }
    }

    Ok(Box::new(ASTExpr::CallExpr { callee: name, args }))
}

/// parenexpr ::= '(' expression ')'
fn parse_paren_expr<'src>(
    tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>,
) -> ExprParseResult<'src> {
    // The open parenthesis was already swallowed by parse_primary
    let expr = parse_expression(tokens)?;

    expect_operator(tokens, ')', "')'")?;

    Ok(expr)
}

/// expression
///   ::= primary binoprhs
///
pub fn parse_expression<'src>(
    tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>,
) -> ExprParseResult<'src> {
    let lhs = parse_primary(tokens)?;

    parse_binop_rhs(tokens, lhs, 0)
}

// Precedence of the token if it is a known binary operator, -1 otherwise
// (end of input included).
fn get_token_precedence(token: Option<&Token>) -> i32 {
    match token {
        Some(Token::Operator(op)) => OP_PRECEDENCE.get(op).copied().unwrap_or(-1),
        _ => -1,
    }
}

/// binoprhs
///   ::= ('+' primary)*
fn parse_binop_rhs<'src>(
    tokens: &mut Peekable<impl Iterator<Item = Token<'src>>>,
    mut lhs: Box<ASTExpr<'src>>,
    expr_prec: i32,
) -> ExprParseResult<'src> {
    loop {
        let tok_prec = get_token_precedence(tokens.peek());

        if tok_prec < expr_prec {
            return Ok(lhs);
        }

        // A non-negative precedence guarantees an operator token
        let Some(Token::Operator(op)) = tokens.next() else {
            return Ok(lhs);
        };

        let mut rhs = parse_primary(tokens)?;

        // Only a strictly tighter operator gets absorbed into rhs,
        // equal precedence folds left
        let next_prec = get_token_precedence(tokens.peek());

        if tok_prec < next_prec {
            rhs = parse_binop_rhs(tokens, rhs, tok_prec + 1)?;
        }

        lhs = Box::new(ASTExpr::BinaryExpr {
            op,
            left: lhs,
            right: rhs,
        })
    }
}
