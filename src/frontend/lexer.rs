use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    EndOfInput,
    FuncDef,
    Extern,
    Identifier(&'src str),
    // Kept as source text, numeric decisions are made by the backend
    Number(&'src str),
    // Any other single character, including '(' ')' ',' and ';'
    Operator(char),
}

impl<'src> Token<'src> {
    /// The literal text this token was scanned from. Keywords carry no
    /// payload but still report their spelling.
    pub fn lexeme(&self) -> String {
        match self {
            Token::EndOfInput => String::new(),
            Token::FuncDef => "def".to_string(),
            Token::Extern => "extern".to_string(),
            Token::Identifier(text) | Token::Number(text) => text.to_string(),
            Token::Operator(c) => c.to_string(),
        }
    }

    pub fn is_operator(&self, c: char) -> bool {
        matches!(self, Token::Operator(op) if *op == c)
    }
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::EndOfInput => write!(f, "end of input"),
            other => write!(f, "'{}'", other.lexeme()),
        }
    }
}

// Whitespace skipped between tokens
#[inline(always)]
fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

#[inline(always)]
fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Scanner over a source buffer. `lookahead` is always the character at
/// `pos`, or `None` once `pos` has reached the end of the buffer.
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    src: &'src str,
    pos: usize,
    lookahead: Option<char>,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            lookahead: src.chars().next(),
        }
    }

    // The only state transition, a no-op at end of input
    fn advance(&mut self) {
        if let Some(c) = self.lookahead {
            self.pos += c.len_utf8();
            self.lookahead = self.src[self.pos..].chars().next();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'src str {
        let start = self.pos;

        while self.lookahead.is_some_and(&pred) {
            self.advance();
        }

        &self.src[start..self.pos]
    }

    /// Classify the next token. Never fails; once the end of the buffer is
    /// reached every further call returns `Token::EndOfInput`.
    pub fn next_token(&mut self) -> Token<'src> {
        loop {
            self.take_while(is_blank);

            let Some(c) = self.lookahead else {
                return Token::EndOfInput;
            };

            if c.is_alphabetic() {
                return match self.take_while(char::is_alphanumeric) {
                    "def" => Token::FuncDef,
                    "extern" => Token::Extern,
                    ident => Token::Identifier(ident),
                };
            }

            if is_number_char(c) {
                return Token::Number(self.take_while(is_number_char));
            }

            if c == '#' {
                // Line comment, resume scanning after it
                self.take_while(|c| c != '\n' && c != '\r');
                continue;
            }

            self.advance();
            return Token::Operator(c);
        }
    }
}

/// Yields tokens up to, but not including, the end of input.
impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Token::EndOfInput => None,
            token => Some(token),
        }
    }
}

/// Source text for raw input bytes. Bytes that are not valid UTF-8 become
/// U+FFFD, which scans as an operator token.
pub fn decode_source(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

pub trait Lex {
    fn lex(&self) -> Lexer<'_>;
}

impl Lex for str {
    fn lex(&self) -> Lexer<'_> {
        Lexer::new(self)
    }
}
