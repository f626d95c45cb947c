//! Parser for backend type strings.
//!
//! Grammar:
//!
//! ```text
//! type  := ident [ '(' [ arg { ',' arg } ] ')' ]
//! arg   := number | quoted | ident type | type
//! ```
//!
//! `Decimal(18, 4)`, `DateTime64(3, 'UTC')`, `Nullable(FixedString(16))` and
//! `Tuple(id UInt64, name String)` all parse. Whitespace between tokens is
//! ignored.

use std::fmt;

use crate::error::{Error, Result};

/// Nesting limit for parametrized types.
const MAX_DEPTH: usize = 64;

/// Parsed backend type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeAst {
    /// A type name with its (possibly empty) argument list.
    Type { name: String, args: Vec<TypeAst> },
    /// An unsigned numeric argument.
    Number(u64),
    /// A quoted string argument, unescaped.
    Literal(String),
    /// A named element (`name Type`) inside Tuple/Nested.
    Named { name: String, ty: Box<TypeAst> },
}

impl TypeAst {
    /// Type name, for `Type` and `Named` nodes.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeAst::Type { name, .. } => Some(name),
            TypeAst::Named { ty, .. } => ty.name(),
            _ => None,
        }
    }

    /// Arguments of a `Type` node; empty for everything else.
    pub fn args(&self) -> &[TypeAst] {
        match self {
            TypeAst::Type { args, .. } => args,
            _ => &[],
        }
    }

    /// Numeric value, for `Number` nodes.
    pub fn as_number(&self) -> Option<u64> {
        match self {
            TypeAst::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Renders the normalized spelling: `, ` between arguments, literals
/// re-quoted. The output parses back to the same tree.
impl fmt::Display for TypeAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAst::Type { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(")")?;
                }
                Ok(())
            }
            TypeAst::Number(n) => write!(f, "{n}"),
            TypeAst::Literal(value) => {
                f.write_str("'")?;
                for c in value.chars() {
                    if matches!(c, '\\' | '\'') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("'")
            }
            TypeAst::Named { name, ty } => write!(f, "{name} {ty}"),
        }
    }
}

/// Recursive-descent parser over a type string.
pub struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    /// Create a parser over `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parse the whole input as a single type.
    pub fn parse(mut self) -> Result<TypeAst> {
        self.skip_whitespace();
        let ast = self.parse_type(0)?;
        self.skip_whitespace();
        if self.pos != self.input.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(ast)
    }

    fn parse_type(&mut self, depth: usize) -> Result<TypeAst> {
        if depth > MAX_DEPTH {
            return Err(self.error("type nesting too deep"));
        }
        let name = self.parse_ident()?;
        self.skip_whitespace();

        let mut args = Vec::new();
        if self.peek() == Some(b'(') {
            self.pos += 1;
            self.skip_whitespace();
            if self.peek() == Some(b')') {
                self.pos += 1;
            } else {
                loop {
                    args.push(self.parse_arg(depth + 1)?);
                    self.skip_whitespace();
                    match self.peek() {
                        Some(b',') => {
                            self.pos += 1;
                            self.skip_whitespace();
                        }
                        Some(b')') => {
                            self.pos += 1;
                            break;
                        }
                        Some(_) => return Err(self.error("expected ',' or ')'")),
                        None => return Err(self.error("unbalanced parentheses")),
                    }
                }
            }
        }

        Ok(TypeAst::Type {
            name: name.to_string(),
            args,
        })
    }

    fn parse_arg(&mut self, depth: usize) -> Result<TypeAst> {
        match self.peek() {
            Some(b) if b.is_ascii_digit() => self.parse_number(),
            Some(b'\'') => self.parse_quoted(),
            Some(b) if is_ident_start(b) => {
                let start = self.pos;
                let ident = self.parse_ident()?;
                let after_ident = self.pos;
                self.skip_whitespace();
                if self.pos > after_ident && self.peek().is_some_and(is_ident_start) {
                    let ty = self.parse_type(depth)?;
                    return Ok(TypeAst::Named {
                        name: ident.to_string(),
                        ty: Box::new(ty),
                    });
                }
                self.pos = start;
                self.parse_type(depth)
            }
            Some(_) => Err(self.error("expected type, number or string literal")),
            None => Err(self.error("unbalanced parentheses")),
        }
    }

    fn parse_ident(&mut self) -> Result<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(b) if is_ident_start(b) => self.pos += 1,
            _ => return Err(self.error("expected type name")),
        }
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        let input = self.input;
        Ok(&input[start..self.pos])
    }

    fn parse_number(&mut self) -> Result<TypeAst> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.input[start..self.pos]
            .parse::<u64>()
            .map(TypeAst::Number)
            .map_err(|_| Error::type_parse(self.input, start, "numeric argument out of range"))
    }

    fn parse_quoted(&mut self) -> Result<TypeAst> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let rest = &self.input[self.pos..];
            let mut chars = rest.chars();
            match chars.next() {
                None => return Err(Error::type_parse(self.input, start, "unterminated string literal")),
                Some('\\') => match chars.next() {
                    Some(escaped) => {
                        value.push(escaped);
                        self.pos += 1 + escaped.len_utf8();
                    }
                    None => {
                        return Err(Error::type_parse(self.input, start, "unterminated string literal"))
                    }
                },
                Some('\'') => {
                    self.pos += 1;
                    return Ok(TypeAst::Literal(value));
                }
                Some(c) => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::type_parse(self.input, self.pos, message)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}
