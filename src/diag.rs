use std::error::Error;
use std::fmt;

#[derive(Debug, PartialEq)]
pub struct FullParseError {
    pub pos: Position,
    pub error: ParseError,
}

impl fmt::Display for FullParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}: {}", self.pos, self.error)
    }
}

impl Error for FullParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

/// Line number (starting at one).
pub type Position = u32;

#[derive(Debug, PartialEq)]
pub enum ParseError {
    UnexpectedToken(String, String),
    BadByte(u8),
    BadIntLiteral(String),
    UnterminatedString,
    BadStringLiteral,
    ExpectedIdentifier,
    ExpectedExpression,
    UnknownClass(String),
    BadStrCall(usize),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken(unexpected, expected) => write!(
                f,
                "unexpected token '{}', expected '{}'",
                unexpected, expected
            ),
            ParseError::BadByte(b) => {
                write!(f, "unexpected byte outside string literal: 0x{:02x}", b)
            }
            ParseError::BadIntLiteral(lit) => {
                write!(f, "cannot parse integer literal: {}", lit)
            }
            ParseError::UnterminatedString => {
                write!(f, "string literal has no closing quote")
            }
            ParseError::BadStringLiteral => {
                write!(f, "string literal is not valid UTF-8")
            }
            ParseError::ExpectedIdentifier => {
                write!(f, "expected identifier")
            }
            ParseError::ExpectedExpression => {
                write!(f, "expected expression")
            }
            ParseError::UnknownClass(name) => {
                write!(f, "unknown class: {}", name)
            }
            ParseError::BadStrCall(nargs) => {
                write!(f, "str() takes exactly one argument, got {}", nargs)
            }
        }
    }
}
