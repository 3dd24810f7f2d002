//! Lexical analyzer.
//!
//! Turns a byte stream into tokens for a significant-whitespace language:
//! besides the visible tokens, the lexer emits synthetic `Newline`,
//! `Indent` and `Dedent` tokens so the parser never has to count spaces.

use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::io::Bytes;
use std::iter::Peekable;

use crate::diag::{FullParseError, ParseError, Position};
use crate::token::Token;

const KEYWORDS: [(&str, Token); 12] = [
    ("class", Token::Class),
    ("return", Token::Return),
    ("if", Token::If),
    ("else", Token::Else),
    ("def", Token::Def),
    ("print", Token::Print),
    ("and", Token::And),
    ("or", Token::Or),
    ("not", Token::Not),
    ("None", Token::None),
    ("True", Token::True),
    ("False", Token::False),
];

fn keyword(name: &str) -> Option<Token> {
    KEYWORDS
        .iter()
        .find(|(text, _)| *text == name)
        .map(|(_, token)| token.clone())
}

/// Turn sequence of bytes into sequence of tokens.
///
/// One token is always buffered: callers inspect it with [`Lexer::current`]
/// and move on with [`Lexer::advance`].  Indentation is measured in units of
/// two leading spaces; each call emits at most one `Indent` or `Dedent`, so
/// a jump over several levels surfaces as that many consecutive tokens.
#[derive(Debug)]
pub struct Lexer<R: BufRead> {
    input: Peekable<Bytes<R>>,
    current: Token,
    line: Position,

    // Indentation state: `indent` is the depth of the last emitted block,
    // `next_indent` the depth implied by the current line's leading spaces.
    line_start: bool,
    indent: usize,
    next_indent: usize,

    // Buffer used when scanning longer tokens.  Allocated here to reuse memory.
    buf: String,
}

impl<R: BufRead> Lexer<R> {
    /// Creates a new lexer operating on `input` and reads the first token.
    pub fn new(input: R) -> Result<Lexer<R>, LexerError> {
        let mut lexer = Lexer {
            input: input.bytes().peekable(),
            current: Token::Eof,
            line: 1,
            line_start: true,
            indent: 0,
            next_indent: 0,
            buf: String::new(),
        };
        lexer.current = lexer.next_token()?;
        Ok(lexer)
    }

    /// The buffered token.
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Reads the next token and returns it.
    pub fn advance(&mut self) -> Result<&Token, LexerError> {
        self.current = self.next_token()?;
        Ok(&self.current)
    }

    /// Line the lexer is positioned on, for diagnostics.
    pub fn line(&self) -> Position {
        self.line
    }

    fn next_token(&mut self) -> Result<Token, LexerError> {
        loop {
            match self.peek_byte()? {
                None => {
                    // Terminate the pending line, then drain open blocks.
                    return Ok(if !self.line_start {
                        self.start_new_line();
                        Token::Newline
                    } else if self.indent > 0 {
                        self.indent -= 1;
                        Token::Dedent
                    } else {
                        Token::Eof
                    });
                }
                Some(b'\n') => {
                    self.read_byte()?;
                    self.line += 1;
                    if self.line_start {
                        // Blank or comment-only line: no Newline token.
                        self.next_indent = 0;
                    } else {
                        self.start_new_line();
                        return Ok(Token::Newline);
                    }
                }
                Some(b'#') => self.skip_comment()?,
                Some(b' ') => {
                    let spaces = self.read_spaces()?;
                    if self.line_start {
                        self.next_indent = spaces / 2;
                    }
                }
                Some(_) if self.line_start && self.indent != self.next_indent => {
                    return Ok(if self.indent < self.next_indent {
                        self.indent += 1;
                        Token::Indent
                    } else {
                        self.indent -= 1;
                        Token::Dedent
                    });
                }
                Some(b) => {
                    let token = self.read_token(b)?;
                    self.line_start = false;
                    return Ok(token);
                }
            }
        }
    }

    fn start_new_line(&mut self) {
        self.line_start = true;
        self.next_indent = 0;
    }

    /// Skip from `#` to (but excluding) the next line feed.
    fn skip_comment(&mut self) -> Result<(), LexerError> {
        loop {
            match self.peek_byte()? {
                Some(b) if b != b'\n' => {
                    self.read_byte()?;
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn read_spaces(&mut self) -> Result<usize, LexerError> {
        let mut count = 0;
        while let Some(b' ') = self.peek_byte()? {
            self.read_byte()?;
            count += 1;
        }
        Ok(count)
    }

    fn read_token(&mut self, first: u8) -> Result<Token, LexerError> {
        match first {
            b'0'..=b'9' => self.read_number(),
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.read_name(),
            b'\'' | b'"' => self.read_string(),
            _ if first.is_ascii() => self.read_operator(first),
            _ => Err(self.parse_error(ParseError::BadByte(first))),
        }
    }

    fn read_number(&mut self) -> Result<Token, LexerError> {
        self.buf.clear();
        loop {
            match self.peek_byte()? {
                Some(b) if b.is_ascii_digit() => {
                    let b = self.read_byte()?;
                    self.buf.push(b as char);
                }
                _ => break,
            }
        }

        let n = self
            .buf
            .parse::<i64>()
            .map_err(|_| self.parse_error(ParseError::BadIntLiteral(self.buf.clone())))?;
        Ok(Token::Number(n))
    }

    fn read_name(&mut self) -> Result<Token, LexerError> {
        self.buf.clear();
        loop {
            match self.peek_byte()? {
                Some(b) if b.is_ascii_alphanumeric() || b == b'_' => {
                    let b = self.read_byte()?;
                    self.buf.push(b as char);
                }
                _ => break,
            }
        }

        Ok(keyword(&self.buf).unwrap_or_else(|| Token::Id(self.buf.clone())))
    }

    /// Scan a string literal delimited by `'` or `"`.
    ///
    /// Recognised escapes are `\"`, `\'`, `\n` and `\t`; any other escaped
    /// byte is dropped.  Bytes outside ASCII pass through verbatim, so the
    /// literal as a whole must be valid UTF-8.
    fn read_string(&mut self) -> Result<Token, LexerError> {
        let quote = self.read_byte()?;
        let mut value: Vec<u8> = Vec::new();
        loop {
            match self.peek_byte()? {
                None => return Err(self.parse_error(ParseError::UnterminatedString)),
                Some(b) if b == quote => {
                    self.read_byte()?;
                    let s = String::from_utf8(value)
                        .map_err(|_| self.parse_error(ParseError::BadStringLiteral))?;
                    return Ok(Token::String(s));
                }
                Some(b'\\') => {
                    self.read_byte()?;
                    match self.peek_byte()? {
                        None => return Err(self.parse_error(ParseError::UnterminatedString)),
                        Some(escaped) => {
                            self.read_byte()?;
                            match escaped {
                                b'"' => value.push(b'"'),
                                b'\'' => value.push(b'\''),
                                b'n' => value.push(b'\n'),
                                b't' => value.push(b'\t'),
                                _ => (),
                            }
                        }
                    }
                }
                Some(_) => {
                    let b = self.read_byte()?;
                    value.push(b);
                }
            }
        }
    }

    /// Two-byte operators are recognised greedily; any other punctuation
    /// byte becomes a `Char` token.
    fn read_operator(&mut self, first: u8) -> Result<Token, LexerError> {
        self.read_byte()?;
        let two_byte = match (first, self.peek_byte()?) {
            (b'=', Some(b'=')) => Some(Token::Eq),
            (b'!', Some(b'=')) => Some(Token::NotEq),
            (b'<', Some(b'=')) => Some(Token::LessOrEq),
            (b'>', Some(b'=')) => Some(Token::GreaterOrEq),
            _ => None,
        };
        match two_byte {
            Some(token) => {
                self.read_byte()?;
                Ok(token)
            }
            None => Ok(Token::Char(first)),
        }
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, LexerError> {
        match self.input.peek() {
            Some(Ok(b)) => Ok(Some(*b)),
            Some(Err(_)) => Err(LexerError::Io(
                self.input.next().unwrap().unwrap_err(),
            )),
            None => Ok(None),
        }
    }

    /// Return next byte or error.  Panic on EOF.
    /// Use this after peek_byte()ing only.
    fn read_byte(&mut self) -> Result<u8, LexerError> {
        Ok(self.input.next().unwrap()?)
    }

    fn parse_error(&self, error: ParseError) -> LexerError {
        LexerError::Parse(FullParseError {
            pos: self.line,
            error,
        })
    }
}

#[derive(Debug)]
pub enum LexerError {
    Io(io::Error),
    Parse(FullParseError),
}

impl Error for LexerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LexerError::Io(e) => Some(e),
            LexerError::Parse(_) => None,
        }
    }
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            LexerError::Io(e) => write!(f, "read error: {}", e),
            LexerError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl From<io::Error> for LexerError {
    fn from(e: io::Error) -> LexerError {
        LexerError::Io(e)
    }
}
