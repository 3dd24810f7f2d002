//! API to control the interpreter.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::io::prelude::*;
use std::rc::Rc;

use crate::eval::{Evaluator, RuntimeError};
use crate::parser::{Parser, ParserError};
use crate::runtime::{Class, Closure};

/// Tree-walk interpreter for Mython.
///
/// # Example
///
/// Invoke the interpreter a first time to define a class then again to use
/// it; definitions persist across calls:
///
/// ```
/// # use mython::interpreter::{Interpreter, MythonError};
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// let class_def = "\
/// class Greeter:
///   def greet(self, name):
///     return 'Hello, ' + name + '!'
/// ";
/// interp.eval(class_def.as_bytes())?;
///
/// interp.eval("g = Greeter()\nprint g.greet('world')\n".as_bytes())?;
///
/// assert_eq!(output, b"Hello, world!\n");
/// # Ok::<(), MythonError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    evaluator: Evaluator<'t, W>,
    globals: Closure,
    classes: HashMap<String, Rc<Class>>,
}

/// Errors the interpreter can raise.
#[derive(Debug)]
pub enum MythonError {
    /// Error occurring during lexical or syntactic analysis.
    Parse(ParserError),

    /// Error occurring during evaluation.
    Runtime(RuntimeError),
}

impl fmt::Display for MythonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MythonError::Runtime(e) => write!(f, "runtime error: {}", e),
            MythonError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl Error for MythonError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MythonError::Runtime(e) => Some(e),
            MythonError::Parse(e) => Some(e),
        }
    }
}

impl From<RuntimeError> for MythonError {
    fn from(e: RuntimeError) -> MythonError {
        MythonError::Runtime(e)
    }
}

impl From<ParserError> for MythonError {
    fn from(e: ParserError) -> MythonError {
        MythonError::Parse(e)
    }
}

impl<W: Write> Interpreter<'_, W> {
    pub fn new(output: &mut W) -> Interpreter<'_, W> {
        Interpreter {
            evaluator: Evaluator::new(output),
            globals: Closure::new(),
            classes: HashMap::new(),
        }
    }

    /// Parses one program chunk from `input` and executes it against the
    /// persistent top-level scope.
    pub fn eval<R: BufRead>(&mut self, input: R) -> Result<(), MythonError> {
        let mut parser = Parser::new(input, &mut self.classes)?;
        let program = parser.parse_program()?;
        self.evaluator.run(&program, &mut self.globals)?;
        Ok(())
    }
}
