//! Syntactic analyzer.
//!
//! Recursive-descent parser turning the lexer's token stream into AST
//! nodes.  Class definitions are resolved at parse time: the parser owns a
//! table of declared classes so parent references and instantiations can
//! hold the class itself rather than a name.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use crate::ast::{Comparator, Stmt};
use crate::diag::{FullParseError, ParseError};
use crate::lexer::{Lexer, LexerError};
use crate::runtime::{Class, Method};
use crate::token::Token;

#[derive(Debug)]
pub enum ParserError {
    Parse(FullParseError),
    Io(io::Error),
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::Parse(e) => write!(f, "{}", e),
            ParserError::Io(e) => write!(f, "read error: {}", e),
        }
    }
}

impl Error for ParserError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParserError::Parse(_) => None,
            ParserError::Io(e) => Some(e),
        }
    }
}

impl From<LexerError> for ParserError {
    fn from(e: LexerError) -> ParserError {
        match e {
            LexerError::Io(e) => ParserError::Io(e),
            LexerError::Parse(d) => ParserError::Parse(d),
        }
    }
}

pub struct Parser<'c, R: BufRead> {
    lexer: Lexer<R>,
    classes: &'c mut HashMap<String, Rc<Class>>,
}

impl<'c, R: BufRead> Parser<'c, R> {
    pub fn new(
        input: R,
        classes: &'c mut HashMap<String, Rc<Class>>,
    ) -> Result<Parser<'c, R>, ParserError> {
        Ok(Parser {
            lexer: Lexer::new(input)?,
            classes,
        })
    }

    /// Parse a whole program into its top-level compound statement.
    pub fn parse_program(&mut self) -> Result<Stmt, ParserError> {
        let mut stmts = vec![];
        while *self.lexer.current() != Token::Eof {
            stmts.push(self.statement()?);
        }
        Ok(Stmt::Compound(stmts))
    }

    fn statement(&mut self) -> Result<Stmt, ParserError> {
        match self.lexer.current() {
            Token::Class => self.class_definition(),
            Token::If => self.if_else(),
            Token::Print => self.print_statement(),
            Token::Return => self.return_statement(),
            _ => self.simple_statement(),
        }
    }

    /// Parse class definition.
    /// Current token is Token::Class.
    fn class_definition(&mut self) -> Result<Stmt, ParserError> {
        self.advance()?;
        let name = self.identifier()?;
        let parent = if *self.lexer.current() == Token::Char(b'(') {
            self.advance()?;
            let parent_name = self.identifier()?;
            self.consume(Token::Char(b')'))?;
            match self.classes.get(&parent_name) {
                Some(class) => Some(class.clone()),
                None => return Err(self.error(ParseError::UnknownClass(parent_name))),
            }
        } else {
            None
        };
        self.consume(Token::Char(b':'))?;
        self.consume(Token::Newline)?;
        self.consume(Token::Indent)?;
        let mut methods = vec![];
        loop {
            match self.lexer.current() {
                Token::Dedent => {
                    self.advance()?;
                    break;
                }
                _ => methods.push(self.method_definition()?),
            }
        }

        let class = Rc::new(Class::new(name.clone(), methods, parent));
        self.classes.insert(name, class.clone());
        Ok(Stmt::ClassDefinition(class))
    }

    fn method_definition(&mut self) -> Result<Method, ParserError> {
        self.consume(Token::Def)?;
        let name = self.identifier()?;
        self.consume(Token::Char(b'('))?;
        let mut formal_params = vec![];
        if Token::Char(b')') != *self.lexer.current() {
            loop {
                formal_params.push(self.identifier()?);
                if Token::Char(b',') != *self.lexer.current() {
                    break;
                }
                self.advance()?;
            }
        }
        self.consume(Token::Char(b')'))?;
        self.consume(Token::Char(b':'))?;
        let body = self.suite()?;

        // The declared receiver is not a real parameter: the runtime binds
        // `self` on every call.
        if formal_params.first().map(String::as_str) == Some("self") {
            formal_params.remove(0);
        }

        Ok(Method {
            name,
            formal_params,
            body: Stmt::MethodBody(Box::new(body)),
        })
    }

    /// An indented block: NEWLINE INDENT statement+ DEDENT.
    fn suite(&mut self) -> Result<Stmt, ParserError> {
        self.consume(Token::Newline)?;
        self.consume(Token::Indent)?;
        let mut stmts = vec![];
        loop {
            match self.lexer.current() {
                Token::Dedent => {
                    self.advance()?;
                    break;
                }
                _ => stmts.push(self.statement()?),
            }
        }
        Ok(Stmt::Compound(stmts))
    }

    fn if_else(&mut self) -> Result<Stmt, ParserError> {
        self.advance()?;
        let condition = self.test()?;
        self.consume(Token::Char(b':'))?;
        let then_body = self.suite()?;
        let else_body = if *self.lexer.current() == Token::Else {
            self.advance()?;
            self.consume(Token::Char(b':'))?;
            Some(Box::new(self.suite()?))
        } else {
            None
        };
        Ok(Stmt::IfElse(
            Box::new(condition),
            Box::new(then_body),
            else_body,
        ))
    }

    fn print_statement(&mut self) -> Result<Stmt, ParserError> {
        self.advance()?;
        let mut args = vec![];
        if *self.lexer.current() != Token::Newline {
            loop {
                args.push(self.test()?);
                if Token::Char(b',') != *self.lexer.current() {
                    break;
                }
                self.advance()?;
            }
        }
        self.consume(Token::Newline)?;
        Ok(Stmt::Print(args))
    }

    fn return_statement(&mut self) -> Result<Stmt, ParserError> {
        self.advance()?;
        let value = if *self.lexer.current() == Token::Newline {
            Stmt::None
        } else {
            self.test()?
        };
        self.consume(Token::Newline)?;
        Ok(Stmt::Return(Box::new(value)))
    }

    /// Assignment, field assignment, or a bare call used as a statement.
    fn simple_statement(&mut self) -> Result<Stmt, ParserError> {
        let mut ids = self.dotted_ids()?;
        if *self.lexer.current() == Token::Char(b'=') {
            self.advance()?;
            let rv = Box::new(self.test()?);
            self.consume(Token::Newline)?;
            if ids.len() == 1 {
                let var = ids.pop().expect("dotted path is never empty");
                Ok(Stmt::Assignment(var, rv))
            } else {
                let field = ids.pop().expect("dotted path is never empty");
                Ok(Stmt::FieldAssignment(ids, field, rv))
            }
        } else {
            let expr = self.postfix(ids)?;
            self.consume(Token::Newline)?;
            Ok(expr)
        }
    }

    fn dotted_ids(&mut self) -> Result<Vec<String>, ParserError> {
        let mut ids = vec![self.identifier()?];
        while *self.lexer.current() == Token::Char(b'.') {
            self.advance()?;
            ids.push(self.identifier()?);
        }
        Ok(ids)
    }

    /// An optionally-called dotted path: `x.y`, `x.y.m(...)`, `C(...)` or
    /// `str(...)`, with further method calls chaining onto a call result as
    /// in `D().greet()`.
    fn postfix(&mut self, mut ids: Vec<String>) -> Result<Stmt, ParserError> {
        if *self.lexer.current() != Token::Char(b'(') {
            return Ok(Stmt::VariableValue(ids));
        }
        let mut args = self.call_args()?;

        let mut expr = if ids.len() > 1 {
            let method = ids.pop().expect("dotted path is never empty");
            Stmt::MethodCall(Box::new(Stmt::VariableValue(ids)), method, args)
        } else {
            let name = ids.pop().expect("dotted path is never empty");
            if name == "str" {
                if args.len() != 1 {
                    return Err(self.error(ParseError::BadStrCall(args.len())));
                }
                let arg = args.pop().expect("arity was checked above");
                Stmt::Stringify(Box::new(arg))
            } else {
                match self.classes.get(&name) {
                    Some(class) => Stmt::NewInstance(class.clone(), args),
                    None => return Err(self.error(ParseError::UnknownClass(name))),
                }
            }
        };

        while *self.lexer.current() == Token::Char(b'.') {
            self.advance()?;
            let method = self.identifier()?;
            let chained_args = self.call_args()?;
            expr = Stmt::MethodCall(Box::new(expr), method, chained_args);
        }
        Ok(expr)
    }

    fn call_args(&mut self) -> Result<Vec<Stmt>, ParserError> {
        self.consume(Token::Char(b'('))?;
        let mut args = vec![];
        if Token::Char(b')') != *self.lexer.current() {
            loop {
                args.push(self.test()?);
                if Token::Char(b',') != *self.lexer.current() {
                    break;
                }
                self.advance()?;
            }
        }
        self.consume(Token::Char(b')'))?;
        Ok(args)
    }

    fn test(&mut self) -> Result<Stmt, ParserError> {
        self.or_test()
    }

    fn or_test(&mut self) -> Result<Stmt, ParserError> {
        let mut expr = self.and_test()?;
        while *self.lexer.current() == Token::Or {
            self.advance()?;
            expr = Stmt::Or(Box::new(expr), Box::new(self.and_test()?));
        }
        Ok(expr)
    }

    fn and_test(&mut self) -> Result<Stmt, ParserError> {
        let mut expr = self.not_test()?;
        while *self.lexer.current() == Token::And {
            self.advance()?;
            expr = Stmt::And(Box::new(expr), Box::new(self.not_test()?));
        }
        Ok(expr)
    }

    fn not_test(&mut self) -> Result<Stmt, ParserError> {
        if *self.lexer.current() == Token::Not {
            self.advance()?;
            Ok(Stmt::Not(Box::new(self.not_test()?)))
        } else {
            self.comparison()
        }
    }

    /// A single, non-chained comparison.
    fn comparison(&mut self) -> Result<Stmt, ParserError> {
        let lhs = self.adding()?;
        let cmp = match self.lexer.current() {
            Token::Eq => Comparator::Equal,
            Token::NotEq => Comparator::NotEqual,
            Token::Char(b'<') => Comparator::Less,
            Token::Char(b'>') => Comparator::Greater,
            Token::LessOrEq => Comparator::LessOrEqual,
            Token::GreaterOrEq => Comparator::GreaterOrEqual,
            _ => return Ok(lhs),
        };
        self.advance()?;
        let rhs = self.adding()?;
        Ok(Stmt::Comparison(cmp, Box::new(lhs), Box::new(rhs)))
    }

    fn adding(&mut self) -> Result<Stmt, ParserError> {
        let mut expr = self.term()?;
        loop {
            match self.lexer.current() {
                Token::Char(b'+') => {
                    self.advance()?;
                    expr = Stmt::Add(Box::new(expr), Box::new(self.term()?));
                }
                Token::Char(b'-') => {
                    self.advance()?;
                    expr = Stmt::Sub(Box::new(expr), Box::new(self.term()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Stmt, ParserError> {
        let mut expr = self.primary()?;
        loop {
            match self.lexer.current() {
                Token::Char(b'*') => {
                    self.advance()?;
                    expr = Stmt::Mult(Box::new(expr), Box::new(self.primary()?));
                }
                Token::Char(b'/') => {
                    self.advance()?;
                    expr = Stmt::Div(Box::new(expr), Box::new(self.primary()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Stmt, ParserError> {
        match self.lexer.current().clone() {
            Token::Number(n) => {
                self.advance()?;
                Ok(Stmt::Number(n))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Stmt::String(s))
            }
            Token::True => {
                self.advance()?;
                Ok(Stmt::Bool(true))
            }
            Token::False => {
                self.advance()?;
                Ok(Stmt::Bool(false))
            }
            Token::None => {
                self.advance()?;
                Ok(Stmt::None)
            }
            Token::Char(b'(') => {
                self.advance()?;
                let expr = self.test()?;
                self.consume(Token::Char(b')'))?;
                Ok(expr)
            }
            Token::Id(_) => {
                let ids = self.dotted_ids()?;
                self.postfix(ids)
            }
            _ => Err(self.error(ParseError::ExpectedExpression)),
        }
    }

    fn identifier(&mut self) -> Result<String, ParserError> {
        if let Token::Id(id) = self.lexer.current().clone() {
            self.advance()?;
            Ok(id)
        } else {
            Err(self.error(ParseError::ExpectedIdentifier))
        }
    }

    fn advance(&mut self) -> Result<&Token, ParserError> {
        Ok(self.lexer.advance()?)
    }

    fn consume(&mut self, expected: Token) -> Result<(), ParserError> {
        if *self.lexer.current() == expected {
            self.advance()?;
            Ok(())
        } else {
            Err(self.error(ParseError::UnexpectedToken(
                self.lexer.current().to_string(),
                expected.to_string(),
            )))
        }
    }

    fn error(&self, error: ParseError) -> ParserError {
        ParserError::Parse(FullParseError {
            pos: self.lexer.line(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_prg(input: &str) -> Result<Stmt, ParserError> {
        let mut classes = HashMap::new();
        let mut parser = Parser::new(input.as_bytes(), &mut classes)?;
        parser.parse_program()
    }

    fn var(name: &str) -> Stmt {
        Stmt::VariableValue(vec![name.to_string()])
    }

    #[test]
    fn empty_program() -> Result<(), ParserError> {
        assert_eq!(parse_prg("")?, Stmt::Compound(vec![]));
        Ok(())
    }

    #[test]
    fn assignment() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("x = 42\n")?,
            Stmt::Compound(vec![Stmt::Assignment(
                "x".to_string(),
                Box::new(Stmt::Number(42))
            )])
        );
        Ok(())
    }

    #[test]
    fn field_assignment() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("a.b.c = 1\n")?,
            Stmt::Compound(vec![Stmt::FieldAssignment(
                vec!["a".to_string(), "b".to_string()],
                "c".to_string(),
                Box::new(Stmt::Number(1))
            )])
        );
        Ok(())
    }

    #[test]
    fn dotted_variable_read() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("y = a.b\n")?,
            Stmt::Compound(vec![Stmt::Assignment(
                "y".to_string(),
                Box::new(Stmt::VariableValue(vec!["a".to_string(), "b".to_string()]))
            )])
        );
        Ok(())
    }

    #[test]
    fn print_with_several_arguments() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("print 1, 'a', True, None\n")?,
            Stmt::Compound(vec![Stmt::Print(vec![
                Stmt::Number(1),
                Stmt::String("a".to_string()),
                Stmt::Bool(true),
                Stmt::None,
            ])])
        );
        Ok(())
    }

    #[test]
    fn print_without_arguments() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("print\n")?,
            Stmt::Compound(vec![Stmt::Print(vec![])])
        );
        Ok(())
    }

    #[test]
    fn factors_have_precedence_over_terms() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("x = 1 + 2 * 3\n")?,
            Stmt::Compound(vec![Stmt::Assignment(
                "x".to_string(),
                Box::new(Stmt::Add(
                    Box::new(Stmt::Number(1)),
                    Box::new(Stmt::Mult(
                        Box::new(Stmt::Number(2)),
                        Box::new(Stmt::Number(3))
                    ))
                ))
            )])
        );
        Ok(())
    }

    #[test]
    fn addition_is_left_associative() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("x = 1 + 2 + 3\n")?,
            Stmt::Compound(vec![Stmt::Assignment(
                "x".to_string(),
                Box::new(Stmt::Add(
                    Box::new(Stmt::Add(
                        Box::new(Stmt::Number(1)),
                        Box::new(Stmt::Number(2))
                    )),
                    Box::new(Stmt::Number(3))
                ))
            )])
        );
        Ok(())
    }

    #[test]
    fn parenthesised_expression_takes_precedence() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("x = (1 + 2) * 3\n")?,
            Stmt::Compound(vec![Stmt::Assignment(
                "x".to_string(),
                Box::new(Stmt::Mult(
                    Box::new(Stmt::Add(
                        Box::new(Stmt::Number(1)),
                        Box::new(Stmt::Number(2))
                    )),
                    Box::new(Stmt::Number(3))
                ))
            )])
        );
        Ok(())
    }

    #[test]
    fn comparison_binds_looser_than_arithmetic() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("x = 1 + 1 == 2\n")?,
            Stmt::Compound(vec![Stmt::Assignment(
                "x".to_string(),
                Box::new(Stmt::Comparison(
                    Comparator::Equal,
                    Box::new(Stmt::Add(
                        Box::new(Stmt::Number(1)),
                        Box::new(Stmt::Number(1))
                    )),
                    Box::new(Stmt::Number(2))
                ))
            )])
        );
        Ok(())
    }

    #[test]
    fn all_comparison_operators() -> Result<(), ParserError> {
        for (source, cmp) in [
            ("==", Comparator::Equal),
            ("!=", Comparator::NotEqual),
            ("<", Comparator::Less),
            (">", Comparator::Greater),
            ("<=", Comparator::LessOrEqual),
            (">=", Comparator::GreaterOrEqual),
        ]
        .iter()
        {
            assert_eq!(
                parse_prg(&format!("x = a {} b\n", source))?,
                Stmt::Compound(vec![Stmt::Assignment(
                    "x".to_string(),
                    Box::new(Stmt::Comparison(
                        *cmp,
                        Box::new(var("a")),
                        Box::new(var("b"))
                    ))
                )])
            );
        }
        Ok(())
    }

    #[test]
    fn logic_operators_nest_by_precedence() -> Result<(), ParserError> {
        // not binds tightest, then and, then or.
        assert_eq!(
            parse_prg("x = a or not b and c\n")?,
            Stmt::Compound(vec![Stmt::Assignment(
                "x".to_string(),
                Box::new(Stmt::Or(
                    Box::new(var("a")),
                    Box::new(Stmt::And(
                        Box::new(Stmt::Not(Box::new(var("b")))),
                        Box::new(var("c"))
                    ))
                ))
            )])
        );
        Ok(())
    }

    #[test]
    fn stringify_call() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("s = str(42)\n")?,
            Stmt::Compound(vec![Stmt::Assignment(
                "s".to_string(),
                Box::new(Stmt::Stringify(Box::new(Stmt::Number(42))))
            )])
        );
        Ok(())
    }

    #[test]
    fn stringify_requires_one_argument() {
        match parse_prg("s = str(1, 2)\n") {
            Err(ParserError::Parse(FullParseError {
                error: ParseError::BadStrCall(2),
                ..
            })) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn if_without_else() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("if x:\n  print x\n")?,
            Stmt::Compound(vec![Stmt::IfElse(
                Box::new(var("x")),
                Box::new(Stmt::Compound(vec![Stmt::Print(vec![var("x")])])),
                None
            )])
        );
        Ok(())
    }

    #[test]
    fn if_with_else() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("if x:\n  print 1\nelse:\n  print 2\n")?,
            Stmt::Compound(vec![Stmt::IfElse(
                Box::new(var("x")),
                Box::new(Stmt::Compound(vec![Stmt::Print(vec![Stmt::Number(1)])])),
                Some(Box::new(Stmt::Compound(vec![Stmt::Print(vec![
                    Stmt::Number(2)
                ])])))
            )])
        );
        Ok(())
    }

    #[test]
    fn nested_if() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("if a:\n  if b:\n    print 1\n")?,
            Stmt::Compound(vec![Stmt::IfElse(
                Box::new(var("a")),
                Box::new(Stmt::Compound(vec![Stmt::IfElse(
                    Box::new(var("b")),
                    Box::new(Stmt::Compound(vec![Stmt::Print(vec![Stmt::Number(1)])])),
                    None
                )])),
                None
            )])
        );
        Ok(())
    }

    #[test]
    fn class_definition_and_instantiation() -> Result<(), ParserError> {
        let source = "\
class Greeter:
  def greet(self):
    return 1
g = Greeter()
";
        let expected_class = Rc::new(Class::new(
            "Greeter".to_string(),
            vec![Method {
                name: "greet".to_string(),
                formal_params: vec![],
                body: Stmt::MethodBody(Box::new(Stmt::Compound(vec![Stmt::Return(Box::new(
                    Stmt::Number(1),
                ))]))),
            }],
            None,
        ));
        assert_eq!(
            parse_prg(source)?,
            Stmt::Compound(vec![
                Stmt::ClassDefinition(expected_class.clone()),
                Stmt::Assignment(
                    "g".to_string(),
                    Box::new(Stmt::NewInstance(expected_class, vec![]))
                ),
            ])
        );
        Ok(())
    }

    #[test]
    fn leading_self_parameter_is_implicit() -> Result<(), ParserError> {
        let source = "\
class C:
  def f(self, x, y):
    return x
";
        match parse_prg(source)? {
            Stmt::Compound(stmts) => match &stmts[0] {
                Stmt::ClassDefinition(class) => {
                    let m = class.method("f").expect("method must parse");
                    assert_eq!(m.formal_params, vec!["x".to_string(), "y".to_string()]);
                }
                other => panic!("unexpected statement: {:?}", other),
            },
            other => panic!("unexpected program: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn derived_class_resolves_its_parent() -> Result<(), ParserError> {
        let source = "\
class Base:
  def greet(self):
    return 'B'
class Derived(Base):
  def greet(self):
    return 'D'
";
        match parse_prg(source)? {
            Stmt::Compound(stmts) => match &stmts[1] {
                Stmt::ClassDefinition(class) => {
                    assert_eq!(class.name(), "Derived");
                    // The parent's method is reachable through the child.
                    assert!(class.has_method("greet", 0));
                }
                other => panic!("unexpected statement: {:?}", other),
            },
            other => panic!("unexpected program: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn unknown_parent_class() {
        match parse_prg("class D(Missing):\n  def f(self):\n    return 1\n") {
            Err(ParserError::Parse(FullParseError {
                error: ParseError::UnknownClass(name),
                ..
            })) if name == "Missing" => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn unknown_class_in_instantiation() {
        match parse_prg("x = Missing()\n") {
            Err(ParserError::Parse(FullParseError {
                error: ParseError::UnknownClass(name),
                ..
            })) if name == "Missing" => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn method_call_statement() -> Result<(), ParserError> {
        assert_eq!(
            parse_prg("a.b.run(1, 2)\n")?,
            Stmt::Compound(vec![Stmt::MethodCall(
                Box::new(Stmt::VariableValue(vec!["a".to_string(), "b".to_string()])),
                "run".to_string(),
                vec![Stmt::Number(1), Stmt::Number(2)]
            )])
        );
        Ok(())
    }

    #[test]
    fn method_call_chains_onto_a_call_result() -> Result<(), ParserError> {
        let source = "\
class C:
  def me(self):
    return self
x = C().me()
";
        match parse_prg(source)? {
            Stmt::Compound(stmts) => match &stmts[1] {
                Stmt::Assignment(_, rv) => match rv.as_ref() {
                    Stmt::MethodCall(object, method, args)
                        if method == "me" && args.is_empty() =>
                    {
                        assert!(matches!(object.as_ref(), Stmt::NewInstance(..)));
                    }
                    other => panic!("unexpected right-hand side: {:?}", other),
                },
                other => panic!("unexpected statement: {:?}", other),
            },
            other => panic!("unexpected program: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn bare_return_yields_none() -> Result<(), ParserError> {
        let source = "\
class C:
  def f(self):
    return
";
        match parse_prg(source)? {
            Stmt::Compound(stmts) => match &stmts[0] {
                Stmt::ClassDefinition(class) => {
                    let m = class.method("f").expect("method must parse");
                    assert_eq!(
                        m.body,
                        Stmt::MethodBody(Box::new(Stmt::Compound(vec![Stmt::Return(
                            Box::new(Stmt::None)
                        )])))
                    );
                }
                other => panic!("unexpected statement: {:?}", other),
            },
            other => panic!("unexpected program: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn missing_suite_indent() {
        match parse_prg("if x:\nprint 1\n") {
            Err(ParserError::Parse(FullParseError {
                error: ParseError::UnexpectedToken(_, expected),
                ..
            })) if expected == "INDENT" => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn statement_must_start_with_a_known_form() {
        match parse_prg("42\n") {
            Err(ParserError::Parse(FullParseError {
                error: ParseError::ExpectedIdentifier,
                ..
            })) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }
}
