//! Tree-walking evaluator.
//!
//! Walks [`Stmt`] nodes against a [`Closure`] and a [`Context`].  Method
//! dispatch, the special-method protocol and the polymorphic comparison
//! operations all live here because they may execute user code.

use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use crate::ast::{Comparator, Stmt};
use crate::runtime::{self, ClassInstance, Closure, Context, Object, ObjectHolder};

// Special method names: a protocol, not a type-system feature.
const STR_METHOD: &str = "__str__";
const EQ_METHOD: &str = "__eq__";
const LT_METHOD: &str = "__lt__";
const INIT_METHOD: &str = "__init__";
const ADD_METHOD: &str = "__add__";

const SELF_VAR: &str = "self";
const NONE_REPR: &str = "None";

#[derive(Debug)]
pub enum RuntimeError {
    DivisionByZero,
    TypeMismatch(&'static str),
    Incomparable,
    UnknownVariable(String),
    NotAnInstance(String),
    UnknownMethod(String, String, usize),
    Io(io::Error),
}

impl Error for RuntimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RuntimeError::DivisionByZero
            | RuntimeError::TypeMismatch(_)
            | RuntimeError::Incomparable
            | RuntimeError::UnknownVariable(_)
            | RuntimeError::NotAnInstance(_)
            | RuntimeError::UnknownMethod(..) => None,
            RuntimeError::Io(e) => Some(e),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::DivisionByZero => write!(f, "division by zero"),
            RuntimeError::TypeMismatch(what) => write!(f, "{}", what),
            RuntimeError::Incomparable => write!(f, "cannot compare these values"),
            RuntimeError::UnknownVariable(name) => write!(f, "unknown variable: {}", name),
            RuntimeError::NotAnInstance(member) => {
                write!(f, "cannot access '{}': value is not a class instance", member)
            }
            RuntimeError::UnknownMethod(class, method, arity) => write!(
                f,
                "class {} has no method {} taking {} arguments",
                class, method, arity
            ),
            RuntimeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> RuntimeError {
        RuntimeError::Io(e)
    }
}

#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    ctx: Context<'t, W>,

    // Return signal: set by `Return`, checked by `Compound` between
    // children, consumed exclusively by `MethodBody`.
    is_returning: Option<ObjectHolder>,
}

impl<'t, W: Write> Evaluator<'t, W> {
    pub fn new(output: &'t mut W) -> Evaluator<'t, W> {
        Evaluator {
            ctx: Context::new(output),
            is_returning: None,
        }
    }

    /// Runs a whole program chunk against `globals`.
    pub fn run(&mut self, program: &Stmt, globals: &mut Closure) -> Result<(), RuntimeError> {
        self.eval(program, globals)?;
        // A stray top-level return must not leak into the next chunk.
        self.is_returning = None;
        Ok(())
    }

    /// Executes one AST node.  Every node yields a value; statements that
    /// have nothing to say yield the empty holder.
    pub fn eval(&mut self, stmt: &Stmt, closure: &mut Closure) -> Result<ObjectHolder, RuntimeError> {
        match stmt {
            Stmt::None => Ok(ObjectHolder::none()),
            Stmt::Number(n) => Ok(ObjectHolder::own(Object::Number(*n))),
            Stmt::String(s) => Ok(ObjectHolder::own(Object::String(s.clone()))),
            Stmt::Bool(b) => Ok(ObjectHolder::own(Object::Bool(*b))),
            Stmt::Assignment(var, rv) => {
                let value = self.eval(rv, closure)?;
                closure.insert(var.clone(), value.clone());
                Ok(value)
            }
            Stmt::VariableValue(ids) => resolve_variable(ids, closure),
            Stmt::FieldAssignment(object, field, rv) => {
                let target = resolve_variable(object, closure)?;
                if target.instance_class().is_none() {
                    return Err(RuntimeError::NotAnInstance(field.clone()));
                }
                let value = self.eval(rv, closure)?;
                target.with_fields_mut(|fields| {
                    fields.insert(field.clone(), value.clone());
                });
                Ok(value)
            }
            Stmt::Print(args) => {
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(self.ctx.output_stream(), " ")?;
                    }
                    let value = self.eval(arg, closure)?;
                    let text = self.format_value(&value)?;
                    write!(self.ctx.output_stream(), "{}", text)?;
                }
                writeln!(self.ctx.output_stream())?;
                Ok(ObjectHolder::none())
            }
            Stmt::Stringify(arg) => {
                let value = self.eval(arg, closure)?;
                let text = self.format_value(&value)?;
                Ok(ObjectHolder::own(Object::String(text)))
            }
            Stmt::Add(lhs, rhs) => {
                let l = self.eval(lhs, closure)?;
                let r = self.eval(rhs, closure)?;
                self.add(&l, &r)
            }
            Stmt::Sub(lhs, rhs) => {
                let l = self.eval(lhs, closure)?;
                let r = self.eval(rhs, closure)?;
                match (l.as_number(), r.as_number()) {
                    (Some(a), Some(b)) => Ok(ObjectHolder::own(Object::Number(a - b))),
                    _ => Err(RuntimeError::TypeMismatch("can only subtract numbers")),
                }
            }
            Stmt::Mult(lhs, rhs) => {
                let l = self.eval(lhs, closure)?;
                let r = self.eval(rhs, closure)?;
                match (l.as_number(), r.as_number()) {
                    (Some(a), Some(b)) => Ok(ObjectHolder::own(Object::Number(a * b))),
                    _ => Err(RuntimeError::TypeMismatch("can only multiply numbers")),
                }
            }
            Stmt::Div(lhs, rhs) => {
                let l = self.eval(lhs, closure)?;
                let r = self.eval(rhs, closure)?;
                // A zero divisor is reported before the operand type check.
                if r.as_number() == Some(0) {
                    return Err(RuntimeError::DivisionByZero);
                }
                match (l.as_number(), r.as_number()) {
                    (Some(a), Some(b)) => Ok(ObjectHolder::own(Object::Number(a / b))),
                    _ => Err(RuntimeError::TypeMismatch("can only divide numbers")),
                }
            }
            Stmt::Or(lhs, rhs) => {
                let value = if runtime::is_true(&self.eval(lhs, closure)?) {
                    true
                } else {
                    runtime::is_true(&self.eval(rhs, closure)?)
                };
                Ok(ObjectHolder::own(Object::Bool(value)))
            }
            Stmt::And(lhs, rhs) => {
                let value = if runtime::is_true(&self.eval(lhs, closure)?) {
                    runtime::is_true(&self.eval(rhs, closure)?)
                } else {
                    false
                };
                Ok(ObjectHolder::own(Object::Bool(value)))
            }
            Stmt::Not(arg) => {
                let value = !runtime::is_true(&self.eval(arg, closure)?);
                Ok(ObjectHolder::own(Object::Bool(value)))
            }
            Stmt::Comparison(cmp, lhs, rhs) => {
                let l = self.eval(lhs, closure)?;
                let r = self.eval(rhs, closure)?;
                let result = self.compare(*cmp, &l, &r)?;
                Ok(ObjectHolder::own(Object::Bool(result)))
            }
            Stmt::Compound(stmts) => {
                for stmt in stmts {
                    if self.is_returning.is_some() {
                        break;
                    }
                    self.eval(stmt, closure)?;
                }
                Ok(ObjectHolder::none())
            }
            Stmt::IfElse(condition, then_body, else_body) => {
                let condition = self.eval(condition, closure)?;
                if runtime::is_true(&condition) {
                    self.eval(then_body, closure)
                } else if let Some(else_body) = else_body {
                    self.eval(else_body, closure)
                } else {
                    Ok(ObjectHolder::none())
                }
            }
            Stmt::Return(rv) => {
                let value = self.eval(rv, closure)?;
                debug_assert!(self.is_returning.is_none());
                self.is_returning = Some(value);
                Ok(ObjectHolder::none())
            }
            Stmt::MethodBody(body) => {
                self.eval(body, closure)?;
                Ok(self.is_returning.take().unwrap_or_else(ObjectHolder::none))
            }
            Stmt::MethodCall(object, method, args) => {
                let target = self.eval(object, closure)?;
                if target.instance_class().is_none() {
                    return Err(RuntimeError::NotAnInstance(method.clone()));
                }
                let mut actual_args = Vec::with_capacity(args.len());
                for arg in args {
                    actual_args.push(self.eval(arg, closure)?);
                }
                self.call(&target, method, actual_args)
            }
            Stmt::NewInstance(class, args) => {
                let instance = ObjectHolder::own(Object::Instance(ClassInstance::new(class.clone())));
                if class.has_method(INIT_METHOD, args.len()) {
                    let mut actual_args = Vec::with_capacity(args.len());
                    for arg in args {
                        actual_args.push(self.eval(arg, closure)?);
                    }
                    self.call(&instance, INIT_METHOD, actual_args)?;
                }
                Ok(instance)
            }
            Stmt::ClassDefinition(class) => {
                closure.insert(
                    class.name().to_string(),
                    ObjectHolder::own(Object::Class(class.clone())),
                );
                Ok(ObjectHolder::none())
            }
        }
    }

    /// Invokes `method` on the instance in `target`: looks the method up
    /// through the inheritance chain, checks the arity, builds a call frame
    /// binding `self` and the formal parameters, and evaluates the body.
    fn call(
        &mut self,
        target: &ObjectHolder,
        method: &str,
        args: Vec<ObjectHolder>,
    ) -> Result<ObjectHolder, RuntimeError> {
        let class = target
            .instance_class()
            .ok_or_else(|| RuntimeError::NotAnInstance(method.to_string()))?;
        let m = match class.method(method) {
            Some(m) if m.formal_params.len() == args.len() => m,
            _ => {
                return Err(RuntimeError::UnknownMethod(
                    class.name().to_string(),
                    method.to_string(),
                    args.len(),
                ))
            }
        };

        let mut frame = Closure::new();
        frame.insert(SELF_VAR.to_string(), target.clone());
        for (param, arg) in m.formal_params.iter().zip(args) {
            frame.insert(param.clone(), arg);
        }
        self.eval(&m.body, &mut frame)
    }

    fn add(&mut self, lhs: &ObjectHolder, rhs: &ObjectHolder) -> Result<ObjectHolder, RuntimeError> {
        if let (Some(l), Some(r)) = (lhs.object(), rhs.object()) {
            match (&*l.borrow(), &*r.borrow()) {
                (Object::Number(a), Object::Number(b)) => {
                    return Ok(ObjectHolder::own(Object::Number(a + b)))
                }
                (Object::String(a), Object::String(b)) => {
                    let mut s = a.clone();
                    s.push_str(b);
                    return Ok(ObjectHolder::own(Object::String(s)));
                }
                _ => (),
            }
        }
        if let Some(class) = lhs.instance_class() {
            if class.has_method(ADD_METHOD, 1) {
                return self.call(lhs, ADD_METHOD, vec![rhs.clone()]);
            }
        }
        Err(RuntimeError::TypeMismatch(
            "can only add numbers, strings, or class instances with __add__",
        ))
    }

    fn compare(
        &mut self,
        cmp: Comparator,
        lhs: &ObjectHolder,
        rhs: &ObjectHolder,
    ) -> Result<bool, RuntimeError> {
        match cmp {
            Comparator::Equal => self.equal(lhs, rhs),
            Comparator::NotEqual => Ok(!self.equal(lhs, rhs)?),
            Comparator::Less => self.less(lhs, rhs),
            Comparator::Greater => self.greater(lhs, rhs),
            Comparator::LessOrEqual => Ok(!self.greater(lhs, rhs)?),
            Comparator::GreaterOrEqual => Ok(!self.less(lhs, rhs)?),
        }
    }

    /// Payload equality for same-kind primitives, then the instance
    /// `__eq__` hook, then the both-None fallback.  That ordering is
    /// observable and must not change.
    fn equal(&mut self, lhs: &ObjectHolder, rhs: &ObjectHolder) -> Result<bool, RuntimeError> {
        if let (Some(l), Some(r)) = (lhs.object(), rhs.object()) {
            match (&*l.borrow(), &*r.borrow()) {
                (Object::Number(a), Object::Number(b)) => return Ok(a == b),
                (Object::String(a), Object::String(b)) => return Ok(a == b),
                (Object::Bool(a), Object::Bool(b)) => return Ok(a == b),
                _ => (),
            }
        }
        if let Some(class) = lhs.instance_class() {
            if class.has_method(EQ_METHOD, 1) {
                let verdict = self.call(lhs, EQ_METHOD, vec![rhs.clone()])?;
                return Ok(runtime::is_true(&verdict));
            }
        }
        if lhs.is_none() && rhs.is_none() {
            return Ok(true);
        }
        Err(RuntimeError::Incomparable)
    }

    fn less(&mut self, lhs: &ObjectHolder, rhs: &ObjectHolder) -> Result<bool, RuntimeError> {
        if let (Some(l), Some(r)) = (lhs.object(), rhs.object()) {
            match (&*l.borrow(), &*r.borrow()) {
                (Object::Number(a), Object::Number(b)) => return Ok(a < b),
                (Object::String(a), Object::String(b)) => return Ok(a < b),
                (Object::Bool(a), Object::Bool(b)) => return Ok(a < b),
                _ => (),
            }
        }
        if let Some(class) = lhs.instance_class() {
            if class.has_method(LT_METHOD, 1) {
                let verdict = self.call(lhs, LT_METHOD, vec![rhs.clone()])?;
                return Ok(runtime::is_true(&verdict));
            }
        }
        Err(RuntimeError::Incomparable)
    }

    fn greater(&mut self, lhs: &ObjectHolder, rhs: &ObjectHolder) -> Result<bool, RuntimeError> {
        Ok(!(self.less(lhs, rhs)? || self.equal(lhs, rhs)?))
    }

    /// Textual form of a value, as `print` shows it: `__str__` where the
    /// class defines it, an address-like tag for other instances.
    fn format_value(&mut self, value: &ObjectHolder) -> Result<String, RuntimeError> {
        if let Some(class) = value.instance_class() {
            if class.has_method(STR_METHOD, 0) {
                let shown = self.call(value, STR_METHOD, vec![])?;
                return self.format_value(&shown);
            }
        }
        let obj = match value.object() {
            Some(obj) => obj,
            None => return Ok(NONE_REPR.to_string()),
        };
        let text = match &*obj.borrow() {
            Object::Number(n) => n.to_string(),
            Object::String(s) => s.clone(),
            Object::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
            Object::Class(class) => format!("Class {}", class.name()),
            Object::Instance(_) => format!("{:p}", Rc::as_ptr(obj)),
        };
        Ok(text)
    }
}

/// Dotted variable read: the leftmost name comes from `closure`, every
/// further segment from the previous value's field map.
fn resolve_variable(ids: &[String], closure: &Closure) -> Result<ObjectHolder, RuntimeError> {
    let (first, rest) = ids.split_first().expect("dotted path is never empty");
    let mut value = closure
        .get(first)
        .cloned()
        .ok_or_else(|| RuntimeError::UnknownVariable(first.clone()))?;
    for id in rest {
        value = match value.with_fields(|fields| fields.get(id).cloned()) {
            None => return Err(RuntimeError::NotAnInstance(id.clone())),
            Some(None) => return Err(RuntimeError::UnknownVariable(id.clone())),
            Some(Some(field)) => field,
        };
    }
    Ok(value)
}
