//! Runtime values and object semantics.
//!
//! Everything the evaluator manipulates is an [`ObjectHolder`]: a handle
//! that either refers to a shared [`Object`] or is empty (Mython's `None`).
//! Class instances have reference identity; cloning a holder shares the
//! underlying instance, which is how `self` and a fresh instance end up
//! naming the same object.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::prelude::*;
use std::rc::Rc;

use crate::ast::Stmt;

/// An identifier-to-value mapping representing one scope: the top-level
/// scope, a method call frame, or an instance's field map.
pub type Closure = HashMap<String, ObjectHolder>;

/// A runtime value.  The absent value has no variant here: it is an empty
/// [`ObjectHolder`].
#[derive(Debug, PartialEq)]
pub enum Object {
    Number(i64),
    String(String),
    Bool(bool),
    Class(Rc<Class>),
    Instance(ClassInstance),
}

/// A polymorphic handle to a value.
///
/// Holders created by [`ObjectHolder::own`] allocate a fresh shared cell;
/// cloning any holder afterwards yields another reference to the same
/// value.  Reference cycles built through instance fields are possible and
/// are not reclaimed; scopes are torn down wholesale when programs end.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ObjectHolder(Option<Rc<RefCell<Object>>>);

impl ObjectHolder {
    /// Wraps a freshly created value.
    pub fn own(object: Object) -> ObjectHolder {
        ObjectHolder(Some(Rc::new(RefCell::new(object))))
    }

    /// The empty holder, Mython's `None`.
    pub fn none() -> ObjectHolder {
        ObjectHolder(None)
    }

    pub fn object(&self) -> Option<&Rc<RefCell<Object>>> {
        self.0.as_ref()
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// The wrapped integer, if the holder refers to a number.
    pub fn as_number(&self) -> Option<i64> {
        match self.object() {
            Some(obj) => match &*obj.borrow() {
                Object::Number(n) => Some(*n),
                _ => None,
            },
            None => None,
        }
    }

    /// Class of the referenced instance, if the holder refers to one.
    pub fn instance_class(&self) -> Option<Rc<Class>> {
        match self.object() {
            Some(obj) => match &*obj.borrow() {
                Object::Instance(instance) => Some(instance.class().clone()),
                _ => None,
            },
            None => None,
        }
    }

    /// Runs `f` over the referenced instance's field map.
    ///
    /// Returns `None` when the holder does not refer to a class instance.
    pub fn with_fields<T>(&self, f: impl FnOnce(&Closure) -> T) -> Option<T> {
        match self.object() {
            Some(obj) => match &*obj.borrow() {
                Object::Instance(instance) => Some(f(instance.fields())),
                _ => None,
            },
            None => None,
        }
    }

    /// Like [`ObjectHolder::with_fields`], with mutable access.
    pub fn with_fields_mut<T>(&self, f: impl FnOnce(&mut Closure) -> T) -> Option<T> {
        match self.object() {
            Some(obj) => match &mut *obj.borrow_mut() {
                Object::Instance(instance) => Some(f(instance.fields_mut())),
                _ => None,
            },
            None => None,
        }
    }
}

/// Truthiness: `True`, a non-zero number or a non-empty string.  Classes,
/// instances and the empty holder are all false; there is no method hook.
pub fn is_true(object: &ObjectHolder) -> bool {
    match object.object() {
        Some(obj) => match &*obj.borrow() {
            Object::Bool(b) => *b,
            Object::Number(n) => *n != 0,
            Object::String(s) => !s.is_empty(),
            Object::Class(_) | Object::Instance(_) => false,
        },
        None => false,
    }
}

/// A user-defined class: a name, methods in declaration order, and an
/// optional parent.  Classes are immutable once built and shared via `Rc`.
#[derive(Debug, PartialEq)]
pub struct Class {
    name: String,
    methods: Vec<Method>,
    parent: Option<Rc<Class>>,
}

impl Class {
    pub fn new(name: String, methods: Vec<Method>, parent: Option<Rc<Class>>) -> Class {
        Class {
            name,
            methods,
            parent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First method named `name`, walking the inheritance chain.
    ///
    /// Lookup stops at the first name match: an override with a different
    /// parameter count still hides the parent's method.
    pub fn method(&self, name: &str) -> Option<&Method> {
        match self.methods.iter().find(|m| m.name == name) {
            Some(method) => Some(method),
            None => self.parent.as_deref().and_then(|parent| parent.method(name)),
        }
    }

    /// True iff lookup finds `name` and its parameter count is `arity`.
    pub fn has_method(&self, name: &str, arity: usize) -> bool {
        self.method(name)
            .map_or(false, |m| m.formal_params.len() == arity)
    }
}

#[derive(Debug, PartialEq)]
pub struct Method {
    pub name: String,
    pub formal_params: Vec<String>,
    /// The parser wraps each body so that a `return` unwinds exactly here.
    pub body: Stmt,
}

/// A class instance: a reference to its class plus its field map.
#[derive(Debug, PartialEq)]
pub struct ClassInstance {
    class: Rc<Class>,
    fields: Closure,
}

impl ClassInstance {
    pub fn new(class: Rc<Class>) -> ClassInstance {
        ClassInstance {
            class,
            fields: Closure::new(),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    pub fn fields(&self) -> &Closure {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Closure {
        &mut self.fields
    }
}

/// Execution environment carrying the output sink.
#[derive(Debug)]
pub struct Context<'a, W: Write> {
    output: &'a mut W,
}

impl<'a, W: Write> Context<'a, W> {
    pub fn new(output: &'a mut W) -> Context<'a, W> {
        Context { output }
    }

    pub fn output_stream(&mut self) -> &mut W {
        self.output
    }
}
