use std::{fmt, rc::Rc};

use crate::ast::{write_float, write_quoted, Expr};

/// A runtime value. Cloning is cheap: `dup` shares the payload.
#[derive(Clone, PartialEq)]
pub struct Value(pub Rc<ValueKind>);

#[derive(Clone, PartialEq)]
pub enum ValueKind {
    Int(i64),
    Float(f64),
    String(String),
    /// Deferred code; the tree is shared with the program that produced it.
    Quotation(Rc<Expr>),
    /// The captured stack of a list block.
    Sequence(Vec<Value>),
}

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self(Rc::new(kind))
    }

    pub fn int(value: i64) -> Self {
        Self::new(ValueKind::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::new(ValueKind::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ValueKind::String(value.into()))
    }

    pub fn quotation(expr: Rc<Expr>) -> Self {
        Self::new(ValueKind::Quotation(expr))
    }

    pub fn sequence(values: Vec<Value>) -> Self {
        Self::new(ValueKind::Sequence(values))
    }

    pub fn kind(&self) -> &ValueKind {
        &self.0
    }

    pub fn type_name(&self) -> &'static str {
        match &*self.0 {
            ValueKind::Int(_) => "Int",
            ValueKind::Float(_) => "Float",
            ValueKind::String(_) => "String",
            ValueKind::Quotation(_) => "Quotation",
            ValueKind::Sequence(_) => "Sequence",
        }
    }

    pub fn as_quotation(&self) -> Option<&Rc<Expr>> {
        match &*self.0 {
            ValueKind::Quotation(expr) => Some(expr),
            _ => None,
        }
    }
}

/// Source-like form; strings are quoted. Used when printing a whole stack.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::String(s) => write_quoted(f, s),
            ValueKind::Sequence(values) => {
                write!(f, "{{")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{value:?}")?;
                }
                write!(f, "}}")
            }
            _ => write!(f, "{self}"),
        }
    }
}

/// Like `Debug`, except a top-level string prints bare.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Int(n) => write!(f, "{n}"),
            ValueKind::Float(n) => write_float(f, *n),
            ValueKind::String(s) => write!(f, "{s}"),
            ValueKind::Quotation(expr) => write!(f, "[{expr}]"),
            ValueKind::Sequence(_) => write!(f, "{self:?}"),
        }
    }
}

/// Renders a stack bottom to top as `[a, b, c]`.
pub struct StackDisplay<'a>(pub &'a [Value]);

impl fmt::Display for StackDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, value) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value:?}")?;
        }
        write!(f, "]")
    }
}
