use std::{fmt, rc::Rc};

use crate::diagnostics::SourceSpan;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(n) => write_float(f, *n),
            Literal::String(s) => write_quoted(f, s),
        }
    }
}

/// Writes a float in positional notation, always with a fractional part, so
/// lexed literals read back unchanged.
pub(crate) fn write_float(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    let text = n.to_string();
    if n.is_finite() && !text.contains('.') {
        write!(f, "{text}.0")
    } else {
        write!(f, "{text}")
    }
}

/// Writes `text` as a double-quoted literal the lexer reads back unchanged.
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    write!(f, "\"")?;
    for ch in text.chars() {
        match ch {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtomKind {
    Literal(Literal),
    Identifier(String),
    /// `[ ... ]`: pushed as a value, run only by `\`.
    Quotation(Rc<Expr>),
    /// `{ ... }`: run at once in a child frame, collapsed into one sequence.
    ListBlock(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub kind: AtomKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub atoms: Vec<Atom>,
    pub span: SourceSpan,
}

impl Expr {
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

/// `name := expr`. The expression stays unevaluated; every reference runs it again.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub name: Identifier,
    pub expr: Rc<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Decl(Decl),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AtomKind::Literal(lit) => write!(f, "{lit}"),
            AtomKind::Identifier(name) => write!(f, "{name}"),
            AtomKind::Quotation(expr) => write!(f, "[{expr}]"),
            AtomKind::ListBlock(expr) => write!(f, "{{{expr}}}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, atom) in self.atoms.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{atom}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::Decl(decl) => write!(f, "{} := {}", decl.name.name, decl.expr),
            StmtKind::Expr(expr) => write!(f, "{expr}"),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, stmt) in self.statements.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}
