use std::{
    fmt,
    io::{self, Write},
    rc::Rc,
};

use tracing::{debug, trace, warn};

use crate::{
    ast::{Atom, AtomKind, Decl, Expr, Literal, Program, StmtKind},
    builtins,
    diagnostics::{Diagnostic, MinilangError, Result, SourceSpan},
    environment::{FrameId, Frames},
    parser,
    value::{StackDisplay, Value},
};

pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Ceiling on nested identifier resolutions and list blocks.
    pub max_recursion_depth: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

/// Evaluates `program` against a fresh root frame and returns its final stack.
pub fn evaluate(program: &Program) -> Result<Vec<Value>> {
    let mut interpreter = Interpreter::new();
    interpreter.eval_program(program)?;
    Ok(interpreter.into_stack())
}

/// Tree-walking evaluator over an explicit operand stack.
///
/// The root frame persists across calls, so names declared by one source are
/// visible to the next. A failing statement aborts its source; declarations
/// survive and the stack keeps whatever the statement had already done.
pub struct Interpreter {
    frames: Frames,
    options: RuntimeOptions,
    output: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_options(RuntimeOptions::default())
    }

    pub fn with_options(options: RuntimeOptions) -> Self {
        Self {
            frames: Frames::new(),
            options,
            output: Box::new(io::stdout()),
        }
    }

    /// Redirects what `stack` and `.` print.
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = output;
        self
    }

    pub fn eval_source(&mut self, source: &str) -> Result<&[Value]> {
        let program = parser::parse_program(source).map_err(MinilangError::from)?;
        self.eval_program(&program)
    }

    pub fn eval_program(&mut self, program: &Program) -> Result<&[Value]> {
        for stmt in &program.statements {
            let outcome = match &stmt.kind {
                StmtKind::Decl(decl) => {
                    self.declare(Frames::ROOT, decl);
                    Ok(())
                }
                StmtKind::Expr(expr) => self.eval_expr(Frames::ROOT, expr),
            };
            if let Err(err) = outcome {
                debug!(error = %err, "statement aborted");
                self.frames.unwind_to_root();
                return Err(err);
            }
        }
        Ok(self.stack())
    }

    /// The root frame's stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        &self.frames.get(Frames::ROOT).stack
    }

    pub fn into_stack(mut self) -> Vec<Value> {
        std::mem::take(&mut self.frames.get_mut(Frames::ROOT).stack)
    }

    /// Names declared at the root, in declaration order.
    pub fn declared_names(&self) -> Vec<&str> {
        self.frames.get(Frames::ROOT).names().collect()
    }

    pub(crate) fn stack_of(&self, frame: FrameId) -> &[Value] {
        &self.frames.get(frame).stack
    }

    pub(crate) fn stack_mut(&mut self, frame: FrameId) -> &mut Vec<Value> {
        &mut self.frames.get_mut(frame).stack
    }

    fn declare(&mut self, frame: FrameId, decl: &Decl) {
        debug!(name = %decl.name.name, frame, body = %decl.expr, "binding declaration");
        self.frames
            .define(frame, decl.name.name.clone(), Rc::clone(&decl.expr));
    }

    pub(crate) fn eval_expr(&mut self, frame: FrameId, expr: &Expr) -> Result<()> {
        for atom in &expr.atoms {
            self.eval_atom(frame, atom)?;
        }
        Ok(())
    }

    fn eval_atom(&mut self, frame: FrameId, atom: &Atom) -> Result<()> {
        match &atom.kind {
            AtomKind::Literal(lit) => {
                let value = literal(lit);
                self.stack_mut(frame).push(value);
                Ok(())
            }
            AtomKind::Identifier(name) => self.resolve(frame, name, atom.span),
            AtomKind::Quotation(expr) => {
                self.stack_mut(frame).push(Value::quotation(expr.clone()));
                Ok(())
            }
            AtomKind::ListBlock(expr) => self.eval_list_block(frame, expr, atom.span),
        }
    }

    /// Runs `expr` in a child frame one level deeper than `frame`.
    fn eval_list_block(&mut self, frame: FrameId, expr: &Expr, span: SourceSpan) -> Result<()> {
        let limit = self.options.max_recursion_depth;
        if self.frames.get(frame).depth >= limit {
            warn!(frame, limit, "list blocks nested past the ceiling");
            return Err(Diagnostic::runtime("Maximum recursion depth reached")
                .with_span(span)
                .with_note("while opening a list block")
                .into());
        }
        let child = self.frames.push_child(frame);
        debug!(parent = frame, child, "opened list frame");
        let outcome = self.eval_expr(child, expr);
        let finished = self.frames.pop_child();
        outcome?;
        let values = finished.map(|f| f.stack).unwrap_or_default();
        self.stack_mut(frame).push(Value::sequence(values));
        Ok(())
    }

    /// Local scope first, then builtins, then ancestor scopes. Whatever is
    /// found runs in `frame`, even when an ancestor supplied the code.
    fn resolve(&mut self, frame: FrameId, name: &str, span: SourceSpan) -> Result<()> {
        let limit = self.options.max_recursion_depth;
        let current = self.frames.get_mut(frame);
        if current.depth >= limit {
            current.depth = 0;
            warn!(name, frame, limit, "recursion ceiling reached");
            return Err(Diagnostic::runtime("Maximum recursion depth reached")
                .with_span(span)
                .with_note(format!("while resolving `{name}`"))
                .into());
        }
        current.depth += 1;
        trace!(name, frame, depth = current.depth, "resolving identifier");

        if let Some(expr) = self.frames.lookup_local(frame, name) {
            self.eval_expr(frame, &expr)?;
        } else if let Some(builtin) = builtins::lookup(name) {
            builtin.call(self, frame)?;
        } else if let Some(expr) = self.frames.lookup_ancestors(frame, name) {
            self.eval_expr(frame, &expr)?;
        } else {
            return Err(Diagnostic::runtime(format!("Unknown identifier {name}"))
                .with_span(span)
                .into());
        }

        let current = self.frames.get_mut(frame);
        current.depth = current.depth.saturating_sub(1);
        Ok(())
    }

    pub(crate) fn print_stack(&mut self, frame: FrameId) -> Result<()> {
        let line = StackDisplay(&self.frames.get(frame).stack).to_string();
        self.write_line(format_args!("{line}"))
    }

    pub(crate) fn print_top(&mut self, frame: FrameId) -> Result<()> {
        let line = match self.frames.get(frame).stack.last() {
            Some(top) => top.to_string(),
            None => return Ok(()),
        };
        self.write_line(format_args!("{line}"))
    }

    fn write_line(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        writeln!(self.output, "{args}")
            .and_then(|()| self.output.flush())
            .map_err(|err| Diagnostic::runtime(format!("failed to write output: {err}")).into())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn literal(literal: &Literal) -> Value {
    match literal {
        Literal::Int(n) => Value::int(*n),
        Literal::Float(n) => Value::float(*n),
        Literal::String(s) => Value::string(s.clone()),
    }
}
