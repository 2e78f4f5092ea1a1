//! Native words. The table is fixed at compile time; a declaration can shadow
//! a name inside its frame but never removes it from here.

use tracing::debug;

use crate::{
    diagnostics::{Diagnostic, Result},
    environment::FrameId,
    runtime::Interpreter,
    value::{Value, ValueKind},
};

type Callback = fn(&mut Interpreter, FrameId) -> Result<()>;

pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    callback: Callback,
}

impl Builtin {
    const fn new(name: &'static str, arity: usize, callback: Callback) -> Self {
        Self {
            name,
            arity,
            callback,
        }
    }

    /// Checks the stack holds `arity` values, then runs the word.
    pub fn call(&self, interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
        let depth = interpreter.stack_of(frame).len();
        if depth < self.arity {
            return Err(Diagnostic::runtime(format!(
                "Expected {} items on stack but got {depth}",
                self.arity
            ))
            .with_note(format!("while calling `{}`", self.name))
            .into());
        }
        debug!(word = self.name, frame, depth, "calling builtin");
        (self.callback)(interpreter, frame)
    }
}

pub static BUILTINS: [Builtin; 13] = [
    Builtin::new("+", 2, add),
    Builtin::new("-", 2, sub),
    Builtin::new("*", 2, mul),
    Builtin::new("/", 2, div),
    Builtin::new("%", 2, rem),
    Builtin::new("dup", 1, dup),
    Builtin::new("swap", 2, swap),
    Builtin::new("rot", 3, rot),
    Builtin::new("drop", 1, drop_top),
    Builtin::new("\\", 1, run_quotation),
    Builtin::new("stack", 0, print_stack),
    Builtin::new(".", 1, print_top),
    Builtin::new("clear", 0, clear),
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Arith {
    fn symbol(self) -> &'static str {
        match self {
            Arith::Add => "+",
            Arith::Sub => "-",
            Arith::Mul => "*",
            Arith::Div => "/",
            Arith::Rem => "%",
        }
    }
}

fn add(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    binary(interpreter, frame, Arith::Add)
}

fn sub(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    binary(interpreter, frame, Arith::Sub)
}

fn mul(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    binary(interpreter, frame, Arith::Mul)
}

fn div(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    binary(interpreter, frame, Arith::Div)
}

fn rem(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    binary(interpreter, frame, Arith::Rem)
}

/// `b a OP` computes `b OP a`. The operands stay on the stack if the
/// operation fails.
fn binary(interpreter: &mut Interpreter, frame: FrameId, op: Arith) -> Result<()> {
    let stack = interpreter.stack_mut(frame);
    let len = stack.len();
    let result = arithmetic(op, &stack[len - 2], &stack[len - 1])?;
    stack.truncate(len - 2);
    stack.push(result);
    Ok(())
}

fn arithmetic(op: Arith, left: &Value, right: &Value) -> std::result::Result<Value, Diagnostic> {
    match (left.kind(), right.kind()) {
        (ValueKind::Int(l), ValueKind::Int(r)) => int_arithmetic(op, *l, *r),
        (ValueKind::Int(_) | ValueKind::Float(_), ValueKind::Int(_) | ValueKind::Float(_)) => {
            float_arithmetic(op, to_f64(left), to_f64(right))
        }
        (ValueKind::String(l), ValueKind::String(r)) if op == Arith::Add => {
            Ok(Value::string(format!("{l}{r}")))
        }
        (ValueKind::Sequence(l), ValueKind::Sequence(r)) if op == Arith::Add => {
            Ok(Value::sequence(l.iter().chain(r).cloned().collect()))
        }
        _ => Err(Diagnostic::runtime(format!(
            "unsupported operand types for {}: {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn to_f64(value: &Value) -> f64 {
    match value.kind() {
        ValueKind::Int(n) => *n as f64,
        ValueKind::Float(n) => *n,
        _ => f64::NAN,
    }
}

fn int_arithmetic(op: Arith, l: i64, r: i64) -> std::result::Result<Value, Diagnostic> {
    if matches!(op, Arith::Div | Arith::Rem) && r == 0 {
        return Err(division_by_zero(op));
    }
    let result = match op {
        Arith::Add => l.checked_add(r),
        Arith::Sub => l.checked_sub(r),
        Arith::Mul => l.checked_mul(r),
        Arith::Div => match l.checked_rem(r) {
            Some(0) => l.checked_div(r),
            Some(_) => return Ok(Value::float(l as f64 / r as f64)),
            None => None,
        },
        Arith::Rem => l.checked_rem(r).map(|m| floor_adjust(m, r)),
    };
    result.map(Value::int).ok_or_else(|| {
        Diagnostic::runtime(format!("integer overflow in {l} {r} {}", op.symbol()))
    })
}

fn floor_adjust(m: i64, divisor: i64) -> i64 {
    if m != 0 && (m < 0) != (divisor < 0) {
        m + divisor
    } else {
        m
    }
}

fn float_arithmetic(op: Arith, l: f64, r: f64) -> std::result::Result<Value, Diagnostic> {
    if matches!(op, Arith::Div | Arith::Rem) && r == 0.0 {
        return Err(division_by_zero(op));
    }
    let result = match op {
        Arith::Add => l + r,
        Arith::Sub => l - r,
        Arith::Mul => l * r,
        Arith::Div => l / r,
        Arith::Rem => {
            let m = l % r;
            if m != 0.0 && (m < 0.0) != (r < 0.0) {
                m + r
            } else {
                m
            }
        }
    };
    Ok(Value::float(result))
}

fn division_by_zero(op: Arith) -> Diagnostic {
    let what = if op == Arith::Div { "division" } else { "modulo" };
    Diagnostic::runtime(format!("{what} by zero"))
}

fn dup(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    let stack = interpreter.stack_mut(frame);
    if let Some(top) = stack.last().cloned() {
        stack.push(top);
    }
    Ok(())
}

fn swap(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    let stack = interpreter.stack_mut(frame);
    let len = stack.len();
    stack.swap(len - 1, len - 2);
    Ok(())
}

/// `c b a` becomes `b a c`.
fn rot(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    let stack = interpreter.stack_mut(frame);
    let len = stack.len();
    stack[len - 3..].rotate_left(1);
    Ok(())
}

fn drop_top(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    interpreter.stack_mut(frame).pop();
    Ok(())
}

fn run_quotation(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    let expr = match interpreter.stack_of(frame).last() {
        Some(top) => match top.as_quotation() {
            Some(expr) => expr.clone(),
            None => {
                return Err(Diagnostic::runtime(format!(
                    "Expected quotation but got {}",
                    top.type_name()
                ))
                .into());
            }
        },
        None => return Ok(()),
    };
    interpreter.stack_mut(frame).pop();
    interpreter.eval_expr(frame, &expr)
}

fn print_stack(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    interpreter.print_stack(frame)
}

fn print_top(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    interpreter.print_top(frame)
}

fn clear(interpreter: &mut Interpreter, frame: FrameId) -> Result<()> {
    interpreter.stack_mut(frame).clear();
    Ok(())
}
