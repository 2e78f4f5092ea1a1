//! A small stack-oriented scripting language.
//!
//! Source text goes through [`tokenize`], [`parse`] and [`evaluate`]; the
//! [`Interpreter`] keeps a root frame alive across sources the way an
//! interactive session would.
//!
//! ```
//! let stack = minilang::Interpreter::new().eval_source("3 4 +")?.to_vec();
//! assert_eq!(stack, vec![minilang::Value::int(7)]);
//! # Ok::<(), minilang::MinilangError>(())
//! ```

pub mod ast;
pub mod builtins;
pub mod diagnostics;
pub mod environment;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod value;

pub use diagnostics::{Diagnostic, DiagnosticKind, MinilangError, Result, SourceSpan};
pub use lexer::tokenize;
pub use parser::{parse, parse_program};
pub use runtime::{evaluate, Interpreter, RuntimeOptions};
pub use value::{Value, ValueKind};
