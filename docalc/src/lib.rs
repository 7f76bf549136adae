pub use debounce::{Debouncer, DEBOUNCE_DELAY};
pub use engine::{
    eval_unit, Calculation, Calculator, EngineSink, LineResults, Outcome, Recalculation,
};
pub use error::{Error, Result};
pub use eval::{Builtin, Evaluator, Flow};
pub use fmt::{format_float, format_value, DEFAULT_PRECISION};
pub use lex::{lex, Kw, Op, Par, Token, TokenT};
pub use namespace::{Bindings, Namespace, Var, VarStore};
pub use parse::{
    parse_block, parse_expr, parse_line, BinOp, Block, Expr, LineStmt, LogicOp, Stmt, UnOp,
};
pub use segment::{segment, Unit, UnitKind};
pub use span::Span;
pub use value::{Func, Module, Value};

mod debounce;
mod engine;
mod error;
mod eval;
mod fmt;
mod lex;
mod namespace;
mod parse;
mod segment;
mod span;
mod value;

/// Evaluates a whole document with default settings.
pub fn recalculate(input: &str) -> Recalculation {
    Calculator::new().recalculate(input)
}
