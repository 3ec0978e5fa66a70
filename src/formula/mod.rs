//! Sandboxed stat formulas for heal amounts

pub mod eval;
pub mod expression;
mod parser;

pub use eval::{evaluate_str, Formula, Stat, StatSource};
pub use expression::{BinOp, EvalError, Expr, FormulaError, ParseError, UnaryOp};
pub use parser::{MAX_FORMULA_LEN, MAX_NESTING};
