//! Expression AST and error types for recovery formulas.
//!
//! A formula is a small arithmetic expression over a character's stats,
//! e.g. `me.luk * 2` or `if hp < mhp / 4 then mhp / 2 else 10`. There is
//! no assignment, no looping and no access to anything but the fixed stat
//! set, so a formula can always be evaluated without side effects.

use std::fmt;

/// Binary operators supported in formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
    Neq,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Gt => ">",
            BinOp::Lt => "<",
            BinOp::Gte => ">=",
            BinOp::Lte => "<=",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal (e.g., 0.25)
    Literal(f64),
    /// A stat reference with any `me.` prefix stripped (e.g., "luk")
    Param(String),
    /// A binary operation (e.g., left + right)
    BinOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// A unary operation (e.g., -x, !condition)
    UnaryOp { op: UnaryOp, operand: Box<Expr> },
    /// if condition then true_expr else false_expr
    Conditional {
        condition: Box<Expr>,
        true_expr: Box<Expr>,
        false_expr: Box<Expr>,
    },
    /// A function call (e.g., min(a, b))
    Function { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn param(name: &str) -> Self {
        Expr::Param(name.to_string())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Param(name) => write!(f, "{}", name),
            Expr::BinOp { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::UnaryOp { op, operand } => match op {
                UnaryOp::Neg => write!(f, "-{}", operand),
                UnaryOp::Not => write!(f, "!{}", operand),
            },
            Expr::Conditional {
                condition,
                true_expr,
                false_expr,
            } => write!(
                f,
                "(if {} then {} else {})",
                condition, true_expr, false_expr
            ),
            Expr::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Error type for formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Referenced a stat that doesn't exist
    UnknownParam(String),
    /// Called a function that doesn't exist
    UnknownFunction(String),
    /// Divided (or took a remainder) by zero
    DivisionByZero,
    /// Function called with wrong number of arguments
    InvalidArgCount {
        func: String,
        expected: usize,
        got: usize,
    },
    /// Result was NaN or infinite
    NonFinite,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnknownParam(name) => write!(f, "Unknown parameter: {}", name),
            EvalError::UnknownFunction(name) => write!(f, "Unknown function: {}", name),
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::InvalidArgCount {
                func,
                expected,
                got,
            } => write!(f, "Function {} expected {} args, got {}", func, expected, got),
            EvalError::NonFinite => write!(f, "Result is not a finite number"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Error type for formula parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Either stage of turning formula text into a number
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaError {
    Parse(ParseError),
    Eval(EvalError),
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaError::Parse(e) => write!(f, "{}", e),
            FormulaError::Eval(e) => write!(f, "Evaluation error: {}", e),
        }
    }
}

impl std::error::Error for FormulaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormulaError::Parse(e) => Some(e),
            FormulaError::Eval(e) => Some(e),
        }
    }
}

impl From<ParseError> for FormulaError {
    fn from(e: ParseError) -> Self {
        FormulaError::Parse(e)
    }
}

impl From<EvalError> for FormulaError {
    fn from(e: EvalError) -> Self {
        FormulaError::Eval(e)
    }
}
