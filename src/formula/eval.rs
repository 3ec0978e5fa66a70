//! Formula evaluation against a character's stats

use std::fmt;

use super::expression::{BinOp, EvalError, Expr, FormulaError, ParseError, UnaryOp};

/// The stats a formula may read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Level,
    Hp,
    Mp,
    MaxHp,
    MaxMp,
    Attack,
    Defense,
    MagicAttack,
    MagicDefense,
    Agility,
    Luck,
}

impl Stat {
    pub const ALL: [Stat; 11] = [
        Stat::Level,
        Stat::Hp,
        Stat::Mp,
        Stat::MaxHp,
        Stat::MaxMp,
        Stat::Attack,
        Stat::Defense,
        Stat::MagicAttack,
        Stat::MagicDefense,
        Stat::Agility,
        Stat::Luck,
    ];

    /// Name used in formula text
    pub fn name(self) -> &'static str {
        match self {
            Stat::Level => "level",
            Stat::Hp => "hp",
            Stat::Mp => "mp",
            Stat::MaxHp => "mhp",
            Stat::MaxMp => "mmp",
            Stat::Attack => "atk",
            Stat::Defense => "def",
            Stat::MagicAttack => "mat",
            Stat::MagicDefense => "mdf",
            Stat::Agility => "agi",
            Stat::Luck => "luk",
        }
    }

    pub fn from_name(name: &str) -> Option<Stat> {
        Stat::ALL.into_iter().find(|stat| stat.name() == name)
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything a formula can read stats from
pub trait StatSource {
    fn stat(&self, stat: Stat) -> f64;
}

/// Built-in functions and their arity
const FUNCTIONS: [(&str, usize); 7] = [
    ("min", 2),
    ("max", 2),
    ("abs", 1),
    ("floor", 1),
    ("ceil", 1),
    ("round", 1),
    ("clamp", 3),
];

fn function_arity(name: &str) -> Option<usize> {
    FUNCTIONS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, arity)| *arity)
}

fn truthy(value: f64) -> bool {
    value != 0.0
}

fn from_bool(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl Expr {
    /// Check every stat name and function call without evaluating
    pub fn check_names(&self) -> Result<(), EvalError> {
        match self {
            Expr::Literal(_) => Ok(()),
            Expr::Param(name) => Stat::from_name(name)
                .map(|_| ())
                .ok_or_else(|| EvalError::UnknownParam(name.clone())),
            Expr::BinOp { left, right, .. } => {
                left.check_names()?;
                right.check_names()
            }
            Expr::UnaryOp { operand, .. } => operand.check_names(),
            Expr::Conditional {
                condition,
                true_expr,
                false_expr,
            } => {
                condition.check_names()?;
                true_expr.check_names()?;
                false_expr.check_names()
            }
            Expr::Function { name, args } => {
                let expected = function_arity(name)
                    .ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;
                if args.len() != expected {
                    return Err(EvalError::InvalidArgCount {
                        func: name.clone(),
                        expected,
                        got: args.len(),
                    });
                }
                args.iter().try_for_each(Expr::check_names)
            }
        }
    }

    /// Evaluate against a stat source
    pub fn evaluate<S: StatSource + ?Sized>(&self, stats: &S) -> Result<f64, EvalError> {
        match self {
            Expr::Literal(value) => Ok(*value),
            Expr::Param(name) => Stat::from_name(name)
                .map(|stat| stats.stat(stat))
                .ok_or_else(|| EvalError::UnknownParam(name.clone())),
            Expr::BinOp { op, left, right } => eval_binary(*op, left, right, stats),
            Expr::UnaryOp { op, operand } => {
                let value = operand.evaluate(stats)?;
                Ok(match op {
                    UnaryOp::Neg => -value,
                    UnaryOp::Not => from_bool(!truthy(value)),
                })
            }
            Expr::Conditional {
                condition,
                true_expr,
                false_expr,
            } => {
                if truthy(condition.evaluate(stats)?) {
                    true_expr.evaluate(stats)
                } else {
                    false_expr.evaluate(stats)
                }
            }
            Expr::Function { name, args } => eval_function(name, args, stats),
        }
    }
}

fn eval_binary<S: StatSource + ?Sized>(
    op: BinOp,
    left: &Expr,
    right: &Expr,
    stats: &S,
) -> Result<f64, EvalError> {
    let l = left.evaluate(stats)?;

    // Short-circuit before touching the right-hand side
    match op {
        BinOp::And if !truthy(l) => return Ok(0.0),
        BinOp::Or if truthy(l) => return Ok(1.0),
        _ => {}
    }

    let r = right.evaluate(stats)?;
    let value = match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            l / r
        }
        BinOp::Mod => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            l % r
        }
        BinOp::Gt => from_bool(l > r),
        BinOp::Lt => from_bool(l < r),
        BinOp::Gte => from_bool(l >= r),
        BinOp::Lte => from_bool(l <= r),
        BinOp::Eq => from_bool(l == r),
        BinOp::Neq => from_bool(l != r),
        BinOp::And | BinOp::Or => from_bool(truthy(r)),
    };
    Ok(value)
}

fn eval_function<S: StatSource + ?Sized>(
    name: &str,
    args: &[Expr],
    stats: &S,
) -> Result<f64, EvalError> {
    let expected = function_arity(name).ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
    if args.len() != expected {
        return Err(EvalError::InvalidArgCount {
            func: name.to_string(),
            expected,
            got: args.len(),
        });
    }

    let values = args
        .iter()
        .map(|arg| arg.evaluate(stats))
        .collect::<Result<Vec<f64>, EvalError>>()?;

    let value = match name {
        "min" => values[0].min(values[1]),
        "max" => values[0].max(values[1]),
        "abs" => values[0].abs(),
        "floor" => values[0].floor(),
        "ceil" => values[0].ceil(),
        "round" => values[0].round(),
        "clamp" => {
            // Tolerate reversed bounds instead of panicking like f64::clamp
            let (lo, hi) = if values[1] <= values[2] {
                (values[1], values[2])
            } else {
                (values[2], values[1])
            };
            values[0].max(lo).min(hi)
        }
        other => return Err(EvalError::UnknownFunction(other.to_string())),
    };
    Ok(value)
}

/// A parsed, name-checked formula
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parse and check a formula
    pub fn parse(source: &str) -> Result<Formula, FormulaError> {
        let expr = Expr::parse(source)?;
        expr.check_names()
            .map_err(|e| ParseError::new(e.to_string()))?;
        Ok(Formula {
            source: source.trim().to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate; NaN and infinities are errors
    pub fn evaluate<S: StatSource + ?Sized>(&self, stats: &S) -> Result<f64, EvalError> {
        let value = self.expr.evaluate(stats)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NonFinite)
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse and evaluate formula text in one step
pub fn evaluate_str<S: StatSource + ?Sized>(source: &str, stats: &S) -> Result<f64, FormulaError> {
    let formula = Formula::parse(source)?;
    Ok(formula.evaluate(stats)?)
}
