//! nom grammar for recovery formulas.
//!
//! Precedence, loosest first:
//! `||`, `&&`, comparisons, `+ -`, `* / %`, unary `- !`, then primaries
//! (numbers, parentheses, `if .. then .. else ..`, calls, stat names).
//! Binary operators are left-associative.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, satisfy};
use nom::combinator::{all_consuming, cut, map, map_res, not, opt, recognize, value, verify};
use nom::multi::{fold_many0, many0_count, separated_list0};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{IResult, Parser};

use super::expression::{BinOp, Expr, ParseError, UnaryOp};

/// Longest formula source accepted, in bytes
pub const MAX_FORMULA_LEN: usize = 256;

/// Deepest parenthesis nesting accepted
pub const MAX_NESTING: usize = 32;

/// Words reserved by the grammar; never stat or function names
const KEYWORDS: [&str; 3] = ["if", "then", "else"];

type Res<'a, T> = IResult<&'a str, T>;
type NomError<'a> = nom::error::Error<&'a str>;

impl Expr {
    /// Parse formula text into an AST
    ///
    /// Names are not resolved here; `Formula::parse` does that.
    pub fn parse(source: &str) -> Result<Expr, ParseError> {
        check_limits(source)?;

        match all_consuming(ws(expr)).parse(source) {
            Ok((_, parsed)) => Ok(parsed),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                Err(ParseError::new(describe(source, e.input)))
            }
            Err(nom::Err::Incomplete(_)) => Err(ParseError::new("incomplete formula")),
        }
    }
}

fn check_limits(source: &str) -> Result<(), ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError::new("empty formula"));
    }
    if source.len() > MAX_FORMULA_LEN {
        return Err(ParseError::new(format!(
            "formula is {} bytes, limit is {}",
            source.len(),
            MAX_FORMULA_LEN
        )));
    }

    let mut depth = 0usize;
    for c in source.chars() {
        match c {
            '(' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(ParseError::new(format!(
                        "parentheses nested deeper than {}",
                        MAX_NESTING
                    )));
                }
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn describe(source: &str, rest: &str) -> String {
    if rest.trim().is_empty() {
        return "unexpected end of formula".to_string();
    }
    let offset = source.len() - rest.len();
    let snippet: String = rest.chars().take(16).collect();
    format!("unexpected {:?} at offset {}", snippet, offset)
}

fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = NomError<'a>>
where
    P: Parser<&'a str, Output = O, Error = NomError<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn keyword<'a>(kw: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = NomError<'a>> {
    ws(terminated(tag(kw), not(satisfy(is_ident_char))))
}

fn expr(input: &str) -> Res<'_, Expr> {
    or_expr(input)
}

fn or_expr(input: &str) -> Res<'_, Expr> {
    let (input, first) = and_expr(input)?;
    fold_many0(
        preceded(tag("||"), and_expr),
        move || first.clone(),
        |left, right| Expr::binary(BinOp::Or, left, right),
    )
    .parse(input)
}

fn and_expr(input: &str) -> Res<'_, Expr> {
    let (input, first) = comparison(input)?;
    fold_many0(
        preceded(tag("&&"), comparison),
        move || first.clone(),
        |left, right| Expr::binary(BinOp::And, left, right),
    )
    .parse(input)
}

fn comparison(input: &str) -> Res<'_, Expr> {
    let (input, first) = additive(input)?;
    fold_many0(
        pair(
            alt((
                value(BinOp::Gte, tag(">=")),
                value(BinOp::Lte, tag("<=")),
                value(BinOp::Eq, tag("==")),
                value(BinOp::Neq, tag("!=")),
                value(BinOp::Gt, char('>')),
                value(BinOp::Lt, char('<')),
            )),
            additive,
        ),
        move || first.clone(),
        |left, (op, right)| Expr::binary(op, left, right),
    )
    .parse(input)
}

fn additive(input: &str) -> Res<'_, Expr> {
    let (input, first) = multiplicative(input)?;
    fold_many0(
        pair(
            alt((value(BinOp::Add, char('+')), value(BinOp::Sub, char('-')))),
            multiplicative,
        ),
        move || first.clone(),
        |left, (op, right)| Expr::binary(op, left, right),
    )
    .parse(input)
}

fn multiplicative(input: &str) -> Res<'_, Expr> {
    let (input, first) = unary(input)?;
    fold_many0(
        pair(
            alt((
                value(BinOp::Mul, char('*')),
                value(BinOp::Div, char('/')),
                value(BinOp::Mod, char('%')),
            )),
            unary,
        ),
        move || first.clone(),
        |left, (op, right)| Expr::binary(op, left, right),
    )
    .parse(input)
}

fn unary(input: &str) -> Res<'_, Expr> {
    alt((
        map(preceded(ws(char('-')), unary), |operand| {
            Expr::unary(UnaryOp::Neg, operand)
        }),
        map(preceded(ws(char('!')), unary), |operand| {
            Expr::unary(UnaryOp::Not, operand)
        }),
        primary,
    ))
    .parse(input)
}

fn primary(input: &str) -> Res<'_, Expr> {
    ws(alt((number, parens, conditional, call, param))).parse(input)
}

fn number(input: &str) -> Res<'_, Expr> {
    map_res(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        |text: &str| text.parse::<f64>().map(Expr::Literal),
    )
    .parse(input)
}

fn parens(input: &str) -> Res<'_, Expr> {
    delimited(char('('), expr, char(')')).parse(input)
}

fn conditional(input: &str) -> Res<'_, Expr> {
    // Once `if` has matched, no other alternative can succeed: fail hard
    // instead of letting `alt` retry the rest of the input.
    map(
        preceded(
            keyword("if"),
            cut((
                expr,
                preceded(keyword("then"), expr),
                preceded(keyword("else"), expr),
            )),
        ),
        |(condition, true_expr, false_expr)| Expr::Conditional {
            condition: Box::new(condition),
            true_expr: Box::new(true_expr),
            false_expr: Box::new(false_expr),
        },
    )
    .parse(input)
}

fn call(input: &str) -> Res<'_, Expr> {
    map(
        pair(
            identifier,
            delimited(ws(char('(')), separated_list0(char(','), expr), char(')')),
        ),
        |(name, args)| Expr::Function {
            name: name.to_string(),
            args,
        },
    )
    .parse(input)
}

fn param(input: &str) -> Res<'_, Expr> {
    map(preceded(opt(tag("me.")), identifier), Expr::param).parse(input)
}

fn identifier(input: &str) -> Res<'_, &str> {
    verify(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_")))),
        )),
        |name: &str| !KEYWORDS.contains(&name),
    )
    .parse(input)
}
