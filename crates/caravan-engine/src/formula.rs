//! Change formulas.
//!
//! Formulas are small arithmetic expressions evaluated against roll data:
//! numbers, `@dotted.path` references, `+ - * /`, parentheses, and a
//! handful of functions (`if`, comparisons, `max`, `min`, rounding).
//! Bracketed flavor text such as `-2[Mutiny]` is ignored.

use std::fmt;
use std::ops::Range;

use logos::Logos;
use serde_json::Value;

use crate::error::{EngineError, EngineResult};

/// Values a formula can reference with `@path`.
pub trait RollData {
    /// The numeric value at a dotted path, if present.
    fn lookup(&self, path: &str) -> Option<f64>;
}

impl RollData for Value {
    fn lookup(&self, path: &str) -> Option<f64> {
        let mut current = self;
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        match current {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

/// A formula token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal.
    Number(f64),
    /// `@path` reference, without the `@`.
    Reference(String),
    /// Function name.
    Ident(String),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Reference(r) => write!(f, "@{r}"),
            Token::Ident(i) => write!(f, "{i}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"\[[^\]]*\]")]
enum RawToken {
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r"@[A-Za-z_][A-Za-z0-9_.]*")]
    Reference,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,
}

fn formula_error(source: &str, message: impl Into<String>) -> EngineError {
    EngineError::Formula {
        formula: source.to_string(),
        message: message.into(),
    }
}

/// Lex a formula into tokens with their byte spans.
pub fn lex(source: &str) -> EngineResult<Vec<(Token, Range<usize>)>> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let slice = lexer.slice();
        let token = match result {
            Ok(RawToken::Number) => Token::Number(
                slice
                    .parse()
                    .map_err(|_| formula_error(source, format!("invalid number {slice}")))?,
            ),
            Ok(RawToken::Reference) => {
                Token::Reference(slice.trim_start_matches('@').trim_end_matches('.').to_string())
            }
            Ok(RawToken::Ident) => Token::Ident(slice.to_string()),
            Ok(RawToken::Plus) => Token::Plus,
            Ok(RawToken::Minus) => Token::Minus,
            Ok(RawToken::Star) => Token::Star,
            Ok(RawToken::Slash) => Token::Slash,
            Ok(RawToken::LParen) => Token::LParen,
            Ok(RawToken::RParen) => Token::RParen,
            Ok(RawToken::Comma) => Token::Comma,
            Err(()) => {
                return Err(formula_error(
                    source,
                    format!("unexpected character {slice:?} at {}", span.start),
                ));
            }
        };
        tokens.push((token, span));
    }

    Ok(tokens)
}

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
}

/// Parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// Roll-data reference; missing values read as zero.
    Reference(String),
    /// Negation.
    Neg(Box<Expr>),
    /// Arithmetic.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Function call.
    Call(String, Vec<Expr>),
}

/// Deepest nesting of parentheses, calls, and signs a formula may use.
pub const MAX_NESTING: usize = 64;

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn enter(&mut self) -> EngineResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(formula_error(
                self.source,
                format!("nested deeper than {MAX_NESTING} levels"),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> EngineResult<()> {
        match self.advance() {
            Some(t) if t == expected => Ok(()),
            Some(t) => Err(formula_error(
                self.source,
                format!("expected `{expected}`, found `{t}`"),
            )),
            None => Err(formula_error(
                self.source,
                format!("expected `{expected}`, found end of formula"),
            )),
        }
    }

    fn expression(&mut self) -> EngineResult<Expr> {
        self.enter()?;
        let expr = self.sum();
        self.leave();
        expr
    }

    fn sum(&mut self) -> EngineResult<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> EngineResult<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> EngineResult<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.unary()?;
                self.leave();
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.unary()?;
                self.leave();
                Ok(inner)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> EngineResult<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Reference(path)) => Ok(Expr::Reference(path)),
            Some(Token::Ident(name)) => {
                self.expect(Token::LParen)?;
                let mut args = Vec::new();
                if self.peek() == Some(&Token::RParen) {
                    self.pos += 1;
                    return Ok(Expr::Call(name, args));
                }
                loop {
                    args.push(self.expression()?);
                    match self.advance() {
                        Some(Token::Comma) => continue,
                        Some(Token::RParen) => break,
                        _ => {
                            return Err(formula_error(
                                self.source,
                                format!("unclosed call to {name}"),
                            ));
                        }
                    }
                }
                Ok(Expr::Call(name, args))
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(t) => Err(formula_error(self.source, format!("unexpected `{t}`"))),
            None => Err(formula_error(self.source, "unexpected end of formula")),
        }
    }
}

fn arity(source: &str, name: &str, args: &[f64], min: usize, max: usize) -> EngineResult<()> {
    if args.len() < min || args.len() > max {
        return Err(formula_error(
            source,
            format!("{name} takes {min}..={max} arguments, got {}", args.len()),
        ));
    }
    Ok(())
}

fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn call(source: &str, name: &str, args: &[f64]) -> EngineResult<f64> {
    match name {
        "if" => {
            arity(source, name, args, 2, 3)?;
            Ok(if args[0] != 0.0 {
                args[1]
            } else {
                args.get(2).copied().unwrap_or(0.0)
            })
        }
        "gt" | "gte" | "lt" | "lte" | "eq" | "ne" => {
            arity(source, name, args, 2, 2)?;
            let (a, b) = (args[0], args[1]);
            Ok(truth(match name {
                "gt" => a > b,
                "gte" => a >= b,
                "lt" => a < b,
                "lte" => a <= b,
                "eq" => a == b,
                _ => a != b,
            }))
        }
        "max" | "min" => {
            arity(source, name, args, 1, usize::MAX)?;
            let fold: fn(f64, f64) -> f64 = if name == "max" { f64::max } else { f64::min };
            Ok(args[1..].iter().copied().fold(args[0], fold))
        }
        "floor" | "ceil" | "abs" | "round" => {
            arity(source, name, args, 1, 1)?;
            let x = args[0];
            Ok(match name {
                "floor" => x.floor(),
                "ceil" => x.ceil(),
                "abs" => x.abs(),
                _ => x.round(),
            })
        }
        other => Err(formula_error(source, format!("unknown function {other}"))),
    }
}

/// A parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parse formula text. Blank text parses as `0`.
    pub fn parse(source: &str) -> EngineResult<Self> {
        let tokens = lex(source)?;
        if tokens.is_empty() {
            return Ok(Self {
                source: source.to_string(),
                expr: Expr::Number(0.0),
            });
        }
        let mut parser = Parser {
            source,
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expression()?;
        if let Some(trailing) = parser.peek() {
            return Err(formula_error(source, format!("unexpected `{trailing}`")));
        }
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// The formula text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed expression.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Every `@path` the formula reads.
    pub fn references(&self) -> Vec<&str> {
        fn walk<'e>(expr: &'e Expr, out: &mut Vec<&'e str>) {
            match expr {
                Expr::Number(_) => {}
                Expr::Reference(path) => out.push(path),
                Expr::Neg(inner) => walk(inner, out),
                Expr::Binary(_, lhs, rhs) => {
                    walk(lhs, out);
                    walk(rhs, out);
                }
                Expr::Call(_, args) => args.iter().for_each(|a| walk(a, out)),
            }
        }
        let mut out = Vec::new();
        walk(&self.expr, &mut out);
        out
    }

    /// Evaluate against roll data.
    pub fn evaluate(&self, data: &dyn RollData) -> EngineResult<f64> {
        self.eval(&self.expr, data)
    }

    fn eval(&self, expr: &Expr, data: &dyn RollData) -> EngineResult<f64> {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::Reference(path) => Ok(data.lookup(path).unwrap_or(0.0)),
            Expr::Neg(inner) => Ok(-self.eval(inner, data)?),
            Expr::Binary(op, lhs, rhs) => {
                let a = self.eval(lhs, data)?;
                let b = self.eval(rhs, data)?;
                match op {
                    BinaryOp::Add => Ok(a + b),
                    BinaryOp::Sub => Ok(a - b),
                    BinaryOp::Mul => Ok(a * b),
                    BinaryOp::Div if b == 0.0 => {
                        Err(formula_error(&self.source, "division by zero"))
                    }
                    BinaryOp::Div => Ok(a / b),
                }
            }
            Expr::Call(name, args) => {
                let values = args
                    .iter()
                    .map(|a| self.eval(a, data))
                    .collect::<EngineResult<Vec<_>>>()?;
                call(&self.source, name, &values)
            }
        }
    }
}

/// Parse and evaluate a formula, truncating the result toward zero.
///
/// Results that are not finite or do not fit an `i64` are errors.
pub fn evaluate(source: &str, data: &dyn RollData) -> EngineResult<i64> {
    let value = Formula::parse(source)?.evaluate(data)?.trunc();
    if !value.is_finite() || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(formula_error(source, format!("result {value} is out of range")));
    }
    Ok(value as i64)
}
