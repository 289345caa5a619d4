//! Boolean filter expressions over review metadata.
//!
//! Grammar:
//!
//! ```text
//! expr       := and_expr ( "||" and_expr )*
//! and_expr   := primary ( "&&" primary )*
//! primary    := "(" expr ")" | comparison
//! comparison := field op literal
//! op         := "==" | "!=" | ">=" | "<=" | ">" | "<"
//! literal    := 'single-quoted string' | number | true | false
//! ```
//!
//! Inside a string literal, `\'` and `\\` escape a quote and a backslash.
//! String and boolean fields only support `==` and `!=`.

use crate::error::{ContrailError, Result};
use crate::reviews::ReviewMetadata;

/// A metadata field that can appear in a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DocumentId,
    AirlineName,
    OverallRating,
    ReviewTitle,
    SeatType,
    Route,
    Recommended,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "document_id" => Some(Field::DocumentId),
            "airline_name" => Some(Field::AirlineName),
            "overall_rating" => Some(Field::OverallRating),
            "review_title" => Some(Field::ReviewTitle),
            "seat_type" => Some(Field::SeatType),
            "route" => Some(Field::Route),
            "recommended" => Some(Field::Recommended),
            _ => None,
        }
    }

    fn text<'a>(&self, metadata: &'a ReviewMetadata) -> Option<&'a str> {
        match self {
            Field::DocumentId => Some(&metadata.document_id),
            Field::AirlineName => Some(&metadata.airline_name),
            Field::ReviewTitle => Some(&metadata.review_title),
            Field::SeatType => Some(&metadata.seat_type),
            Field::Route => Some(&metadata.route),
            Field::OverallRating | Field::Recommended => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl CompareOp {
    fn holds(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Eq => ordering == Equal,
            CompareOp::Ne => ordering != Equal,
            CompareOp::Ge => ordering != Less,
            CompareOp::Le => ordering != Greater,
            CompareOp::Gt => ordering == Greater,
            CompareOp::Lt => ordering == Less,
        }
    }

    fn is_equality(&self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Ne)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
}

/// Parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
    Compare {
        field: Field,
        op: CompareOp,
        value: Literal,
    },
}

impl FilterExpr {
    /// Evaluate the expression against a chunk's metadata.
    pub fn matches(&self, metadata: &ReviewMetadata) -> bool {
        match self {
            FilterExpr::And(a, b) => a.matches(metadata) && b.matches(metadata),
            FilterExpr::Or(a, b) => a.matches(metadata) || b.matches(metadata),
            FilterExpr::Compare { field, op, value } => match (field, value) {
                (Field::OverallRating, Literal::Num(n)) => metadata
                    .overall_rating
                    .partial_cmp(n)
                    .is_some_and(|ord| op.holds(ord)),
                (Field::Recommended, Literal::Bool(b)) => op.holds(metadata.recommended.cmp(b)),
                (field, Literal::Str(s)) => field
                    .text(metadata)
                    .is_some_and(|text| op.holds(text.cmp(s.as_str()))),
                _ => false,
            },
        }
    }
}

/// Parse a filter expression.
pub fn parse(input: &str) -> Result<FilterExpr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(invalid(format!("unexpected {:?} in '{}'", token, input)));
    }
    Ok(expr)
}

/// Quote a string for use as a filter literal.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

fn invalid(message: String) -> ContrailError {
    ContrailError::InvalidFilter(message)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Op(CompareOp),
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '&' | '|' => {
                chars.next();
                if chars.next() != Some(c) {
                    return Err(invalid(format!("expected '{}{}'", c, c)));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            '=' | '!' | '>' | '<' => {
                chars.next();
                let followed_by_eq = chars.peek() == Some(&'=');
                if followed_by_eq {
                    chars.next();
                }
                let op = match (c, followed_by_eq) {
                    ('=', true) => CompareOp::Eq,
                    ('!', true) => CompareOp::Ne,
                    ('>', true) => CompareOp::Ge,
                    ('<', true) => CompareOp::Le,
                    ('>', false) => CompareOp::Gt,
                    ('<', false) => CompareOp::Lt,
                    _ => return Err(invalid(format!("unknown operator near '{}'", c))),
                };
                tokens.push(Token::Op(op));
            }
            '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some(escaped) => value.push(escaped),
                            None => return Err(invalid("dangling escape".to_string())),
                        },
                        Some('\'') => break,
                        Some(other) => value.push(other),
                        None => return Err(invalid("unterminated string literal".to_string())),
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let mut number = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || matches!(d, '-' | '.' | 'e' | 'E' | '+') {
                        number.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = number
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("bad number '{}'", number)))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(invalid(format!("unexpected character '{}'", other))),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_or(&mut self) -> Result<FilterExpr> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.parse_and()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<FilterExpr> {
        let mut left = self.parse_primary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.parse_primary()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<FilterExpr> {
        match self.next() {
            Some(Token::LParen) => {
                let expr = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err(invalid("missing ')'".to_string())),
                }
            }
            Some(Token::Ident(name)) => self.parse_comparison(&name),
            Some(token) => Err(invalid(format!("expected a field name, found {:?}", token))),
            None => Err(invalid("unexpected end of expression".to_string())),
        }
    }

    fn parse_comparison(&mut self, name: &str) -> Result<FilterExpr> {
        let field = Field::from_name(name)
            .ok_or_else(|| invalid(format!("unknown field '{}'", name)))?;

        let op = match self.next() {
            Some(Token::Op(op)) => op,
            _ => return Err(invalid(format!("expected an operator after '{}'", name))),
        };

        let value = match self.next() {
            Some(Token::Str(s)) => Literal::Str(s),
            Some(Token::Num(n)) => Literal::Num(n),
            Some(Token::Ident(word)) if word == "true" => Literal::Bool(true),
            Some(Token::Ident(word)) if word == "false" => Literal::Bool(false),
            _ => return Err(invalid(format!("expected a value after '{}'", name))),
        };

        let well_typed = match (&field, &value) {
            (Field::OverallRating, Literal::Num(_)) => true,
            (Field::Recommended, Literal::Bool(_)) => op.is_equality(),
            (Field::OverallRating | Field::Recommended, _) => false,
            (_, Literal::Str(_)) => op.is_equality(),
            _ => false,
        };
        if !well_typed {
            return Err(invalid(format!(
                "'{}' cannot be compared with {:?} using {:?}",
                name, value, op
            )));
        }

        Ok(FilterExpr::Compare { field, op, value })
    }
}
