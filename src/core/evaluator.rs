//! Recursive-descent evaluation of the calculator display buffer.
//!
//! Grammar:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := ('+' | '-')* ( '(' expression ')' | number )
//! number     := digit+ ('.' digit+)? | '.' digit+
//! ```
//!
//! A buffer ending in `%` bypasses the grammar: the rest is read as a single
//! literal and divided by 100.

use crate::domain::model::EvaluationResult;
use crate::utils::error::EvalError;

pub const MULTIPLY_GLYPH: char = '×';
pub const DIVIDE_GLYPH: char = '÷';

/// Parentheses recurse through `factor`; sign prefixes do not.
const MAX_NESTING_DEPTH: usize = 256;

type EvalResult<T> = std::result::Result<T, EvalError>;

/// Evaluate an expression. Never fails: errors are returned as
/// `EvaluationResult::Error`, and a `Number` is always finite.
pub fn evaluate(expression: &str) -> EvaluationResult {
    let normalized = normalize(expression);

    let outcome = match normalized.strip_suffix('%') {
        Some(literal) => parse_percent(literal),
        None => Parser::new(&normalized).parse(),
    };

    match outcome.and_then(ensure_finite) {
        Ok(value) => EvaluationResult::Number(value),
        Err(e) => {
            tracing::debug!("Evaluation of {:?} failed: {}", expression, e);
            EvaluationResult::Error(e)
        }
    }
}

/// Evaluate and format in one step: the display string or `"Error"`.
pub fn calculate(expression: &str) -> String {
    evaluate(expression).to_display()
}

/// 將顯示用的 × ÷ 轉成 * /，並移除所有空白
pub fn normalize(expression: &str) -> String {
    expression
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            MULTIPLY_GLYPH => '*',
            DIVIDE_GLYPH => '/',
            other => other,
        })
        .collect()
}

fn parse_percent(literal: &str) -> EvalResult<f64> {
    literal
        .parse::<f64>()
        .map(|number| number / 100.0)
        .map_err(|e| EvalError::ParseError {
            position: 0,
            message: format!("invalid percentage literal {:?}: {}", literal, e),
        })
}

fn ensure_finite(value: f64) -> EvalResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::EvaluationFailure {
            message: format!("result {} is not a finite number", value),
        })
    }
}

/// Parse cursor for a single evaluation.
struct Parser {
    chars: Vec<char>,
    position: usize,
    current: Option<char>,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let current = chars.first().copied();
        Self {
            chars,
            position: 0,
            current,
            depth: 0,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current = self.chars.get(self.position).copied();
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.current == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> EvalError {
        EvalError::ParseError {
            position: self.position,
            message: message.into(),
        }
    }

    fn parse(mut self) -> EvalResult<f64> {
        let value = self.parse_expression()?;
        match self.current {
            None => Ok(value),
            Some(c) => Err(self.error(format!("trailing characters starting at {:?}", c))),
        }
    }

    fn parse_expression(&mut self) -> EvalResult<f64> {
        let mut value = self.parse_term()?;
        loop {
            if self.eat('+') {
                value += self.parse_term()?;
            } else if self.eat('-') {
                value -= self.parse_term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_term(&mut self) -> EvalResult<f64> {
        let mut value = self.parse_factor()?;
        loop {
            if self.eat('*') {
                value *= self.parse_factor()?;
            } else if self.eat('/') {
                // 除以零交給 ensure_finite 處理
                value /= self.parse_factor()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_factor(&mut self) -> EvalResult<f64> {
        let mut negative = false;
        loop {
            if self.eat('-') {
                negative = !negative;
            } else if !self.eat('+') {
                break;
            }
        }

        let value = self.parse_operand()?;
        Ok(if negative { -value } else { value })
    }

    fn parse_operand(&mut self) -> EvalResult<f64> {
        if self.eat('(') {
            if self.depth >= MAX_NESTING_DEPTH {
                return Err(self.error("expression nested too deeply"));
            }
            self.depth += 1;
            let value = self.parse_expression();
            self.depth -= 1;
            let value = value?;
            if !self.eat(')') {
                return Err(self.error("expected ')'"));
            }
            return Ok(value);
        }

        match self.current {
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(),
            Some(c) => Err(self.error(format!("unexpected {:?}", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_number(&mut self) -> EvalResult<f64> {
        let start = self.position;
        self.skip_digits();

        // ".5" 可以，"5." 不行
        if self.eat('.') {
            if !self.current.is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.error("expected digit after decimal point"));
            }
            self.skip_digits();
        }

        let literal: String = self.chars[start..self.position].iter().collect();
        literal.parse::<f64>().map_err(|e| EvalError::ParseError {
            position: start,
            message: format!("invalid number {:?}: {}", literal, e),
        })
    }

    fn skip_digits(&mut self) {
        while self.current.is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }
}
