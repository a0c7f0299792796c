//! Constant expressions
//!
//! Values of `constant` properties are small integer expressions over named
//! constants:
//!
//! ```text
//! DateEntry::YEAR | DateEntry::MONTH
//! YEAR | MONTH | DAY          // resolved against the property owner's type
//! (4 + 4) * 2
//! ```
//!
//! Operators are binary and left-associative, with precedence
//! `|` < `&` < `+ -` < `* /`. Parentheses group only.

use crate::error::{ExprError, ExprResult};
use crate::registry::Registry;
use trellis_tree::ComponentSpec;

/// Resolves constant names while evaluating
pub trait ConstantScope {
    /// A bare `NAME`
    fn constant(&self, name: &str) -> Option<i64>;

    /// A qualified `Type::NAME`
    fn qualified_constant(&self, type_name: &str, name: &str) -> Option<i64>;
}

/// Scope of a property: bare names resolve on the owning type and its ancestors,
/// qualified names through the registry
pub struct TypeScope<'a> {
    pub spec: &'static ComponentSpec,
    pub registry: &'a Registry,
}

impl ConstantScope for TypeScope<'_> {
    fn constant(&self, name: &str) -> Option<i64> {
        self.spec.constant(name)
    }

    fn qualified_constant(&self, type_name: &str, name: &str) -> Option<i64> {
        self.registry.resolve(type_name)?.constant(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Operand(String),
    Operator(char),
    LParen,
    RParen,
}

fn precedence(op: char) -> u8 {
    match op {
        '|' => 0,
        '&' => 1,
        '+' | '-' => 2,
        _ => 3,
    }
}

fn tokenize(expr: &str) -> ExprResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut operand = String::new();

    let flush = |operand: &mut String, tokens: &mut Vec<Token>| -> ExprResult<()> {
        let text = operand.trim();
        if !text.is_empty() {
            if text.contains(char::is_whitespace) {
                return Err(ExprError::syntax(expr, format!("missing operator in '{}'", text)));
            }
            tokens.push(Token::Operand(text.to_string()));
        }
        operand.clear();
        Ok(())
    };

    for c in expr.chars() {
        match c {
            '|' | '&' | '+' | '-' | '*' | '/' => {
                flush(&mut operand, &mut tokens)?;
                tokens.push(Token::Operator(c));
            }
            '(' => {
                flush(&mut operand, &mut tokens)?;
                tokens.push(Token::LParen);
            }
            ')' => {
                flush(&mut operand, &mut tokens)?;
                tokens.push(Token::RParen);
            }
            _ => operand.push(c),
        }
    }
    flush(&mut operand, &mut tokens)?;

    Ok(tokens)
}

/// Reject token sequences that cannot form a binary expression
fn check_syntax(expr: &str, tokens: &[Token]) -> ExprResult<()> {
    if tokens.is_empty() {
        return Err(ExprError::syntax(expr, "empty expression"));
    }

    let mut previous: Option<&Token> = None;
    for token in tokens {
        match (previous, token) {
            (None, Token::Operator(op)) => {
                return Err(ExprError::syntax(expr, format!("leading operator '{}'", op)));
            }
            (Some(Token::Operator(_)), Token::Operator(op)) => {
                return Err(ExprError::syntax(expr, format!("unexpected operator '{}'", op)));
            }
            (Some(Token::LParen), Token::Operator(op)) => {
                return Err(ExprError::syntax(expr, format!("operator '{}' after '('", op)));
            }
            (Some(Token::Operator(op)), Token::RParen) => {
                return Err(ExprError::syntax(expr, format!("missing operand after '{}'", op)));
            }
            (Some(Token::LParen), Token::RParen) => {
                return Err(ExprError::syntax(expr, "empty parentheses"));
            }
            (Some(Token::Operand(name)), Token::LParen) => {
                return Err(ExprError::syntax(expr, format!("missing operator before '(' after '{}'", name)));
            }
            (Some(Token::RParen), Token::Operand(name)) => {
                return Err(ExprError::syntax(expr, format!("missing operator before '{}'", name)));
            }
            (Some(Token::RParen), Token::LParen) => {
                return Err(ExprError::syntax(expr, "missing operator between ')' and '('"));
            }
            _ => {}
        }
        previous = Some(token);
    }

    if let Some(Token::Operator(op)) = previous {
        return Err(ExprError::syntax(expr, format!("trailing operator '{}'", op)));
    }
    Ok(())
}

/// Shunting-yard conversion to reverse Polish notation
fn to_rpn(expr: &str, tokens: Vec<Token>) -> ExprResult<Vec<Token>> {
    let mismatched = || ExprError::MismatchedParentheses {
        expression: expr.to_string(),
    };
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Operand(_) => output.push(token),
            Token::Operator(op) => {
                while let Some(Token::Operator(top)) = stack.last() {
                    if precedence(*top) < precedence(op) {
                        break;
                    }
                    output.extend(stack.pop());
                }
                stack.push(token);
            }
            Token::LParen => stack.push(token),
            Token::RParen => loop {
                match stack.pop() {
                    Some(Token::LParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(mismatched()),
                }
            },
        }
    }

    while let Some(token) = stack.pop() {
        if token == Token::LParen {
            return Err(mismatched());
        }
        output.push(token);
    }

    Ok(output)
}

fn resolve(expr: &str, operand: &str, scope: &dyn ConstantScope) -> ExprResult<i64> {
    if operand.bytes().all(|b| b.is_ascii_digit()) {
        return operand.parse().map_err(|_| ExprError::Overflow {
            expression: expr.to_string(),
        });
    }

    let value = match operand.split_once("::") {
        Some((type_name, name)) => scope.qualified_constant(type_name.trim(), name.trim()),
        None => scope.constant(operand),
    };
    value.ok_or_else(|| ExprError::UndefinedConstant {
        name: operand.to_string(),
        expression: expr.to_string(),
    })
}

fn apply(expr: &str, op: char, left: i64, right: i64) -> ExprResult<i64> {
    let overflow = || ExprError::Overflow {
        expression: expr.to_string(),
    };
    match op {
        '|' => Ok(left | right),
        '&' => Ok(left & right),
        '+' => left.checked_add(right).ok_or_else(overflow),
        '-' => left.checked_sub(right).ok_or_else(overflow),
        '*' => left.checked_mul(right).ok_or_else(overflow),
        _ => {
            if right == 0 {
                return Err(ExprError::DivisionByZero {
                    expression: expr.to_string(),
                });
            }
            left.checked_div(right).ok_or_else(overflow)
        }
    }
}

/// Evaluate a constant expression to an integer
pub fn evaluate(expr: &str, scope: &dyn ConstantScope) -> ExprResult<i64> {
    let tokens = tokenize(expr)?;
    check_syntax(expr, &tokens)?;
    let rpn = to_rpn(expr, tokens)?;

    let mut values: Vec<i64> = Vec::new();
    for token in rpn {
        match token {
            Token::Operand(operand) => values.push(resolve(expr, &operand, scope)?),
            Token::Operator(op) => {
                // right operand is on top
                let (Some(right), Some(left)) = (values.pop(), values.pop()) else {
                    return Err(ExprError::syntax(expr, format!("missing operand for '{}'", op)));
                };
                values.push(apply(expr, op, left, right)?);
            }
            Token::LParen | Token::RParen => return Err(ExprError::MismatchedParentheses {
                expression: expr.to_string(),
            }),
        }
    }

    match values.as_slice() {
        [value] => Ok(*value),
        _ => Err(ExprError::syntax(expr, "expected a single value")),
    }
}
