//! Typed parsing of property literals

use trellis_parser::ast::PropertyType;
use trellis_tree::{parse_date, PropertyKind, PropertyValue};

/// What an implicit string literal looks like, if it looks typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralShape {
    Boolean,
    Number,
}

pub fn implicit_shape(literal: &str) -> Option<LiteralShape> {
    let text = literal.trim();
    if text == "true" || text == "false" {
        Some(LiteralShape::Boolean)
    } else if text.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
        && text.parse::<f64>().is_ok()
    {
        Some(LiteralShape::Number)
    } else {
        None
    }
}

/// Parse a literal declared with `ty` for a property of `kind`
///
/// `constant` and `data` literals are not handled here. The error is a
/// human-readable reason.
pub fn parse_literal(ty: PropertyType, literal: &str, kind: PropertyKind) -> Result<PropertyValue, String> {
    let value = match ty {
        PropertyType::String | PropertyType::Implicit => PropertyValue::String(literal.to_string()),
        PropertyType::Boolean => match literal.trim() {
            "true" => PropertyValue::Boolean(true),
            "false" => PropertyValue::Boolean(false),
            other => return Err(format!("'{}' is not true or false", other)),
        },
        PropertyType::Integer => literal
            .trim()
            .parse()
            .map(PropertyValue::Integer)
            .map_err(|_| format!("'{}' is not an integer", literal))?,
        PropertyType::Float => literal
            .trim()
            .parse()
            .map(PropertyValue::Float)
            .map_err(|_| format!("'{}' is not a number", literal))?,
        PropertyType::Date => parse_date(literal)
            .map(PropertyValue::Date)
            .ok_or_else(|| format!("'{}' is not a date (YYYY-MM-DD[ HH:MM:SS] or RFC 3339)", literal))?,
        PropertyType::Constant | PropertyType::Data => {
            return Err(format!("{} literals are resolved by the loader", ty))
        }
    };

    fit(value, kind)
}

/// Accept a parsed value for a property of `kind`. Integers widen to floats;
/// nothing else converts.
pub fn fit(value: PropertyValue, kind: PropertyKind) -> Result<PropertyValue, String> {
    match (value, kind) {
        (PropertyValue::Integer(i), PropertyKind::Float) => Ok(PropertyValue::Float(i as f64)),
        (value, kind) if value.matches(kind) => Ok(value),
        (value, kind) => Err(format!(
            "property expects {} but the literal is {}",
            kind,
            value.kind_name()
        )),
    }
}
