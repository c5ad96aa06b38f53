//! Unit-aware expression evaluation for parameter inputs.
//!
//! Canonical units are centimeters and radians. Expressions are evaluated
//! with evalexpr after a light rewrite: numeric literals become float
//! variables (so `1/2` is 0.5) and a number directly followed by a name
//! gets an explicit `*` (so `5mm` and `5 mm` both read as `5 * mm`).

use std::collections::HashMap;
use std::f64::consts::{E, PI};

use evalexpr::{build_operator_tree, ContextWithMutableVariables, HashMapContext, Value};

/// Length units and their size in centimeters.
const LENGTH_UNITS: &[(&str, f64)] = &[
    ("mm", 0.1),
    ("cm", 1.0),
    ("m", 100.0),
    ("in", 2.54),
    ("ft", 30.48),
];

/// Angle units and their size in radians.
const ANGLE_UNITS: &[(&str, f64)] = &[("deg", PI / 180.0), ("rad", 1.0)];

const CONSTANTS: &[(&str, f64)] = &[("PI", PI), ("E", E)];

/// Errors from evaluating a parameter expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitsError {
    #[error("cannot parse '{expression}': {reason}")]
    Parse { expression: String, reason: String },

    #[error("cannot evaluate '{expression}': {reason}")]
    Evaluate { expression: String, reason: String },

    #[error("'{expression}' does not evaluate to a number")]
    NotNumeric { expression: String },

    #[error("'{expression}' mixes {found} units into a {expected} value")]
    WrongUnitKind {
        expression: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{name}' cannot be used as a parameter name")]
    InvalidName { name: String },
}

/// Converts user-facing length and angle inputs to canonical values.
pub trait LengthResolver {
    /// Evaluate a length expression to centimeters.
    fn resolve_length(&self, expression: &str) -> Result<f64, UnitsError>;

    /// Evaluate an angle expression to radians.
    fn resolve_angle(&self, expression: &str) -> Result<f64, UnitsError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantity {
    Length,
    Angle,
}

impl Quantity {
    fn name(self) -> &'static str {
        match self {
            Quantity::Length => "length",
            Quantity::Angle => "angle",
        }
    }
}

/// Identifiers and literals found while rewriting an expression.
#[derive(Debug, Default)]
struct Rewritten {
    text: String,
    literals: Vec<f64>,
    length_units: bool,
    angle_units: bool,
    parameters: bool,
}

/// Expression evaluator with unit names, constants and user parameters.
#[derive(Debug, Clone)]
pub struct UnitsManager {
    default_length_unit: &'static str,
    default_angle_unit: &'static str,
    parameters: HashMap<String, f64>,
}

impl UnitsManager {
    /// Length default `cm`, angle default `deg`.
    pub fn new() -> Self {
        Self {
            default_length_unit: "cm",
            default_angle_unit: "deg",
            parameters: HashMap::new(),
        }
    }

    /// Change the unit applied to unitless length expressions.
    pub fn with_default_length_unit(mut self, unit: &str) -> Result<Self, UnitsError> {
        let (name, _) = LENGTH_UNITS
            .iter()
            .find(|(n, _)| *n == unit)
            .ok_or_else(|| UnitsError::InvalidName {
                name: unit.to_string(),
            })?;
        self.default_length_unit = name;
        Ok(self)
    }

    /// Define a named parameter holding a canonical value.
    pub fn define(&mut self, name: &str, value: f64) -> Result<(), UnitsError> {
        let reserved = LENGTH_UNITS
            .iter()
            .chain(ANGLE_UNITS)
            .chain(CONSTANTS)
            .any(|(n, _)| *n == name)
            || name.starts_with(LITERAL_PREFIX);
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if reserved || !valid || !value.is_finite() {
            return Err(UnitsError::InvalidName {
                name: name.to_string(),
            });
        }
        self.parameters.insert(name.to_string(), value);
        Ok(())
    }

    fn unit_scale(units: &[(&str, f64)], name: &str) -> f64 {
        units
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| *s)
            .unwrap_or(1.0)
    }

    fn evaluate(&self, expression: &str, quantity: Quantity) -> Result<f64, UnitsError> {
        let rewritten = rewrite(expression);
        let wrong_kind = match quantity {
            Quantity::Length if rewritten.angle_units => Some(Quantity::Angle),
            Quantity::Angle if rewritten.length_units => Some(Quantity::Length),
            _ => None,
        };
        if let Some(found) = wrong_kind {
            return Err(UnitsError::WrongUnitKind {
                expression: expression.to_string(),
                expected: quantity.name(),
                found: found.name(),
            });
        }

        let mut context = HashMapContext::new();
        let entries = LENGTH_UNITS
            .iter()
            .chain(ANGLE_UNITS)
            .chain(CONSTANTS)
            .map(|(n, v)| (n.to_string(), *v))
            .chain(self.parameters.iter().map(|(n, v)| (n.clone(), *v)))
            .chain(
                rewritten
                    .literals
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (literal_name(i), *v)),
            );
        for (name, value) in entries {
            context
                .set_value(name, Value::Float(value))
                .map_err(|e| UnitsError::Evaluate {
                    expression: expression.to_string(),
                    reason: e.to_string(),
                })?;
        }

        let tree = build_operator_tree(&rewritten.text).map_err(|e| UnitsError::Parse {
            expression: expression.to_string(),
            reason: e.to_string(),
        })?;
        let value = match tree.eval_with_context(&context) {
            Ok(Value::Float(f)) => f,
            Ok(Value::Int(i)) => i as f64,
            Ok(_) => {
                return Err(UnitsError::NotNumeric {
                    expression: expression.to_string(),
                })
            }
            Err(e) => {
                return Err(UnitsError::Evaluate {
                    expression: expression.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        // Unitless input is read in the default unit.
        let dimensioned = rewritten.length_units || rewritten.angle_units || rewritten.parameters;
        if dimensioned {
            return Ok(value);
        }
        Ok(match quantity {
            Quantity::Length => value * Self::unit_scale(LENGTH_UNITS, self.default_length_unit),
            Quantity::Angle => value * Self::unit_scale(ANGLE_UNITS, self.default_angle_unit),
        })
    }
}

impl Default for UnitsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LengthResolver for UnitsManager {
    fn resolve_length(&self, expression: &str) -> Result<f64, UnitsError> {
        self.evaluate(expression, Quantity::Length)
    }

    fn resolve_angle(&self, expression: &str) -> Result<f64, UnitsError> {
        self.evaluate(expression, Quantity::Angle)
    }
}

/// Numeric literals are bound under this prefix; user parameters may not use it.
const LITERAL_PREFIX: &str = "lit_";

fn literal_name(index: usize) -> String {
    format!("{LITERAL_PREFIX}{index}")
}

/// Replace numeric literals with float variables and make implicit
/// multiplication explicit.
fn rewrite(expression: &str) -> Rewritten {
    let chars: Vec<char> = expression.chars().collect();
    let mut out = Rewritten::default();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let starts_number = c.is_ascii_digit()
            || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()));
        if starts_number {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            // Exponent, only when digits follow.
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    while j < chars.len() && chars[j].is_ascii_digit() {
                        j += 1;
                    }
                    i = j;
                }
            }
            let literal: String = chars[start..i].iter().collect();
            match literal.parse::<f64>() {
                Ok(value) => {
                    out.text.push_str(&literal_name(out.literals.len()));
                    out.literals.push(value);
                }
                // Left for evalexpr to report.
                Err(_) => out.text.push_str(&literal),
            }
            let mut k = i;
            while k < chars.len() && chars[k].is_whitespace() {
                k += 1;
            }
            if k < chars.len() && (chars[k].is_ascii_alphabetic() || chars[k] == '(') {
                out.text.push_str(" * ");
            }
            continue;
        }
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let ident: String = chars[start..i].iter().collect();
            if LENGTH_UNITS.iter().any(|(n, _)| *n == ident) {
                out.length_units = true;
            } else if ANGLE_UNITS.iter().any(|(n, _)| *n == ident) {
                out.angle_units = true;
            } else if !CONSTANTS.iter().any(|(n, _)| *n == ident) {
                out.parameters = true;
            }
            out.text.push_str(&ident);
            continue;
        }
        out.text.push(c);
        i += 1;
    }
    out
}
