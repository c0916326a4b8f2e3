//! Comparison sections: `{{#key=value}}`, `{{#key>=value}}` and friends.

use std::cmp::Ordering;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Op {
    fn is_equality(self) -> bool {
        matches!(self, Op::Eq | Op::Ne)
    }
}

/// A parsed comparison section name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition<'n> {
    pub key: &'n str,
    pub op: Op,
    pub operand: &'n str,
}

impl<'n> Condition<'n> {
    /// Splits `name` at its first operator. Operators whose family is
    /// disabled are not recognised, so the whole name stays a plain key.
    pub fn parse(name: &'n str, equal: bool, compare: bool) -> Option<Self> {
        let at = name.find(['=', '<', '>'])?;
        let (key, rest) = name.split_at(at);
        let (op, len) = if let Some(tail) = rest.strip_prefix('=') {
            if tail.starts_with('!') {
                (Op::Ne, 2)
            } else {
                (Op::Eq, 1)
            }
        } else if rest.starts_with(">=") {
            (Op::Gte, 2)
        } else if rest.starts_with("<=") {
            (Op::Lte, 2)
        } else if rest.starts_with('>') {
            (Op::Gt, 1)
        } else {
            (Op::Lt, 1)
        };
        let allowed = if op.is_equality() { equal } else { compare };
        if !allowed {
            return None;
        }
        Some(Self {
            key: key.trim_end(),
            op,
            operand: rest[len..].trim_start(),
        })
    }

    /// Evaluates the condition against the value found for the key.
    ///
    /// Both sides compare as numbers when they both parse as numbers,
    /// otherwise as text. A missing value only satisfies `=!`.
    pub fn holds(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return self.op == Op::Ne;
        };
        let ordering = match (as_number(value), self.operand.parse::<f64>().ok()) {
            (Some(left), Some(right)) => left.partial_cmp(&right),
            _ => Some(as_text(value).as_str().cmp(self.operand)),
        };
        match (self.op, ordering) {
            (Op::Eq, Some(o)) => o == Ordering::Equal,
            (Op::Ne, Some(o)) => o != Ordering::Equal,
            (Op::Ne, None) => true,
            (Op::Gt, Some(o)) => o == Ordering::Greater,
            (Op::Gte, Some(o)) => o != Ordering::Less,
            (Op::Lt, Some(o)) => o == Ordering::Less,
            (Op::Lte, Some(o)) => o != Ordering::Greater,
            (_, None) => false,
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
