//! Filter Expressions
//!
//! Builder for the upstream `filter` query grammar:
//! `equals(field,value)`, `less-than(field,value)`, `greater-or-equal(field,value)`,
//! with multiple conditions joined by `,` (implicit AND).

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// A literal on the right-hand side of a filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Rendered single-quoted: `'email'`
    Text(String),
    /// Rendered bare: `false`
    Bool(bool),
    /// Rendered as RFC 3339 UTC with whole seconds: `2024-01-31T12:00:00Z`
    DateTime(DateTime<Utc>),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(s) => write!(f, "'{}'", s),
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::DateTime(dt) => {
                write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(dt: DateTime<Utc>) -> Self {
        FilterValue::DateTime(dt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Equals,
    LessThan,
    GreaterOrEqual,
}

impl Operator {
    fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::LessThan => "less-than",
            Operator::GreaterOrEqual => "greater-or-equal",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    op: Operator,
    field: String,
    value: FilterValue,
}

/// A conjunction of filter conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.push(Operator::Equals, field, value.into())
    }

    pub fn less_than(self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.push(Operator::LessThan, field, value.into())
    }

    pub fn greater_or_equal(self, field: &str, value: impl Into<FilterValue>) -> Self {
        self.push(Operator::GreaterOrEqual, field, value.into())
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn push(mut self, op: Operator, field: &str, value: FilterValue) -> Self {
        self.conditions.push(Condition {
            op,
            field: field.to_string(),
            value,
        });
        self
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}({},{})", c.op.as_str(), c.field, c.value)?;
        }
        Ok(())
    }
}
