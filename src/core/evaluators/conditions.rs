//! Threshold comparison operators

use crate::utils::error::AgentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison applied as `sample <op> threshold`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl ComparisonOperator {
    pub fn compare(self, value: f64, threshold: f64) -> bool {
        match self {
            ComparisonOperator::Equal => value == threshold,
            ComparisonOperator::NotEqual => value != threshold,
            ComparisonOperator::GreaterThan => value > threshold,
            ComparisonOperator::GreaterThanOrEqual => value >= threshold,
            ComparisonOperator::LessThan => value < threshold,
            ComparisonOperator::LessThanOrEqual => value <= threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "==" | "=" | "eq" | "equal" => Ok(ComparisonOperator::Equal),
            "!=" | "<>" | "ne" | "not_equal" => Ok(ComparisonOperator::NotEqual),
            ">" | "gt" | "greater_than" => Ok(ComparisonOperator::GreaterThan),
            ">=" | "ge" | "gte" | "greater_than_or_equal" => {
                Ok(ComparisonOperator::GreaterThanOrEqual)
            }
            "<" | "lt" | "less_than" => Ok(ComparisonOperator::LessThan),
            "<=" | "le" | "lte" | "less_than_or_equal" => Ok(ComparisonOperator::LessThanOrEqual),
            other => Err(AgentError::config(format!(
                "unknown comparison operator '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for ComparisonOperator {
    type Error = AgentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ComparisonOperator> for String {
    fn from(operator: ComparisonOperator) -> Self {
        operator.symbol().to_string()
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
