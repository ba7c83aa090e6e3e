//! Health status levels
//!
//! Variants are declared from least to most severe so the derived ordering
//! is the severity ordering used when aggregating verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Health status of a check, ordered by severity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Target is fully operational
    #[default]
    Online,
    /// Target works but is trending towards trouble
    AtRisk,
    /// Target works with reduced quality
    Degraded,
    /// Target is not serving
    Offline,
    /// The agent could not determine the target's health
    Unknown,
}

impl HealthStatus {
    /// Whether `self` is strictly more severe than `other`
    pub fn is_worse_than(self, other: HealthStatus) -> bool {
        self > other
    }

    /// The more severe of the two statuses
    pub fn worst(self, other: HealthStatus) -> HealthStatus {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Online => "online",
            HealthStatus::AtRisk => "at_risk",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Offline => "offline",
            HealthStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
