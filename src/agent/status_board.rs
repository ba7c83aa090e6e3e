//! Latest verdicts per check

use crate::core::types::{CheckIdentity, HealthStatus};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

/// Latest known state of one check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckState {
    /// Latest health verdict, for health checks
    pub health: Option<HealthStatus>,
    /// Latest resolved version, for version checks
    pub version: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Concurrent map from check identity to its latest state
#[derive(Debug, Default)]
pub struct StatusBoard {
    checks: DashMap<CheckIdentity, CheckState>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a health verdict, returning the previous one
    pub fn record_health(
        &self,
        identity: &CheckIdentity,
        status: HealthStatus,
    ) -> Option<HealthStatus> {
        let now = Utc::now();
        let mut entry = self
            .checks
            .entry(identity.clone())
            .or_insert_with(|| CheckState {
                health: None,
                version: None,
                updated_at: now,
            });
        entry.updated_at = now;
        entry.health.replace(status)
    }

    /// Store a resolved version, returning the previous one
    pub fn record_version(
        &self,
        identity: &CheckIdentity,
        version: Option<String>,
    ) -> Option<String> {
        let now = Utc::now();
        let mut entry = self
            .checks
            .entry(identity.clone())
            .or_insert_with(|| CheckState {
                health: None,
                version: None,
                updated_at: now,
            });
        entry.updated_at = now;
        std::mem::replace(&mut entry.version, version)
    }

    pub fn get(&self, identity: &CheckIdentity) -> Option<CheckState> {
        self.checks.get(identity).map(|entry| entry.clone())
    }

    pub fn health(&self, identity: &CheckIdentity) -> Option<HealthStatus> {
        self.checks.get(identity).and_then(|entry| entry.health)
    }

    pub fn version(&self, identity: &CheckIdentity) -> Option<String> {
        self.checks.get(identity).and_then(|entry| entry.version.clone())
    }

    /// Forget every check owned by `tenant`
    pub fn remove_tenant(&self, tenant: &str) -> usize {
        let before = self.checks.len();
        self.checks.retain(|identity, _| identity.tenant != tenant);
        before - self.checks.len()
    }

    /// Copy of every entry, sorted by identity
    pub fn snapshot(&self) -> Vec<(CheckIdentity, CheckState)> {
        let mut entries: Vec<_> = self
            .checks
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Most severe verdict across all health checks of `tenant`
    pub fn tenant_health(&self, tenant: &str) -> Option<HealthStatus> {
        self.checks
            .iter()
            .filter(|entry| entry.key().tenant == tenant)
            .filter_map(|entry| entry.health)
            .reduce(HealthStatus::worst)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
