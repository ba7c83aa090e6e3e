//! Query layer tests


use crate::core::query::MetricQuery;
use crate::core::types::{CheckIdentity, Sample, SampleSeries};
use crate::utils::error::{AgentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;

fn identity(name: &str) -> CheckIdentity {
    CheckIdentity::new("prod", "acme", "api", name)
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn series(points: &[(i64, f64)]) -> SampleSeries {
    SampleSeries::from_samples(points.iter().map(|(secs, value)| Sample::new(at(*secs), *value)).collect())
}

/// Scripted outcome of one inner query
enum Reply {
    Series(SampleSeries),
    Unavailable,
    Cancelled,
    Failed(&'static str),
}

/// Inner query returning scripted replies and recording requested windows
#[derive(Default)]
struct ScriptedQuery {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(CheckIdentity, DateTime<Utc>, DateTime<Utc>)>>,
}

impl ScriptedQuery {
    fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(CheckIdentity, DateTime<Utc>, DateTime<Utc>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl MetricQuery for ScriptedQuery {
    async fn query_range(
        &self,
        identity: &CheckIdentity,
        _expression: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        _cancel: CancellationToken,
    ) -> Result<Option<SampleSeries>> {
        self.calls.lock().push((identity.clone(), start, end));
        match self.replies.lock().pop_front() {
            Some(Reply::Series(series)) => Ok(Some(series)),
            Some(Reply::Unavailable) | None => Ok(None),
            Some(Reply::Cancelled) => Err(AgentError::Cancelled),
            Some(Reply::Failed(message)) => Err(AgentError::parsing(message)),
        }
    }
}
