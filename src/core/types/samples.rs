//! Metric sample series

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single metric observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Observation time
    pub timestamp: DateTime<Utc>,
    /// Observed value
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Samples for one metric, ordered oldest to newest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleSeries {
    samples: Vec<Sample>,
}

impl SampleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from samples, sorting them by timestamp
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|sample| sample.timestamp);
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.first().map(|sample| sample.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.last().map(|sample| sample.timestamp)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.value)
    }

    /// Drop every sample older than `start`
    pub fn trim_before(&mut self, start: DateTime<Utc>) {
        self.samples.retain(|sample| sample.timestamp >= start);
    }

    /// Merge a newer batch into this series.
    ///
    /// Samples at or after the batch's first timestamp are replaced by the
    /// batch so the seam never carries duplicate timestamps.
    pub fn splice_tail(&mut self, batch: SampleSeries) {
        if let Some(seam) = batch.first_timestamp() {
            self.samples.retain(|sample| sample.timestamp < seam);
        }
        self.samples.extend(batch.samples);
    }
}

impl From<Vec<Sample>> for SampleSeries {
    fn from(samples: Vec<Sample>) -> Self {
        Self::from_samples(samples)
    }
}

impl IntoIterator for SampleSeries {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}
