//! Range query response envelope
//!
//! Prometheus and Loki answer metric range queries with the same JSON
//! envelope:
//!
//! ```json
//! {"status": "success",
//!  "data": {"resultType": "matrix",
//!           "result": [{"metric": {...}, "values": [[1700000000.5, "0.25"], ...]}]}}
//! ```
//!
//! A check expects exactly one series with at least one sample. Anything
//! else means the data is unavailable. Sample values that are not numbers
//! are a hard parsing error because retrying will not fix them.

use crate::core::types::{CheckIdentity, Sample, SampleSeries};
use crate::utils::error::{AgentError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

const STATUS_SUCCESS: &str = "success";
const RESULT_TYPE_MATRIX: &str = "matrix";

/// Top-level range query response
#[derive(Debug, Clone, Deserialize)]
pub struct RangeResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<RangeData>,
    #[serde(default, rename = "errorType")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Query result payload
#[derive(Debug, Clone, Deserialize)]
pub struct RangeData {
    #[serde(rename = "resultType")]
    pub result_type: String,
    #[serde(default)]
    pub result: Vec<RangeSeries>,
}

/// One labelled series of `[timestamp, value]` pairs
#[derive(Debug, Clone, Deserialize)]
pub struct RangeSeries {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    #[serde(default)]
    pub values: Vec<(Value, Value)>,
}

impl RangeResponse {
    /// Validate the envelope and convert its single series.
    ///
    /// Returns `Ok(None)` when the response does not carry exactly one
    /// non-empty matrix series.
    pub fn into_series(self, identity: &CheckIdentity) -> Result<Option<SampleSeries>> {
        if self.status != STATUS_SUCCESS {
            info!(
                check = %identity,
                status = %self.status,
                error_type = self.error_type.as_deref().unwrap_or(""),
                "Range query unsuccessful: {}",
                self.error.as_deref().unwrap_or("no error message")
            );
            return Ok(None);
        }

        let Some(data) = self.data else {
            info!(check = %identity, "Range query returned no data");
            return Ok(None);
        };

        if data.result_type != RESULT_TYPE_MATRIX {
            warn!(
                check = %identity,
                result_type = %data.result_type,
                "Range query did not return a matrix"
            );
            return Ok(None);
        }

        let mut result = data.result;
        if result.len() != 1 {
            warn!(
                check = %identity,
                series = result.len(),
                "Range query must return exactly one series"
            );
            return Ok(None);
        }

        let series = result.remove(0);
        if series.values.is_empty() {
            info!(check = %identity, "Range query returned an empty series");
            return Ok(None);
        }

        let samples = series
            .values
            .iter()
            .map(|(timestamp, value)| {
                Ok(Sample::new(parse_timestamp(timestamp)?, parse_value(value)?))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(check = %identity, samples = samples.len(), "Range query decoded");
        Ok(Some(SampleSeries::from_samples(samples)))
    }
}

/// Decode a response body into a series
pub fn decode_series(body: &[u8], identity: &CheckIdentity) -> Result<Option<SampleSeries>> {
    match serde_json::from_slice::<RangeResponse>(body) {
        Ok(response) => response.into_series(identity),
        Err(e) => {
            warn!(check = %identity, "Malformed range query response: {}", e);
            Ok(None)
        }
    }
}

/// Unix seconds, possibly fractional, as a number or a numeric string
fn parse_timestamp(raw: &Value) -> Result<DateTime<Utc>> {
    let seconds = match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.parse::<f64>().ok(),
        _ => None,
    }
    .filter(|seconds| seconds.is_finite())
    .ok_or_else(|| AgentError::parsing(format!("sample timestamp {} is not a number", raw)))?;

    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
        .ok_or_else(|| AgentError::parsing(format!("sample timestamp {} is out of range", raw)))
}

/// Sample values travel as strings so `NaN` and `+Inf` survive JSON
fn parse_value(raw: &Value) -> Result<f64> {
    match raw {
        Value::String(text) => text
            .parse::<f64>()
            .map_err(|_| AgentError::parsing(format!("sample value '{}' is not a number", text))),
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| AgentError::parsing(format!("sample value {} is not a number", number))),
        other => Err(AgentError::parsing(format!(
            "sample value {} is not a number",
            other
        ))),
    }
}
