//! Measurement Reducer
//!
//! The aggregate endpoint returns each measurement as a JSON array of buckets.
//! A 30-day window that crosses a month boundary comes back as two monthly
//! buckets, so the buckets are summed to get one value per measurement.
//!
//! Raw values are decoded into [`MeasurementBuckets`] first; summing only ever
//! sees numbers.

use serde_json::Value;

use super::error::{ReportError, ReportResult};

/// A validated, numeric list of measurement buckets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementBuckets(Vec<f64>);

impl MeasurementBuckets {
    /// Decode a raw JSON value; it must be an array of numbers
    pub fn decode(raw: &Value) -> ReportResult<Self> {
        let items = raw.as_array().ok_or_else(|| {
            ReportError::MeasurementDecode(format!("expected an array of buckets, got {}", raw))
        })?;

        Self::decode_items(items)
    }

    /// Decode each element of a bucket list
    pub fn decode_items(items: &[Value]) -> ReportResult<Self> {
        items
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_f64().ok_or_else(|| {
                    ReportError::MeasurementDecode(format!("bucket {} is not numeric: {}", i, v))
                })
            })
            .collect::<ReportResult<Vec<f64>>>()
            .map(Self)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// Sum a list of raw buckets, failing on the first non-numeric element
pub fn sum(buckets: &[Value]) -> ReportResult<f64> {
    MeasurementBuckets::decode_items(buckets).map(|b| b.total())
}
