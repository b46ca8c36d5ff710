//! Measurement rows accumulated by an ask/tell session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CgResult;
use crate::schema::Schema;
use crate::table::Table;

/// Column holding the observed metric mean.
pub const METRIC_MEAN_COLUMN: &str = "metric:mean";
/// Column holding the metric's standard error.
pub const METRIC_SE_COLUMN: &str = "metric:se";
/// Column of the analysis table holding the estimated metric.
pub const METRIC_ESTIMATE_COLUMN: &str = "metric_est";
/// Wire value for an unknown standard error.
pub const SE_SENTINEL: &str = "none";

/// One told observation: parameter cells in schema order plus the metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub values: Vec<Value>,
    pub mean: f64,
    pub se: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl Measurement {
    pub fn new(values: Vec<Value>, mean: f64, se: Option<f64>) -> Self {
        Self {
            values,
            mean,
            se,
            recorded_at: Utc::now(),
        }
    }

    /// Wire row: parameter cells, then mean, then SE (or the sentinel).
    pub fn to_row(&self) -> Vec<Value> {
        let mut row = self.values.clone();
        row.push(Value::from(self.mean));
        row.push(match self.se {
            Some(se) => Value::from(se),
            None => Value::from(SE_SENTINEL),
        });
        row
    }
}

/// Build the measurements table sent with every request.
pub fn measurement_table(schema: &Schema, measurements: &[Measurement]) -> CgResult<Table> {
    let mut columns = schema.specs();
    columns.push(METRIC_MEAN_COLUMN.to_string());
    columns.push(METRIC_SE_COLUMN.to_string());

    let mut table = Table::new(columns);
    for measurement in measurements {
        table.push_row(measurement.to_row())?;
    }
    Ok(table)
}
