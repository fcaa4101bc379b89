use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One row of the crowd counter view, column name to value.
pub type ViewRow = Map<String, Value>;

/// Columns kept out of the table listing
pub const HIDDEN_COLUMNS: [&str; 3] = ["CAPTION", "FILE_NAME", "RAW"];

#[derive(Debug, Clone, PartialEq)]
pub struct RatioSlice {
    pub category: &'static str,
    pub count: f64,
}

/// The analysed figures for one uploaded image.
#[derive(Debug, Clone, PartialEq)]
pub struct CrowdObservation {
    pub caption: Option<String>,
    pub total_attendees: i64,
    pub raised_hands: f64,
    pub percentage_with_hands_up: Option<f64>,
}

impl CrowdObservation {
    /// # Errors
    ///
    /// Returns an error if `TOTAL_ATTENDEES` or `RAISED_HANDS` is missing or
    /// not numeric.
    pub fn from_row(row: &ViewRow) -> Result<Self> {
        #[allow(clippy::cast_possible_truncation)]
        let total_attendees = number(row, "TOTAL_ATTENDEES")?.trunc() as i64;
        let raised_hands = number(row, "RAISED_HANDS")?;

        Ok(Self {
            caption: row.get("CAPTION").and_then(Value::as_str).map(str::to_string),
            total_attendees,
            raised_hands,
            percentage_with_hands_up: number(row, "PERCENTAGE_WITH_HANDS_UP").ok(),
        })
    }

    /// Attendees against raised hands, for the ratio chart. Non-finite counts
    /// are dropped.
    #[must_use]
    pub fn ratio(&self) -> Vec<RatioSlice> {
        #[allow(clippy::cast_precision_loss)]
        let slices = [
            RatioSlice {
                category: "Total Attendees",
                count: self.total_attendees as f64,
            },
            RatioSlice {
                category: "Raised Hands",
                count: self.raised_hands,
            },
        ];

        slices.into_iter().filter(|slice| slice.count.is_finite()).collect()
    }

    /// Percentage of attendees with a raised hand, `0` when unknown.
    #[must_use]
    pub fn conversion_rate(&self) -> f64 {
        self.percentage_with_hands_up.unwrap_or(0.0)
    }
}

fn number(row: &ViewRow, column: &str) -> Result<f64> {
    let value = match row.get(column) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    };

    value.ok_or_else(|| Error::Misc(format!("column `{column}` is missing or not numeric")))
}

/// Column names to show in the table listing, in view order.
#[must_use]
pub fn visible_columns(rows: &[ViewRow]) -> Vec<&str> {
    let mut columns: Vec<&str> = Vec::new();

    for row in rows {
        for column in row.keys() {
            if !HIDDEN_COLUMNS.contains(&column.as_str()) && !columns.contains(&column.as_str()) {
                columns.push(column.as_str());
            }
        }
    }

    columns
}
