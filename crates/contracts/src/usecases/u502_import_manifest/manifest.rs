use super::line_variant::{column_index, LineVariant};
use crate::domain::a003_line_assignment::LineAssignment;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One job/bundle/footage row of a line manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRow {
    pub job_number: String,
    pub bundle: String,
    /// Cell text as it appears in the sheet
    pub lineal_feet: String,
    #[serde(default)]
    pub studs_summary: Option<String>,
    #[serde(default)]
    pub has_sill_seal: bool,
}

impl ManifestRow {
    pub fn lineal_feet_value(&self) -> Option<f64> {
        parse_lineal_feet(&self.lineal_feet)
    }
}

/// Maps raw sheet rows to manifest rows. The first row is the header; rows
/// missing any of the three values are dropped.
pub fn map_rows(rows: &[Vec<String>], variant: &LineVariant) -> Vec<ManifestRow> {
    let cell = |row: &[String], column: char| -> String {
        row.get(column_index(column))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    rows.iter()
        .skip(1)
        .filter_map(|row| {
            let job_number = cell(row, variant.job_column);
            let bundle = cell(row, variant.bundle_column);
            let lineal_feet = cell(row, variant.feet_column);
            if job_number.is_empty() || bundle.is_empty() || lineal_feet.is_empty() {
                return None;
            }
            Some(ManifestRow {
                job_number,
                bundle,
                lineal_feet,
                studs_summary: None,
                has_sill_seal: false,
            })
        })
        .collect()
}

/// Footage with thousands separators and whitespace removed ("1,234.5")
pub fn parse_lineal_feet(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestResponse {
    pub line: i32,
    pub file_name: String,
    pub rows: Vec<ManifestRow>,
}

/// Sends one bundle to a line for a date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendToLineRequest {
    pub job_number: String,
    pub bundle: String,
    pub line_number: i32,
    pub assignment_date: NaiveDate,
    pub lineal_feet: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSendRequest {
    pub line_number: i32,
    pub assignment_date: NaiveDate,
    pub rows: Vec<ManifestRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSendResponse {
    pub assigned: Vec<LineAssignment>,
    /// Rows not assigned, with the reason
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRow {
    pub job_number: String,
    pub bundle: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_map_rows_line_1() {
        let rows = sheet(&[
            &["", "", "JOB", "BUNDLE", "LF"],
            &["", "x", "J100", "B1", "1,234.5"],
            &["", "x", "J100", "", "50"],
            &["", "x", "J101", "B2", "80 "],
            &["", "x", "J102"],
        ]);
        let mapped = map_rows(&rows, &LineVariant::for_line(1).unwrap());
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped[0].job_number, "J100");
        assert_eq!(mapped[0].bundle, "B1");
        assert_eq!(mapped[0].lineal_feet_value(), Some(1234.5));
        assert_eq!(mapped[1].lineal_feet, "80");
    }

    #[test]
    fn test_map_rows_line_2() {
        let rows = sheet(&[
            &["#", "JOB", "BUNDLE", "", "LF"],
            &["1", "J7", "B3", "", "220"],
        ]);
        let mapped = map_rows(&rows, &LineVariant::for_line(2).unwrap());
        assert_eq!(mapped.len(), 1);
        assert_eq!((mapped[0].job_number.as_str(), mapped[0].bundle.as_str()), ("J7", "B3"));
    }

    #[test]
    fn test_header_only() {
        let rows = sheet(&[&["", "", "JOB", "BUNDLE", "LF"]]);
        assert!(map_rows(&rows, &LineVariant::for_line(1).unwrap()).is_empty());
    }

    #[test]
    fn test_parse_lineal_feet() {
        assert_eq!(parse_lineal_feet("2,400"), Some(2400.0));
        assert_eq!(parse_lineal_feet(" 12.5 "), Some(12.5));
        assert_eq!(parse_lineal_feet("n/a"), None);
        assert_eq!(parse_lineal_feet("-4"), None);
    }
}
