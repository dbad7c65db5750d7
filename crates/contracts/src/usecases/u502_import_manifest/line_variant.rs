use serde::{Deserialize, Serialize};

/// Spreadsheet columns holding the three manifest values for one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineVariant {
    pub line_number: i32,
    pub job_column: char,
    pub bundle_column: char,
    pub feet_column: char,
}

impl LineVariant {
    pub fn for_line(line_number: i32) -> Result<Self, String> {
        let (job_column, bundle_column, feet_column) = match line_number {
            1 => ('C', 'D', 'E'),
            2 => ('B', 'C', 'E'),
            other => return Err(format!("No manifest layout for line {}", other)),
        };
        Ok(Self {
            line_number,
            job_column,
            bundle_column,
            feet_column,
        })
    }
}

/// Zero-based index of a single-letter column ("A" -> 0)
pub fn column_index(column: char) -> usize {
    (column.to_ascii_uppercase() as u8).saturating_sub(b'A') as usize
}
