use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IngestionMode {
    /// Every member of the file is stored
    #[default]
    Full,

    /// Only members whose type is in the summary allow-list
    Summary,
}

impl IngestionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionMode::Full => "full",
            IngestionMode::Summary => "summary",
        }
    }
}

impl fmt::Display for IngestionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngestionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(IngestionMode::Full),
            "summary" => Ok(IngestionMode::Summary),
            other => Err(format!("Unknown ingestion mode '{}'", other)),
        }
    }
}

/// JSON upload body: the file travels base64-encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadJsonRequest {
    pub file_name: String,
    pub file_data: String,
    #[serde(default)]
    pub replace: bool,
}

/// Accepted spellings of a truthy form flag
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("Summary".parse::<IngestionMode>(), Ok(IngestionMode::Summary));
        assert_eq!(" full ".parse::<IngestionMode>(), Ok(IngestionMode::Full));
        assert!("partial".parse::<IngestionMode>().is_err());
    }

    #[test]
    fn test_json_request_shape() {
        let req: UploadJsonRequest = serde_json::from_str(
            r#"{"fileName":"b1.xml","fileData":"PHg+PC94Pg=="}"#,
        )
        .unwrap();
        assert_eq!(req.file_name, "b1.xml");
        assert!(!req.replace);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
