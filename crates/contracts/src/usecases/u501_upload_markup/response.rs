use serde::{Deserialize, Serialize};

/// Successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub bundle_id: String,
    pub job_number: String,
    pub bundle_name: String,
    pub members_inserted: usize,
    /// Members left out by summary-mode filtering
    pub members_skipped: usize,
    /// An existing bundle with the same identity was replaced
    pub replaced: bool,
}

/// Body of the 409 returned when the bundle is already stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResponse {
    /// Always "exists"
    pub status: String,
    pub job_number: String,
    pub bundle_name: String,
}

impl ConflictResponse {
    pub fn exists(job_number: impl Into<String>, bundle_name: impl Into<String>) -> Self {
        Self {
            status: "exists".to_string(),
            job_number: job_number.into(),
            bundle_name: bundle_name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_wire_shape() {
        let json = serde_json::to_value(ConflictResponse::exists("J100", "B1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "exists", "jobNumber": "J100", "bundleName": "B1"})
        );
    }
}
