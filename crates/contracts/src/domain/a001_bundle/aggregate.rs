use crate::domain::a002_member::Member;
use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleId(pub Uuid);

impl BundleId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for BundleId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(BundleId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// One uploaded markup file's structural unit (aggregate a001)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub id: BundleId,
    pub job_number: String,
    pub bundle_name: String,
    /// Name of the uploaded file the bundle came from
    pub file_name: String,
    /// Members inserted for the bundle
    pub total_members: i64,
    pub bundle_layer: Option<String>,
    pub metadata: EntityMetadata,
}

impl Bundle {
    pub fn new(job_number: String, bundle_name: String, file_name: String) -> Self {
        Self {
            id: BundleId::new(Uuid::new_v4()),
            job_number,
            bundle_name,
            file_name,
            total_members: 0,
            bundle_layer: None,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.job_number.trim().is_empty() {
            return Err("Job number must not be empty".into());
        }
        if self.bundle_name.trim().is_empty() {
            return Err("Bundle name must not be empty".into());
        }
        Ok(())
    }
}

impl AggregateRoot for Bundle {
    type Id = BundleId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "bundle"
    }

    fn element_name() -> &'static str {
        "Bundle"
    }

    fn list_name() -> &'static str {
        "Bundles"
    }
}

/// Bundle detail view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleWithMembers {
    #[serde(flatten)]
    pub bundle: Bundle,
    pub members: Vec<Member>,
}
