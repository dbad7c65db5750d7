use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::a001_bundle::BundleId;
use crate::domain::common::AggregateId;

/// Member types kept by summary-only ingestion
pub const SUMMARY_MEMBER_TYPES: &[&str] = &[
    "STUD",
    "KING",
    "JACK",
    "HEADER",
    "SILL",
    "BLOCK",
    "CRIPPLE",
    "BOTTOM PLATE",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(pub Uuid);

impl MemberId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for MemberId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(MemberId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// A member as read from a markup file, before it is attached to a bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub member_id: String,
    pub member_type: Option<String>,
    pub name: Option<String>,
    /// Dimension string, e.g. "2x6" or "2x4 SPF SILL SEAL"
    pub description: Option<String>,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub actual_height: Option<f64>,
    pub actual_width: Option<f64>,
    /// Inches
    pub length: Option<f64>,
    pub cut_member: bool,
    pub unique_id: Option<String>,
    /// Structure the member was listed under, when known
    pub structure_id: Option<String>,
}

impl MemberDraft {
    /// True when the trimmed type is on the summary allow-list (any case).
    pub fn is_summary_type(&self) -> bool {
        self.member_type
            .as_deref()
            .map(|t| {
                let t = t.trim();
                SUMMARY_MEMBER_TYPES
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(t))
            })
            .unwrap_or(false)
    }

    pub fn into_member(self, bundle_id: BundleId) -> Member {
        Member {
            id: MemberId::new(Uuid::new_v4()),
            bundle_id,
            member_id: self.member_id,
            member_type: self.member_type,
            name: self.name,
            description: self.description,
            height: self.height,
            width: self.width,
            actual_height: self.actual_height,
            actual_width: self.actual_width,
            length: self.length,
            cut_member: self.cut_member,
            unique_id: self.unique_id,
            structure_id: self.structure_id,
        }
    }
}

/// One structural piece (stud, header, plate...) belonging to a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub bundle_id: BundleId,
    pub member_id: String,
    #[serde(rename = "type")]
    pub member_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub actual_height: Option<f64>,
    pub actual_width: Option<f64>,
    pub length: Option<f64>,
    pub cut_member: bool,
    pub unique_id: Option<String>,
    pub structure_id: Option<String>,
}
