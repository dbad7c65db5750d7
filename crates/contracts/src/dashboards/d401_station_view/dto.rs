use super::production_target::ProductionProgress;
use crate::domain::a003_line_assignment::LineAssignment;
use crate::shared::member_summary::{group_by_type_and_description, MemberTypeGroup};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationViewQuery {
    pub line: i32,
    pub date: NaiveDate,
    pub station: String,
    #[serde(default)]
    pub show_completed: bool,
}

/// Assignment as seen from one station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationRow {
    #[serde(flatten)]
    pub assignment: LineAssignment,
    pub station_completed: bool,
    pub groups: Vec<MemberTypeGroup>,
}

impl StationRow {
    pub fn new(assignment: LineAssignment, station: &str) -> Self {
        Self {
            station_completed: assignment.is_station_completed(station),
            groups: group_by_type_and_description(&assignment.members_data),
            assignment,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationViewResponse {
    pub line: i32,
    pub date: NaiveDate,
    pub station: String,
    pub rows: Vec<StationRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationDatesResponse {
    pub line: i32,
    /// Newest first
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationProgressResponse {
    pub line: i32,
    pub station: String,
    pub completed_feet: f64,
    pub pending_feet: f64,
    pub progress: ProductionProgress,
}
