use crate::domain::a001_bundle::BundleId;
use crate::domain::a002_member::Member;
use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use crate::shared::member_summary::StudsSummary;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Workstations every line runs through, in floor order
pub const DEFAULT_STATIONS: &[&str] = &["99", "popup", "ventanas", "mesa"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineAssignmentId(pub Uuid);

impl LineAssignmentId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for LineAssignmentId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(LineAssignmentId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Completion state of one station for one assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationProgress {
    pub name: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Minutes since the previous completion at this station on the same
    /// line and date; none for the first job of the day
    pub elapsed_minutes: Option<i64>,
}

impl StationProgress {
    pub fn pending(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            completed: false,
            completed_at: None,
            elapsed_minutes: None,
        }
    }

    pub fn is(&self, station: &str) -> bool {
        self.name.eq_ignore_ascii_case(station.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationTransition {
    Complete,
    Undo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    UnknownStation(String),
    AlreadyCompleted(String),
    NotCompleted(String),
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::UnknownStation(s) => write!(f, "station '{}' is not on this assignment", s),
            TransitionError::AlreadyCompleted(s) => write!(f, "station '{}' is already completed", s),
            TransitionError::NotCompleted(s) => write!(f, "station '{}' is not completed", s),
        }
    }
}

impl std::error::Error for TransitionError {}

/// A bundle scheduled on a production line for a date (aggregate a003).
///
/// `members_data` is a copy taken when the bundle was sent to the line;
/// later changes to the bundle do not show up here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineAssignment {
    pub id: LineAssignmentId,
    pub bundle_id: Option<BundleId>,
    pub job_number: String,
    /// Bundle name
    pub bundle: String,
    pub line_number: i32,
    pub assignment_date: NaiveDate,
    pub lineal_feet: f64,
    pub members_data: Vec<Member>,
    pub studs_summary: String,
    pub has_sill_seal: bool,
    pub stations: Vec<StationProgress>,
    pub metadata: EntityMetadata,
}

impl LineAssignment {
    pub fn new(
        job_number: String,
        bundle: String,
        line_number: i32,
        assignment_date: NaiveDate,
        lineal_feet: f64,
        stations: &[String],
    ) -> Self {
        Self {
            id: LineAssignmentId::new(Uuid::new_v4()),
            bundle_id: None,
            job_number,
            bundle,
            line_number,
            assignment_date,
            lineal_feet,
            members_data: Vec::new(),
            studs_summary: String::new(),
            has_sill_seal: false,
            stations: stations.iter().map(|s| StationProgress::pending(s)).collect(),
            metadata: EntityMetadata::new(),
        }
    }

    /// Replaces the member snapshot and the values derived from it.
    pub fn set_members_snapshot(&mut self, bundle_id: BundleId, members: Vec<Member>) {
        let summary = StudsSummary::from_members(&members);
        self.bundle_id = Some(bundle_id);
        self.studs_summary = summary.to_string();
        self.has_sill_seal = summary.has_sill_seal;
        self.members_data = members;
    }

    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    pub fn station(&self, station: &str) -> Option<&StationProgress> {
        self.stations.iter().find(|s| s.is(station))
    }

    pub fn is_station_completed(&self, station: &str) -> bool {
        self.station(station).map(|s| s.completed).unwrap_or(false)
    }

    pub fn is_station_pending(&self, station: &str) -> bool {
        self.station(station).map(|s| !s.completed).unwrap_or(false)
    }

    pub fn station_completed_at(&self, station: &str) -> Option<DateTime<Utc>> {
        self.station(station).and_then(|s| s.completed_at)
    }

    /// Applies a station transition.
    ///
    /// `previous_completion` is the latest completion at the same station on
    /// the same line and date, used for the elapsed time on `Complete`.
    pub fn apply_transition(
        &mut self,
        station: &str,
        transition: StationTransition,
        now: DateTime<Utc>,
        previous_completion: Option<DateTime<Utc>>,
    ) -> Result<(), TransitionError> {
        let progress = self
            .stations
            .iter_mut()
            .find(|s| s.is(station))
            .ok_or_else(|| TransitionError::UnknownStation(station.to_string()))?;

        match transition {
            StationTransition::Complete => {
                if progress.completed {
                    return Err(TransitionError::AlreadyCompleted(progress.name.clone()));
                }
                progress.completed = true;
                progress.completed_at = Some(now);
                progress.elapsed_minutes = previous_completion
                    .filter(|prev| *prev <= now)
                    .map(|prev| (now - prev).num_minutes());
            }
            StationTransition::Undo => {
                if !progress.completed {
                    return Err(TransitionError::NotCompleted(progress.name.clone()));
                }
                progress.completed = false;
                progress.completed_at = None;
                progress.elapsed_minutes = None;
            }
        }
        self.metadata.touch();
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.job_number.trim().is_empty() {
            return Err("Job number must not be empty".into());
        }
        if self.bundle.trim().is_empty() {
            return Err("Bundle must not be empty".into());
        }
        if self.line_number < 1 {
            return Err(format!("Invalid line number {}", self.line_number));
        }
        if !self.lineal_feet.is_finite() || self.lineal_feet < 0.0 {
            return Err(format!("Invalid lineal feet {}", self.lineal_feet));
        }
        Ok(())
    }
}

impl AggregateRoot for LineAssignment {
    type Id = LineAssignmentId;

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
        "a003"
    }

    fn collection_name() -> &'static str {
        "line_assignment"
    }

    fn element_name() -> &'static str {
        "Line assignment"
    }

    fn list_name() -> &'static str {
        "Line assignments"
    }
}

/// Latest completion at `station` among `assignments`, excluding `exclude`.
pub fn previous_completion<'a, I>(
    assignments: I,
    station: &str,
    exclude: LineAssignmentId,
) -> Option<DateTime<Utc>>
where
    I: IntoIterator<Item = &'a LineAssignment>,
{
    assignments
        .into_iter()
        .filter(|a| a.id != exclude)
        .filter_map(|a| a.station_completed_at(station))
        .max()
}

/// First integer in a bundle name ("B12-L2" -> 12), 0 when there is none.
pub fn bundle_sort_number(bundle: &str) -> u64 {
    let digits: String = bundle
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Station screen order: job number, then bundle number.
pub fn sort_for_station(assignments: &mut [LineAssignment]) {
    assignments.sort_by(|a, b| {
        a.job_number
            .cmp(&b.job_number)
            .then_with(|| bundle_sort_number(&a.bundle).cmp(&bundle_sort_number(&b.bundle)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stations() -> Vec<String> {
        DEFAULT_STATIONS.iter().map(|s| s.to_string()).collect()
    }

    fn assignment(job: &str, bundle: &str) -> LineAssignment {
        LineAssignment::new(
            job.into(),
            bundle.into(),
            1,
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            420.0,
            &stations(),
        )
    }

    #[test]
    fn test_complete_then_undo() {
        let mut a = assignment("J1", "B1");
        let prev = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 25, 0).unwrap();

        a.apply_transition("PopUp", StationTransition::Complete, now, Some(prev))
            .unwrap();
        let popup = a.station("popup").unwrap();
        assert!(popup.completed);
        assert_eq!(popup.completed_at, Some(now));
        assert_eq!(popup.elapsed_minutes, Some(25));
        assert!(a.is_station_completed("POPUP"));
        assert!(a.is_station_pending("99"));

        a.apply_transition("popup", StationTransition::Undo, now, None)
            .unwrap();
        let popup = a.station("popup").unwrap();
        assert!(!popup.completed);
        assert_eq!(popup.completed_at, None);
        assert_eq!(popup.elapsed_minutes, None);
    }

    #[test]
    fn test_first_completion_has_no_elapsed() {
        let mut a = assignment("J1", "B1");
        a.apply_transition("99", StationTransition::Complete, Utc::now(), None)
            .unwrap();
        assert_eq!(a.station("99").unwrap().elapsed_minutes, None);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut a = assignment("J1", "B1");
        let now = Utc::now();
        assert_eq!(
            a.apply_transition("sierra", StationTransition::Complete, now, None),
            Err(TransitionError::UnknownStation("sierra".into()))
        );
        assert_eq!(
            a.apply_transition("mesa", StationTransition::Undo, now, None),
            Err(TransitionError::NotCompleted("mesa".into()))
        );
        a.apply_transition("mesa", StationTransition::Complete, now, None)
            .unwrap();
        assert_eq!(
            a.apply_transition("mesa", StationTransition::Complete, now, None),
            Err(TransitionError::AlreadyCompleted("mesa".into()))
        );
    }

    #[test]
    fn test_previous_completion_picks_latest_other() {
        let t1 = Utc.with_ymd_and_hms(2026, 3, 2, 7, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let mut a = assignment("J1", "B1");
        let mut b = assignment("J1", "B2");
        let c = assignment("J1", "B3");
        a.apply_transition("99", StationTransition::Complete, t1, None)
            .unwrap();
        b.apply_transition("99", StationTransition::Complete, t2, Some(t1))
            .unwrap();
        let all = vec![a.clone(), b.clone(), c.clone()];
        assert_eq!(previous_completion(&all, "99", c.id), Some(t2));
        assert_eq!(previous_completion(&all, "99", b.id), Some(t1));
        assert_eq!(previous_completion(&all, "mesa", c.id), None);
    }

    #[test]
    fn test_bundle_sort_number() {
        assert_eq!(bundle_sort_number("B12"), 12);
        assert_eq!(bundle_sort_number("Bundle 3 - L2"), 3);
        assert_eq!(bundle_sort_number("walls"), 0);
    }

    #[test]
    fn test_sort_for_station() {
        let mut rows = vec![
            assignment("J2", "B1"),
            assignment("J1", "B10"),
            assignment("J1", "B2"),
        ];
        sort_for_station(&mut rows);
        let order: Vec<(&str, &str)> = rows
            .iter()
            .map(|a| (a.job_number.as_str(), a.bundle.as_str()))
            .collect();
        assert_eq!(order, vec![("J1", "B2"), ("J1", "B10"), ("J2", "B1")]);
    }

    #[test]
    fn test_validate() {
        let mut a = assignment("J1", "B1");
        assert!(a.validate().is_ok());
        a.line_number = 0;
        assert!(a.validate().is_err());
    }
}
