use crate::domain::a003_line_assignment::{
    previous_completion, sort_for_station, LineAssignment, LineAssignmentId, StationTransition,
    TransitionError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Write the caller has to send after an optimistic toggle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingWrite {
    pub assignment_id: LineAssignmentId,
    pub station: String,
    pub transition: StationTransition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Another write has not been confirmed or failed yet
    Busy,
    UnknownAssignment(LineAssignmentId),
    Transition(TransitionError),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Busy => write!(f, "a station update is still in progress"),
            BoardError::UnknownAssignment(id) => write!(f, "assignment {} is not on the board", id.0),
            BoardError::Transition(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BoardError {}

/// Client-side state of one station screen.
///
/// Toggles are applied to the local rows immediately. At most one write is
/// in flight; the row as it was before the toggle is kept until the write is
/// confirmed so a failure can put it back.
#[derive(Debug, Clone)]
pub struct StationBoard {
    station: String,
    rows: Vec<LineAssignment>,
    in_flight: Option<(PendingWrite, LineAssignment)>,
    needs_refetch: bool,
}

impl StationBoard {
    pub fn new(station: impl Into<String>, mut rows: Vec<LineAssignment>) -> Self {
        sort_for_station(&mut rows);
        Self {
            station: station.into(),
            rows,
            in_flight: None,
            needs_refetch: false,
        }
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn rows(&self) -> &[LineAssignment] {
        &self.rows
    }

    /// Rows to display: pending ones only unless `show_completed`
    pub fn visible_rows(&self, show_completed: bool) -> Vec<&LineAssignment> {
        self.rows
            .iter()
            .filter(|a| show_completed || a.is_station_pending(&self.station))
            .collect()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn needs_refetch(&self) -> bool {
        self.needs_refetch
    }

    /// Flips the station on one row and returns the write to send.
    pub fn toggle(
        &mut self,
        id: LineAssignmentId,
        now: DateTime<Utc>,
    ) -> Result<PendingWrite, BoardError> {
        if self.in_flight.is_some() {
            return Err(BoardError::Busy);
        }
        let idx = self
            .rows
            .iter()
            .position(|a| a.id == id)
            .ok_or(BoardError::UnknownAssignment(id))?;

        let transition = if self.rows[idx].is_station_completed(&self.station) {
            StationTransition::Undo
        } else {
            StationTransition::Complete
        };
        let previous = previous_completion(&self.rows, &self.station, id);

        let before = self.rows[idx].clone();
        self.rows[idx]
            .apply_transition(&self.station, transition, now, previous)
            .map_err(BoardError::Transition)?;

        let write = PendingWrite {
            assignment_id: id,
            station: self.station.clone(),
            transition,
        };
        self.in_flight = Some((write.clone(), before));
        Ok(write)
    }

    /// The backend accepted the write; its copy of the row replaces ours.
    pub fn confirm(&mut self, saved: LineAssignment) {
        self.in_flight = None;
        if let Some(row) = self.rows.iter_mut().find(|a| a.id == saved.id) {
            *row = saved;
        }
    }

    /// The write failed: drop the optimistic change and ask for a re-fetch.
    pub fn fail(&mut self) {
        if let Some((_, before)) = self.in_flight.take() {
            if let Some(row) = self.rows.iter_mut().find(|a| a.id == before.id) {
                *row = before;
            }
        }
        self.needs_refetch = true;
    }

    pub fn reload(&mut self, mut rows: Vec<LineAssignment>) {
        sort_for_station(&mut rows);
        self.rows = rows;
        self.in_flight = None;
        self.needs_refetch = false;
    }
}
