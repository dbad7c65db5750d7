use super::repository;
use crate::domain::{a001_bundle, a002_member};
use crate::shared::format::format_feet;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use contracts::domain::a003_line_assignment::{
    previous_completion, LineAssignment, StationTransition, TransitionError,
};
use contracts::usecases::u502_import_manifest::{
    BatchSendRequest, BatchSendResponse, RejectedRow, SendToLineRequest,
};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StationUpdateError {
    #[error("line assignment {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Sends a bundle to a line for a date, snapshotting its members.
///
/// An existing assignment for the same slot gets a fresh snapshot and
/// footage but keeps its station progress. Returns `None` when no stored
/// bundle matches the job number and bundle name.
pub async fn assign<C: ConnectionTrait>(
    db: &C,
    stations: &[String],
    request: &SendToLineRequest,
) -> Result<Option<LineAssignment>> {
    let job_number = request.job_number.trim();
    let bundle_name = request.bundle.trim();

    let Some(bundle) = a001_bundle::service::find_by_identity(db, job_number, bundle_name).await?
    else {
        return Ok(None);
    };
    let members = a002_member::repository::list_by_bundle(db, bundle.id).await?;

    let existing = repository::find_by_slot(
        db,
        job_number,
        bundle_name,
        request.assignment_date,
        request.line_number,
    )
    .await?;

    let assignment = match existing {
        Some(mut assignment) => {
            assignment.lineal_feet = request.lineal_feet;
            assignment.set_members_snapshot(bundle.id, members);
            assignment
                .validate()
                .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
            repository::update(db, &mut assignment).await?;
            tracing::info!(
                "Refreshed line {} assignment {} / {} for {}",
                assignment.line_number,
                assignment.job_number,
                assignment.bundle,
                assignment.assignment_date
            );
            assignment
        }
        None => {
            let mut assignment = LineAssignment::new(
                job_number.to_string(),
                bundle_name.to_string(),
                request.line_number,
                request.assignment_date,
                request.lineal_feet,
                stations,
            );
            assignment.set_members_snapshot(bundle.id, members);
            assignment
                .validate()
                .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
            repository::insert(db, &assignment).await?;
            tracing::info!(
                "Assigned {} / {} to line {} for {} ({} members, {})",
                assignment.job_number,
                assignment.bundle,
                assignment.line_number,
                assignment.assignment_date,
                assignment.members_data.len(),
                format_feet(assignment.lineal_feet)
            );
            assignment
        }
    };
    Ok(Some(assignment))
}

/// Sends every manifest row to the line. Rows with unreadable footage or an
/// unknown bundle are reported back instead of failing the batch.
pub async fn assign_batch<C: ConnectionTrait>(
    db: &C,
    stations: &[String],
    request: &BatchSendRequest,
) -> Result<BatchSendResponse> {
    let mut assigned = Vec::new();
    let mut rejected = Vec::new();

    for row in &request.rows {
        let reject = |reason: &str| RejectedRow {
            job_number: row.job_number.clone(),
            bundle: row.bundle.clone(),
            reason: reason.to_string(),
        };

        let Some(lineal_feet) = row.lineal_feet_value() else {
            rejected.push(reject("unreadable lineal feet"));
            continue;
        };
        let single = SendToLineRequest {
            job_number: row.job_number.clone(),
            bundle: row.bundle.clone(),
            line_number: request.line_number,
            assignment_date: request.assignment_date,
            lineal_feet,
        };
        match assign(db, stations, &single).await? {
            Some(assignment) => assigned.push(assignment),
            None => rejected.push(reject("bundle not found")),
        }
    }

    if !rejected.is_empty() {
        tracing::warn!(
            "Line {} batch for {}: {} rows rejected",
            request.line_number,
            request.assignment_date,
            rejected.len()
        );
    }
    Ok(BatchSendResponse { assigned, rejected })
}

/// Completes or undoes a station on one assignment.
pub async fn apply_station_transition<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    station: &str,
    transition: StationTransition,
    now: DateTime<Utc>,
) -> Result<LineAssignment, StationUpdateError> {
    let mut assignment = repository::get_by_id(db, id)
        .await?
        .ok_or(StationUpdateError::NotFound(id))?;

    let previous = match transition {
        StationTransition::Complete => {
            let same_day =
                repository::list_for_day(db, assignment.line_number, assignment.assignment_date)
                    .await?;
            previous_completion(&same_day, station, assignment.id)
        }
        StationTransition::Undo => None,
    };

    assignment.apply_transition(station, transition, now, previous)?;
    repository::update(db, &mut assignment).await?;

    tracing::info!(
        "Station {} {:?} on {} / {} (line {})",
        station,
        transition,
        assignment.job_number,
        assignment.bundle,
        assignment.line_number
    );
    Ok(assignment)
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<LineAssignment>> {
    repository::get_by_id(db, id).await
}

pub async fn list_for_day<C: ConnectionTrait>(
    db: &C,
    line_number: i32,
    date: NaiveDate,
) -> Result<Vec<LineAssignment>> {
    repository::list_for_day(db, line_number, date).await
}

pub async fn list_dates<C: ConnectionTrait>(db: &C, line_number: i32) -> Result<Vec<NaiveDate>> {
    repository::list_dates(db, line_number).await
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool> {
    repository::delete(db, id).await
}
