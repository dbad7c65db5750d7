use crate::domain::a003_line_assignment;
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use contracts::dashboards::d401_station_view::{
    ProductionWindow, StationDatesResponse, StationProgressResponse, StationRow,
    StationViewQuery, StationViewResponse,
};
use contracts::domain::a003_line_assignment::sort_for_station;
use sea_orm::ConnectionTrait;

/// Assignments of a line for one date as one station sees them.
/// Without `show_completed` only rows where the station is pending remain.
pub async fn station_view<C: ConnectionTrait>(
    db: &C,
    query: &StationViewQuery,
) -> Result<StationViewResponse> {
    let station = query.station.trim().to_lowercase();
    let mut assignments =
        a003_line_assignment::service::list_for_day(db, query.line, query.date).await?;

    if !query.show_completed {
        assignments.retain(|a| a.is_station_pending(&station));
    }
    sort_for_station(&mut assignments);

    let rows = assignments
        .into_iter()
        .map(|a| StationRow::new(a, &station))
        .collect();

    Ok(StationViewResponse {
        line: query.line,
        date: query.date,
        station,
        rows,
    })
}

pub async fn dates<C: ConnectionTrait>(db: &C, line: i32) -> Result<StationDatesResponse> {
    let dates = a003_line_assignment::service::list_dates(db, line).await?;
    Ok(StationDatesResponse { line, dates })
}

/// Completed and pending footage for a station plus the target figures as
/// of `now` (local wall-clock time).
pub async fn progress<C: ConnectionTrait>(
    db: &C,
    window: &ProductionWindow,
    line: i32,
    date: NaiveDate,
    station: &str,
    now: NaiveDateTime,
) -> Result<StationProgressResponse> {
    let station = station.trim().to_lowercase();
    let assignments = a003_line_assignment::service::list_for_day(db, line, date).await?;

    let (mut completed_feet, mut pending_feet) = (0.0, 0.0);
    for a in &assignments {
        if a.is_station_completed(&station) {
            completed_feet += a.lineal_feet;
        } else if a.is_station_pending(&station) {
            pending_feet += a.lineal_feet;
        }
    }

    Ok(StationProgressResponse {
        line,
        progress: window.progress(date, now, completed_feet),
        station,
        completed_feet,
        pending_feet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::initialize_database;
    use chrono::Utc;
    use contracts::domain::a003_line_assignment::{
        LineAssignment, StationTransition, DEFAULT_STATIONS,
    };

    fn stations() -> Vec<String> {
        DEFAULT_STATIONS.iter().map(|s| s.to_string()).collect()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    async fn seed<C: ConnectionTrait>(db: &C, job: &str, bundle: &str, feet: f64, mesa_done: bool) {
        let mut a = LineAssignment::new(job.into(), bundle.into(), 1, day(), feet, &stations());
        if mesa_done {
            a.apply_transition("mesa", StationTransition::Complete, Utc::now(), None)
                .unwrap();
        }
        a003_line_assignment::repository::insert(db, &a).await.unwrap();
    }

    #[tokio::test]
    async fn test_station_view_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let db = initialize_database(&dir.path().join("t.db")).await.unwrap();
        seed(&db, "J2", "B1", 100.0, false).await;
        seed(&db, "J1", "B10", 200.0, false).await;
        seed(&db, "J1", "B2", 300.0, true).await;

        let mut query = StationViewQuery {
            line: 1,
            date: day(),
            station: "MESA".into(),
            show_completed: false,
        };
        let view = station_view(&db, &query).await.unwrap();
        let order: Vec<&str> = view.rows.iter().map(|r| r.assignment.bundle.as_str()).collect();
        assert_eq!(order, vec!["B10", "B1"]);
        assert!(view.rows.iter().all(|r| !r.station_completed));

        query.show_completed = true;
        let view = station_view(&db, &query).await.unwrap();
        let order: Vec<&str> = view.rows.iter().map(|r| r.assignment.bundle.as_str()).collect();
        assert_eq!(order, vec!["B2", "B10", "B1"]);
        assert!(view.rows[0].station_completed);

        query.station = "sierra".into();
        query.show_completed = false;
        assert!(station_view(&db, &query).await.unwrap().rows.is_empty());
    }

    #[tokio::test]
    async fn test_progress_sums_feet() {
        let dir = tempfile::tempdir().unwrap();
        let db = initialize_database(&dir.path().join("t.db")).await.unwrap();
        seed(&db, "J1", "B1", 1000.0, true).await;
        seed(&db, "J1", "B2", 750.0, true).await;
        seed(&db, "J1", "B3", 400.0, false).await;

        let now = day().and_hms_opt(11, 5, 0).unwrap();
        let res = progress(&db, &ProductionWindow::default(), 1, day(), "mesa", now)
            .await
            .unwrap();
        assert_eq!(res.completed_feet, 1750.0);
        assert_eq!(res.pending_feet, 400.0);
        assert!((res.progress.target_feet - 1750.0).abs() < 1e-9);
        assert!((res.progress.percentage - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_dates_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let db = initialize_database(&dir.path().join("t.db")).await.unwrap();
        for d in [2, 5, 3, 5] {
            let date = NaiveDate::from_ymd_opt(2026, 3, d).unwrap();
            let a = LineAssignment::new("J".into(), format!("B{d}-{}", uuid::Uuid::new_v4()), 1, date, 1.0, &stations());
            a003_line_assignment::repository::insert(&db, &a).await.unwrap();
        }
        let res = dates(&db, 1).await.unwrap();
        let days: Vec<u32> = res.dates.iter().map(|d| chrono::Datelike::day(d)).collect();
        assert_eq!(days, vec![5, 3, 2]);
        assert!(dates(&db, 2).await.unwrap().dates.is_empty());
    }
}
