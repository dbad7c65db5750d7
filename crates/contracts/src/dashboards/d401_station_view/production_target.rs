use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHIFT_START: (u32, u32) = (6, 0);
pub const DEFAULT_SHIFT_END: (u32, u32) = (16, 10);
pub const DEFAULT_DAILY_GOAL_FEET: f64 = 3500.0;

/// Shift window and the lineal feet a line is expected to finish in it.
/// The target grows linearly from 0 at `start` to `daily_goal_feet` at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductionWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub daily_goal_feet: f64,
}

impl Default for ProductionWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(DEFAULT_SHIFT_START.0, DEFAULT_SHIFT_START.1, 0)
                .unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(DEFAULT_SHIFT_END.0, DEFAULT_SHIFT_END.1, 0)
                .unwrap_or(NaiveTime::MIN),
            daily_goal_feet: DEFAULT_DAILY_GOAL_FEET,
        }
    }
}

/// Figures shown on the station progress bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionProgress {
    pub date: NaiveDate,
    pub window_minutes: i64,
    pub elapsed_minutes: i64,
    pub daily_goal_feet: f64,
    pub target_feet: f64,
    pub completed_feet: f64,
    pub remaining_feet: f64,
    /// Completed share of the current target, in percent
    pub percentage: f64,
    /// Feet per hour since the shift opened
    pub rate_per_hour: f64,
    pub estimated_finish: Option<NaiveDateTime>,
}

impl ProductionWindow {
    pub fn new(start: NaiveTime, end: NaiveTime, daily_goal_feet: f64) -> Result<Self, String> {
        if end <= start {
            return Err(format!("Shift end {} must be after start {}", end, start));
        }
        if !daily_goal_feet.is_finite() || daily_goal_feet < 0.0 {
            return Err(format!("Invalid daily goal {}", daily_goal_feet));
        }
        Ok(Self {
            start,
            end,
            daily_goal_feet,
        })
    }

    pub fn window_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Minutes of the window that have passed for `date` as seen at `now`.
    /// Past dates count the whole window, future dates none.
    pub fn elapsed_minutes(&self, date: NaiveDate, now: NaiveDateTime) -> i64 {
        let today = now.date();
        if date < today {
            return self.window_minutes();
        }
        if date > today {
            return 0;
        }
        let time = now.time();
        if time <= self.start {
            0
        } else if time >= self.end {
            self.window_minutes()
        } else {
            (time - self.start).num_minutes()
        }
    }

    pub fn target_feet(&self, date: NaiveDate, now: NaiveDateTime) -> f64 {
        let window = self.window_minutes();
        if window <= 0 {
            return 0.0;
        }
        let elapsed = self.elapsed_minutes(date, now);
        (self.daily_goal_feet * elapsed as f64 / window as f64).clamp(0.0, self.daily_goal_feet)
    }

    pub fn progress(&self, date: NaiveDate, now: NaiveDateTime, completed_feet: f64) -> ProductionProgress {
        let elapsed = self.elapsed_minutes(date, now);
        let target = self.target_feet(date, now);
        let remaining = (self.daily_goal_feet - completed_feet).max(0.0);

        let percentage = if target > 0.0 {
            completed_feet / target * 100.0
        } else {
            0.0
        };

        let elapsed_hours = elapsed as f64 / 60.0;
        let rate = if elapsed_hours > 0.0 {
            completed_feet / elapsed_hours
        } else {
            0.0
        };

        let estimated_finish = if rate > 0.0 && remaining > 0.0 {
            let minutes = (remaining / rate * 60.0).round() as i64;
            Some(now + Duration::minutes(minutes))
        } else {
            None
        };

        ProductionProgress {
            date,
            window_minutes: self.window_minutes(),
            elapsed_minutes: elapsed,
            daily_goal_feet: self.daily_goal_feet,
            target_feet: target,
            completed_feet,
            remaining_feet: remaining,
            percentage,
            rate_per_hour: rate,
            estimated_finish,
        }
    }
}
