//! Job type definitions.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum JobType {
    /// Scrape, save, apply, then follow-ups and the daily report
    DailyRoutine,
    /// Remind about interviews in the next two days
    InterviewCheck,
    /// Weekly report and seven-day stats
    WeeklyReview,
}

impl JobType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DailyRoutine => "daily routine",
            Self::InterviewCheck => "interview check",
            Self::WeeklyReview => "weekly review",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job pinned to a local wall-clock time, daily or on one weekday.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledJob {
    pub job_type: JobType,
    pub at: NaiveTime,
    /// `None` runs every day
    pub weekday: Option<Weekday>,
}

impl ScheduledJob {
    /// Every day at `hour:minute`. Out-of-range values clamp to midnight.
    #[must_use]
    pub fn daily(job_type: JobType, hour: u32, minute: u32) -> Self {
        Self {
            job_type,
            at: NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN),
            weekday: None,
        }
    }

    /// Every `weekday` at `hour:minute`.
    #[must_use]
    pub fn weekly(job_type: JobType, weekday: Weekday, hour: u32, minute: u32) -> Self {
        Self {
            weekday: Some(weekday),
            ..Self::daily(job_type, hour, minute)
        }
    }

    /// The first run strictly after `after`.
    #[must_use]
    pub fn next_occurrence(&self, after: NaiveDateTime) -> NaiveDateTime {
        let date = after.date();
        match self.weekday {
            None => {
                let today = date.and_time(self.at);
                if today > after {
                    today
                } else {
                    today + Duration::days(1)
                }
            }
            Some(weekday) => {
                let ahead = (7 + i64::from(weekday.num_days_from_monday())
                    - i64::from(date.weekday().num_days_from_monday()))
                    % 7;
                let candidate = (date + Duration::days(ahead)).and_time(self.at);
                if candidate > after {
                    candidate
                } else {
                    candidate + Duration::weeks(1)
                }
            }
        }
    }
}

impl fmt::Display for ScheduledJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.weekday {
            Some(day) => write!(f, "every {day} at {}: {}", self.at.format("%H:%M"), self.job_type),
            None => write!(f, "every day at {}: {}", self.at.format("%H:%M"), self.job_type),
        }
    }
}

/// The standing timetable: daily routine at 08:00, interview checks at
/// 09:00, 13:00 and 16:00, weekly review on Monday at 09:00.
#[must_use]
pub fn default_jobs() -> Vec<ScheduledJob> {
    vec![
        ScheduledJob::daily(JobType::DailyRoutine, 8, 0),
        ScheduledJob::daily(JobType::InterviewCheck, 9, 0),
        ScheduledJob::daily(JobType::InterviewCheck, 13, 0),
        ScheduledJob::daily(JobType::InterviewCheck, 16, 0),
        ScheduledJob::weekly(JobType::WeeklyReview, Weekday::Mon, 9, 0),
    ]
}
