//! Jobtrail Scheduler
//!
//! Local wall-clock timetable for the daily routine, interview checks and
//! the weekly review.

pub mod jobs;
pub mod scheduler;

pub use jobs::{default_jobs, JobType, ScheduledJob};
pub use scheduler::{is_job_due, next_due, run_forever, Schedule, POLL_INTERVAL};
