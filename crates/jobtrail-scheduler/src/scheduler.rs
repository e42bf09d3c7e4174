//! Job scheduling: determines which job runs next and when.

use crate::jobs::{JobType, ScheduledJob};
use chrono::{Local, NaiveDateTime};
use std::future::Future;
use std::time::Duration;

/// Longest single sleep, so wall-clock jumps are noticed.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Returns true if `next_run_at` is not after `now`.
#[must_use]
pub fn is_job_due(next_run_at: NaiveDateTime, now: NaiveDateTime) -> bool {
    next_run_at <= now
}

/// The job with the earliest occurrence after `now`, and that occurrence.
///
/// Ties go to the job listed first.
#[must_use]
pub fn next_due(jobs: &[ScheduledJob], now: NaiveDateTime) -> Option<(&ScheduledJob, NaiveDateTime)> {
    jobs.iter()
        .map(|job| (job, job.next_occurrence(now)))
        .min_by_key(|(_, when)| *when)
}

/// Per-job next-run bookkeeping.
///
/// Each job keeps its own pending slot, so jobs sharing a slot all run even
/// when an earlier one overruns it.
#[derive(Debug, Clone)]
pub struct Schedule {
    entries: Vec<(ScheduledJob, NaiveDateTime)>,
}

impl Schedule {
    #[must_use]
    pub fn new(jobs: &[ScheduledJob], now: NaiveDateTime) -> Self {
        Self {
            entries: jobs
                .iter()
                .map(|job| (*job, job.next_occurrence(now)))
                .collect(),
        }
    }

    /// The earliest pending job without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<(&ScheduledJob, NaiveDateTime)> {
        self.entries
            .iter()
            .min_by_key(|(_, when)| *when)
            .map(|(job, when)| (job, *when))
    }

    /// Take the earliest job if it is due, rescheduling it past `now`.
    pub fn take_due(&mut self, now: NaiveDateTime) -> Option<JobType> {
        let (idx, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, (_, when))| is_job_due(*when, now))
            .min_by_key(|(_, (_, when))| *when)?;

        let entry = &mut self.entries[idx];
        entry.1 = entry.0.next_occurrence(now);
        Some(entry.0.job_type)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &ScheduledJob> {
        self.entries.iter().map(|(job, _)| job)
    }
}

/// Run jobs at their local wall-clock times, one at a time, forever.
pub async fn run_forever<F, Fut>(jobs: &[ScheduledJob], mut run: F)
where
    F: FnMut(JobType) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut schedule = Schedule::new(jobs, Local::now().naive_local());

    loop {
        let now = Local::now().naive_local();
        if let Some(job_type) = schedule.take_due(now) {
            tracing::info!(job = %job_type, "Running scheduled job");
            run(job_type).await;
            continue;
        }

        let Some((job, when)) = schedule.peek() else {
            tracing::warn!("Nothing scheduled");
            return;
        };
        let wait = (when - now).to_std().unwrap_or_default().min(POLL_INTERVAL);
        tracing::debug!(job = %job.job_type, next = %when, "Waiting for next job");
        tokio::time::sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::default_jobs;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, min: u32) -> NaiveDateTime {
        // March 2025; the 10th is a Monday
        NaiveDate::from_ymd_opt(2025, 3, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid test timestamp")
    }

    #[test]
    fn test_job_is_due_past_next_run() {
        assert!(is_job_due(at(10, 11, 0), at(10, 12, 0)));
        assert!(is_job_due(at(10, 12, 0), at(10, 12, 0)));
    }

    #[test]
    fn test_job_not_due_future_next_run() {
        assert!(!is_job_due(at(10, 13, 0), at(10, 12, 0)));
    }

    #[test]
    fn test_next_due_picks_earliest() {
        let jobs = default_jobs();
        let (job, when) = next_due(&jobs, at(5, 10, 0)).expect("jobs scheduled");
        assert_eq!(job.job_type, JobType::InterviewCheck);
        assert_eq!(when, at(5, 13, 0));

        let (job, when) = next_due(&jobs, at(5, 16, 30)).expect("jobs scheduled");
        assert_eq!(job.job_type, JobType::DailyRoutine);
        assert_eq!(when, at(6, 8, 0));
    }

    #[test]
    fn test_next_due_empty() {
        assert!(next_due(&[], at(5, 10, 0)).is_none());
    }

    #[test]
    fn test_schedule_runs_shared_slot_jobs() {
        let jobs = default_jobs();
        let mut schedule = Schedule::new(&jobs, at(10, 8, 30));
        assert!(schedule.take_due(at(10, 8, 59)).is_none());

        // Monday 09:00 holds an interview check and the weekly review; the
        // first overruns to 09:20 and the second still runs
        assert_eq!(schedule.take_due(at(10, 9, 0)), Some(JobType::InterviewCheck));
        assert_eq!(schedule.take_due(at(10, 9, 20)), Some(JobType::WeeklyReview));
        assert!(schedule.take_due(at(10, 9, 21)).is_none());

        let (job, when) = schedule.peek().expect("pending job");
        assert_eq!(job.job_type, JobType::InterviewCheck);
        assert_eq!(when, at(10, 13, 0));
    }

    #[test]
    fn test_schedule_reschedules_past_now() {
        let jobs = [ScheduledJob::daily(JobType::DailyRoutine, 8, 0)];
        let mut schedule = Schedule::new(&jobs, at(5, 7, 0));

        // Woke up two days late: runs once, next slot is tomorrow
        assert_eq!(schedule.take_due(at(7, 12, 0)), Some(JobType::DailyRoutine));
        assert!(schedule.take_due(at(7, 12, 1)).is_none());
        assert_eq!(schedule.peek().map(|(_, when)| when), Some(at(8, 8, 0)));
    }
}
