use chrono::NaiveDate;
use jobtrail_core::ApplicationStatus;
use serde::Serialize;
use std::path::PathBuf;

/// A rendered message, before addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationKind {
    FollowUpReminder,
    InterviewReminder,
    DailyReport,
    WeeklyReport,
    ApplicationUpdate,
}

/// Something worth telling the user about, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    FollowUpReminder {
        job_title: String,
        company: String,
        discovered: NaiveDate,
        status: ApplicationStatus,
        url: String,
    },
    InterviewReminder {
        job_title: String,
        company: String,
        date: NaiveDate,
        notes: Option<String>,
    },
    DailyReport {
        date: NaiveDate,
        report_path: PathBuf,
    },
    WeeklyReport {
        date: NaiveDate,
        report_path: PathBuf,
    },
    ApplicationUpdate {
        job_title: String,
        company: String,
        location: String,
        status: ApplicationStatus,
    },
}

const FOLLOW_UP_SUBJECT: &str = "Follow-up Reminder: {{job_title}}";
const FOLLOW_UP_BODY: &str = "It's time to follow up on your application!

Job: {{job_title}}
Company: {{company}}
Tracked since: {{discovered}}
Status: {{status}}

Consider reaching out to the hiring manager or checking the application status.

Job URL: {{url}}
";

const INTERVIEW_SUBJECT: &str = "Interview Reminder: {{job_title}}";
const INTERVIEW_BODY: &str = "You have an upcoming interview!

Job: {{job_title}}
Company: {{company}}
Date: {{date}}

Notes: {{notes}}

Good luck!
";

const DAILY_SUBJECT: &str = "Daily Job Application Report - {{date}}";
const DAILY_BODY: &str = "Your daily job application report is ready!

Report location: {{report_path}}
";

const WEEKLY_SUBJECT: &str = "Weekly Job Application Summary - {{date}}";
const WEEKLY_BODY: &str = "Your weekly job application summary is ready!

Report location: {{report_path}}

Review your progress and adjust your strategy as needed.
";

const UPDATE_SUBJECT: &str = "Application {{status}}: {{job_title}}";
const APPLIED_BODY: &str = "Successfully applied to:

Job: {{job_title}}
Company: {{company}}
Location: {{location}}

Your application has been submitted!
";
const ERROR_BODY: &str = "Application Error:

Job: {{job_title}}
Company: {{company}}

There was an error applying to this position. Please check manually.
";
const UPDATE_BODY: &str = "Job Application Update:

Job: {{job_title}}
Company: {{company}}
Status: {{status}}
";

/// Substitutes `{{field_name}}` placeholders with the given values.
#[must_use]
pub fn render_template(template: &str, fields: &[(&str, String)]) -> String {
    fields.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{{{key}}}}}"), value)
    })
}

impl Notification {
    #[must_use]
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::FollowUpReminder { .. } => NotificationKind::FollowUpReminder,
            Self::InterviewReminder { .. } => NotificationKind::InterviewReminder,
            Self::DailyReport { .. } => NotificationKind::DailyReport,
            Self::WeeklyReport { .. } => NotificationKind::WeeklyReport,
            Self::ApplicationUpdate { .. } => NotificationKind::ApplicationUpdate,
        }
    }

    /// Render subject and body.
    #[must_use]
    pub fn render(&self) -> EmailTemplate {
        let (subject, body, fields) = match self {
            Self::FollowUpReminder {
                job_title,
                company,
                discovered,
                status,
                url,
            } => (
                FOLLOW_UP_SUBJECT,
                FOLLOW_UP_BODY,
                vec![
                    ("job_title", job_title.clone()),
                    ("company", company.clone()),
                    ("discovered", discovered.to_string()),
                    ("status", status.as_str().to_string()),
                    ("url", url.clone()),
                ],
            ),
            Self::InterviewReminder {
                job_title,
                company,
                date,
                notes,
            } => (
                INTERVIEW_SUBJECT,
                INTERVIEW_BODY,
                vec![
                    ("job_title", job_title.clone()),
                    ("company", company.clone()),
                    ("date", date.to_string()),
                    (
                        "notes",
                        notes
                            .clone()
                            .filter(|n| !n.is_empty())
                            .unwrap_or_else(|| "No notes".to_string()),
                    ),
                ],
            ),
            Self::DailyReport { date, report_path } => (
                DAILY_SUBJECT,
                DAILY_BODY,
                vec![
                    ("date", date.to_string()),
                    ("report_path", report_path.display().to_string()),
                ],
            ),
            Self::WeeklyReport { date, report_path } => (
                WEEKLY_SUBJECT,
                WEEKLY_BODY,
                vec![
                    ("date", date.to_string()),
                    ("report_path", report_path.display().to_string()),
                ],
            ),
            Self::ApplicationUpdate {
                job_title,
                company,
                location,
                status,
            } => {
                let body = match status {
                    ApplicationStatus::Applied => APPLIED_BODY,
                    ApplicationStatus::ApplicationError => ERROR_BODY,
                    _ => UPDATE_BODY,
                };
                (
                    UPDATE_SUBJECT,
                    body,
                    vec![
                        ("job_title", job_title.clone()),
                        ("company", company.clone()),
                        ("location", location.clone()),
                        ("status", status.as_str().to_string()),
                    ],
                )
            }
        };

        EmailTemplate {
            subject: render_template(subject, &fields),
            body: render_template(body, &fields),
        }
    }
}
