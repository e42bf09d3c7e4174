//! Easy-Apply state machine.
//!
//! One listing is driven through at most `max_steps` form steps. Each step
//! fills the fields it knows, attaches the resume, then either stops on
//! empty required inputs, submits, advances, or gives up. Submit is
//! preferred over next when both are present.

use crate::controls;
use crate::error::Result;
use crate::evidence::{EvidenceKind, EvidenceRecorder};
use crate::outcome::{ApplicationOutcome, ManualReason};
use chrono::Local;
use jobtrail_browser::{first_match, BrowserActions, Matcher, Pacing};
use jobtrail_core::{AppConfig, ApplicationConfig, ConfigResult, ListingRecord, ProfileConfig};
use std::path::PathBuf;
use std::time::Duration;

/// What the current step offers.
enum StepAction<E> {
    Submit(E),
    Next(E),
    DeadEnd,
}

/// Applies to listings through the site's in-page application flow.
pub struct EasyApplier {
    profile: ProfileConfig,
    resume: Option<PathBuf>,
    max_steps: u32,
    nav_timeout: Duration,
    pacing: Pacing,
    evidence: EvidenceRecorder,
}

impl EasyApplier {
    pub fn new(
        application: &ApplicationConfig,
        profile: ProfileConfig,
        nav_timeout: Duration,
        pacing: Pacing,
        evidence: EvidenceRecorder,
    ) -> Self {
        Self {
            profile,
            resume: application.resume_path.clone(),
            max_steps: application.max_steps,
            nav_timeout,
            pacing,
            evidence,
        }
    }

    /// Build from the application, profile, browser and pacing sections.
    pub fn from_config(config: &AppConfig) -> ConfigResult<Self> {
        Ok(Self::new(
            &config.application,
            config.profile.clone(),
            config.browser.timeout(),
            Pacing::new(config.pacing.clone()),
            EvidenceRecorder::new(config.paths.screenshots_path()?),
        ))
    }

    /// Apply to one listing.
    ///
    /// Never fails: driver errors become an `Error` outcome carrying a
    /// best-effort snapshot.
    pub async fn apply<B>(&self, browser: &B, listing: &ListingRecord) -> ApplicationOutcome
    where
        B: BrowserActions + ?Sized,
    {
        tracing::info!(
            title = listing.title(),
            company = listing.company(),
            url = listing.url(),
            "Applying"
        );

        match self.try_apply(browser, listing).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(url = listing.url(), "Application error: {}", e);
                ApplicationOutcome::Error {
                    message: e.to_string(),
                    evidence: self
                        .evidence
                        .capture(browser, EvidenceKind::Error, listing.company())
                        .await,
                }
            }
        }
    }

    async fn try_apply<B>(&self, browser: &B, listing: &ListingRecord) -> Result<ApplicationOutcome>
    where
        B: BrowserActions + ?Sized,
    {
        browser.navigate(listing.url(), self.nav_timeout).await?;
        self.pacing.pause(self.pacing.config().page_settle_ms).await;

        let Some(entry) = first_match(browser, controls::EASY_APPLY).await? else {
            tracing::info!(url = listing.url(), "No Easy Apply available");
            return Ok(ApplicationOutcome::ManualRequired {
                reason: ManualReason::NoEasyApply,
                evidence: self
                    .evidence
                    .capture(browser, EvidenceKind::Manual, listing.company())
                    .await,
            });
        };

        browser.click(&entry).await?;
        self.pacing.pause(self.pacing.config().open_form_ms).await;
        self.walk_form(browser, listing).await
    }

    /// Walk an already opened application form to a terminal outcome.
    pub async fn walk_form<B>(&self, browser: &B, listing: &ListingRecord) -> Result<ApplicationOutcome>
    where
        B: BrowserActions + ?Sized,
    {
        let company = listing.company();

        for step in 1..=self.max_steps {
            tracing::debug!(url = listing.url(), step, "Processing step");

            self.fill_if_present(browser, controls::PHONE, &self.profile.phone, "phone")
                .await;
            self.fill_if_present(browser, controls::CITY, &self.profile.city, "city")
                .await;
            self.attach_resume(browser).await;

            let unfilled = unfilled_required(browser).await?;
            if unfilled > 0 {
                tracing::warn!(
                    url = listing.url(),
                    step,
                    unfilled,
                    "Required fields need manual input"
                );
                return Ok(ApplicationOutcome::ManualRequired {
                    reason: ManualReason::RequiredFields(unfilled),
                    evidence: self
                        .evidence
                        .capture(browser, EvidenceKind::ManualInput, company)
                        .await,
                });
            }

            match next_action(browser).await? {
                StepAction::Submit(button) => {
                    tracing::info!(url = listing.url(), step, "Submitting application");
                    browser.click(&button).await?;
                    self.pacing.pause(self.pacing.config().submit_ms).await;
                    let evidence = self
                        .evidence
                        .capture(browser, EvidenceKind::Success, company)
                        .await;
                    tracing::info!(url = listing.url(), "Application submitted");
                    return Ok(ApplicationOutcome::Applied {
                        timestamp: Local::now(),
                        evidence,
                    });
                }
                StepAction::Next(button) => {
                    browser.click(&button).await?;
                    self.pacing.pause(self.pacing.config().next_step_ms).await;
                }
                StepAction::DeadEnd => {
                    tracing::warn!(url = listing.url(), step, "No next or submit control found");
                    break;
                }
            }
        }

        tracing::warn!(url = listing.url(), "Application flow incomplete");
        Ok(ApplicationOutcome::Incomplete {
            evidence: self
                .evidence
                .capture(browser, EvidenceKind::Incomplete, company)
                .await,
        })
    }

    /// Fill the first field matched by `matchers`, if one exists and takes
    /// the value. Returns whether the value went in.
    async fn fill_if_present<B>(&self, browser: &B, matchers: &[Matcher], value: &str, label: &str) -> bool
    where
        B: BrowserActions + ?Sized,
    {
        if value.is_empty() {
            return false;
        }
        let Some(field) = probe(browser, matchers).await else {
            return false;
        };
        match browser.fill(&field, value).await {
            Ok(()) => {
                tracing::debug!("Filled {}", label);
                true
            }
            Err(e) => {
                tracing::debug!("Could not fill {}: {}", label, e);
                false
            }
        }
    }

    /// Upload the resume when the step has a file input and the file exists.
    async fn attach_resume<B>(&self, browser: &B) -> bool
    where
        B: BrowserActions + ?Sized,
    {
        let Some(resume) = self.resume.as_ref().filter(|p| p.is_file()) else {
            return false;
        };
        let Some(input) = probe(browser, controls::RESUME_UPLOAD).await else {
            return false;
        };
        match browser.set_input_files(&input, std::slice::from_ref(resume)).await {
            Ok(()) => {
                tracing::debug!(path = %resume.display(), "Uploaded resume");
                self.pacing.pause(self.pacing.config().upload_ms).await;
                true
            }
            Err(e) => {
                tracing::debug!("Could not upload resume: {}", e);
                false
            }
        }
    }
}

/// Look up an optional control. Lookup failures count as absent.
async fn probe<B>(browser: &B, matchers: &[Matcher]) -> Option<B::Element>
where
    B: BrowserActions + ?Sized,
{
    match first_match(browser, matchers).await {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!("Probe failed: {}", e);
            None
        }
    }
}

/// Number of required inputs on the page that are still empty.
async fn unfilled_required<B>(browser: &B) -> Result<usize>
where
    B: BrowserActions + ?Sized,
{
    let mut unfilled = 0;
    for field in browser.find_all(controls::REQUIRED_FIELDS).await? {
        if browser.input_value(&field).await?.is_empty() {
            unfilled += 1;
        }
    }
    Ok(unfilled)
}

async fn next_action<B>(browser: &B) -> Result<StepAction<B::Element>>
where
    B: BrowserActions + ?Sized,
{
    if let Some(submit) = first_match(browser, controls::SUBMIT).await? {
        return Ok(StepAction::Submit(submit));
    }
    if let Some(next) = first_match(browser, controls::NEXT).await? {
        return Ok(StepAction::Next(next));
    }
    Ok(StepAction::DeadEnd)
}
