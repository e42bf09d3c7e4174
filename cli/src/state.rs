//! Application state shared by every command.

use anyhow::Context;
use jobtrail_auth::SessionStore;
use jobtrail_core::AppConfig;
use jobtrail_db::Database;
use jobtrail_mail::Notifier;
use jobtrail_reports::ReportRenderer;

/// Configuration plus the opened stores and collaborators.
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
    pub notifier: Notifier,
    pub reports: ReportRenderer,
    pub session_store: SessionStore,
}

impl AppState {
    /// Open the record store and build the collaborators from `config`.
    ///
    /// Creates the database file and runs migrations on first use.
    pub async fn open(config: AppConfig) -> anyhow::Result<Self> {
        let db_path = config.paths.database_path()?;
        tracing::info!("Database: {}", db_path.display());

        let db = Database::open_and_migrate(&db_path)
            .await
            .with_context(|| format!("failed to open database at {}", db_path.display()))?;
        let notifier = Notifier::from_config(&config.notifications);
        let reports = ReportRenderer::new(db.clone(), config.paths.reports_path()?);
        let session_store = SessionStore::new(config.paths.session_path()?);

        Ok(Self::from_parts(config, db, notifier, reports, session_store))
    }

    pub fn from_parts(
        config: AppConfig,
        db: Database,
        notifier: Notifier,
        reports: ReportRenderer,
        session_store: SessionStore,
    ) -> Self {
        Self {
            config,
            db,
            notifier,
            reports,
            session_store,
        }
    }
}
