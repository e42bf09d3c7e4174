//! Report commands.

use super::tracking::print_stats;
use crate::routine::{self, WEEKLY_STATS_DAYS};
use crate::state::AppState;
use chrono::Local;

/// Render today's report.
pub async fn cmd_report(state: &AppState) -> anyhow::Result<()> {
    let path = state.reports.render_daily(Local::now().date_naive()).await?;
    println!("Report generated: {}", path.display());
    Ok(())
}

/// Render and send the weekly report, then print the week's statistics.
pub async fn cmd_weekly(state: &AppState) -> anyhow::Result<()> {
    let (path, _) = routine::weekly_review(state, Local::now().date_naive()).await?;
    println!("Report generated: {}", path.display());
    print_stats(state, WEEKLY_STATS_DAYS).await
}
