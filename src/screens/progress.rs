use serde::Serialize;

use crate::aggregate::{fetch_all, DEFAULT_PAGE_SIZE};
use crate::client::ApiClient;
use crate::error::{AppError, AppResult};
use crate::metrics::{
    budget_utilization, composite_progress, work_status_counts, ProgressInputs,
};
use crate::model::{Site, WorkEntry, WorkStatus};

/// One site's card on the progress board.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProgress {
    pub site: Site,
    /// The weighted composite score the dashboard headlines.
    pub score: u8,
    pub status_counts: Vec<(WorkStatus, usize)>,
    pub open_entries: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBoard {
    pub sites: Vec<SiteProgress>,
    pub complete: bool,
}

pub(crate) fn progress_inputs(site: &Site) -> ProgressInputs {
    ProgressInputs {
        budget_utilization: budget_utilization(site.spent, site.budget),
        timeline: site.timeline_progress,
        milestone: site.milestone_progress,
        quality: site.quality_score,
    }
}

/// Assemble the progress board: every site scored, with its work entries
/// tallied by status.
pub async fn progress_board(client: &ApiClient) -> AppResult<ProgressBoard> {
    let sites = fetch_all::<Site>(client, &Site::RESOURCE, DEFAULT_PAGE_SIZE, &[])
        .await
        .map_err(|err| AppError::from(err).with_context("screen", "progress"))?;
    let entries = fetch_all::<WorkEntry>(client, &WorkEntry::RESOURCE, DEFAULT_PAGE_SIZE, &[])
        .await
        .map_err(|err| AppError::from(err).with_context("screen", "progress"))?;

    let cards = sites
        .items
        .into_iter()
        .map(|site| {
            let scoped: Vec<WorkEntry> = entries
                .items
                .iter()
                .filter(|e| e.site_id.as_deref() == Some(site.id.as_str()))
                .cloned()
                .collect();
            let open_entries = scoped
                .iter()
                .filter(|e| e.status != WorkStatus::Completed)
                .count();
            SiteProgress {
                score: composite_progress(&progress_inputs(&site)),
                status_counts: work_status_counts(&scoped),
                open_entries,
                site,
            }
        })
        .collect();

    Ok(ProgressBoard {
        sites: cards,
        complete: sites.complete && entries.complete,
    })
}
