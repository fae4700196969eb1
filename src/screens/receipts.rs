use std::sync::Arc;

use serde::Serialize;

use crate::aggregate::{fetch_all, AggregatorHandle, DEFAULT_PAGE_SIZE};
use crate::client::ApiClient;
use crate::error::{AppError, AppResult};
use crate::metrics::{purchase_link_counts, LinkedCounts};
use crate::model::MaterialReceipt;

/// Everything the receipt-history dialog shows for one material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptHistory {
    pub material_id: String,
    pub receipts: Vec<MaterialReceipt>,
    /// False when a later receipts page failed and the history is best-effort.
    pub complete: bool,
    pub link_counts: LinkedCounts,
}

/// Backs the "receipt history" dialog: every open assembles the full receipt
/// listing from scratch and scopes it to the requested material. Opening for
/// a new material (or closing) supersedes any fetch still in flight, so a
/// slow response can never leak one material's receipts into another's
/// dialog.
pub struct ReceiptHistoryScreen {
    client: Arc<ApiClient>,
    handle: AggregatorHandle,
}

impl ReceiptHistoryScreen {
    pub fn new(client: Arc<ApiClient>) -> Self {
        ReceiptHistoryScreen {
            client,
            handle: AggregatorHandle::new(),
        }
    }

    /// Open the dialog for `material_id`. Returns `Ok(None)` when the run was
    /// superseded before it finished; the caller shows nothing in that case.
    pub async fn open(&self, material_id: &str) -> AppResult<Option<ReceiptHistory>> {
        let token = self.handle.begin();

        let aggregate = fetch_all::<MaterialReceipt>(
            &self.client,
            &MaterialReceipt::RESOURCE,
            DEFAULT_PAGE_SIZE,
            &[],
        )
        .await
        .map_err(|err| {
            AppError::from(err)
                .with_context("screen", "receipt-history")
                .with_context("material_id", material_id.to_string())
        })?;

        let receipts: Vec<MaterialReceipt> = aggregate
            .items
            .into_iter()
            .filter(|r| r.material_id == material_id)
            .collect();

        let history = ReceiptHistory {
            material_id: material_id.to_string(),
            complete: aggregate.complete,
            link_counts: purchase_link_counts(&receipts),
            receipts,
        };

        Ok(token.commit(history))
    }

    /// Closing the dialog invalidates whatever is still in flight.
    pub fn close(&self) {
        self.handle.invalidate();
    }
}
