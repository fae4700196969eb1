use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::{fetch_all, DEFAULT_PAGE_SIZE};
use crate::catalog::Catalog;
use crate::client::ApiClient;
use crate::error::{AppError, AppResult};
use crate::metrics::is_low_stock;
use crate::model::{MaterialReceipt, MaterialUsage};

/// One material's stock position: deliveries in, usage out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub material_id: String,
    pub material_name: String,
    pub received: f64,
    pub used: f64,
    /// Net quantity, floored at zero for display.
    pub available: f64,
    pub reorder_level: f64,
    pub low: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockOverview {
    pub rows: Vec<StockRow>,
    /// Names of materials at or below their reorder level.
    pub alerts: Vec<String>,
    pub complete: bool,
}

/// Build the stock overview: every catalog material joined with its receipt
/// and usage totals. Uses the catalog as the row source so materials with no
/// movement still show up (at zero, possibly already low).
pub async fn stock_overview(client: &ApiClient, catalog: &Catalog) -> AppResult<StockOverview> {
    let receipts = fetch_all::<MaterialReceipt>(
        client,
        &MaterialReceipt::RESOURCE,
        DEFAULT_PAGE_SIZE,
        &[],
    )
    .await
    .map_err(|err| AppError::from(err).with_context("screen", "stock"))?;
    let usage = fetch_all::<MaterialUsage>(client, &MaterialUsage::RESOURCE, DEFAULT_PAGE_SIZE, &[])
        .await
        .map_err(|err| AppError::from(err).with_context("screen", "stock"))?;

    let mut received: HashMap<&str, f64> = HashMap::new();
    for receipt in &receipts.items {
        *received.entry(receipt.material_id.as_str()).or_default() += receipt.quantity;
    }
    let mut used: HashMap<&str, f64> = HashMap::new();
    for entry in &usage.items {
        *used.entry(entry.material_id.as_str()).or_default() += entry.quantity;
    }

    let mut rows: Vec<StockRow> = catalog
        .materials()
        .map(|material| {
            let received = received.get(material.id.as_str()).copied().unwrap_or(0.0);
            let used = used.get(material.id.as_str()).copied().unwrap_or(0.0);
            let net = received - used;
            StockRow {
                material_id: material.id.clone(),
                material_name: material.name.clone(),
                received,
                used,
                available: net.max(0.0),
                reorder_level: material.reorder_level,
                low: is_low_stock(net, material.reorder_level),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.material_name.cmp(&b.material_name));

    let alerts = rows
        .iter()
        .filter(|row| row.low)
        .map(|row| row.material_name.clone())
        .collect();

    Ok(StockOverview {
        alerts,
        complete: receipts.complete && usage.complete,
        rows,
    })
}
