//! Pure aggregation functions over assembled collections. Everything here is
//! deterministic, allocation-light and total: malformed records contribute
//! zeros or land in the "other" bucket, they never fail the computation.

use serde::Serialize;

use crate::model::{Expense, ExpenseCategory, MaterialReceipt, WorkEntry, WorkStatus};

/// Quality sub-score assumed when a site has not been scored yet.
pub const DEFAULT_QUALITY_SCORE: f64 = 85.0;

const BUDGET_WEIGHT: f64 = 0.4;
const TIMELINE_WEIGHT: f64 = 0.3;
const MILESTONE_WEIGHT: f64 = 0.2;
const QUALITY_WEIGHT: f64 = 0.1;

/// Sub-scores feeding the composite site-progress figure, each on 0..=100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressInputs {
    pub budget_utilization: f64,
    pub timeline: f64,
    pub milestone: f64,
    pub quality: Option<f64>,
}

/// Percent of budget consumed; 0 when no budget is set.
pub fn budget_utilization(spent: f64, budget: f64) -> f64 {
    if budget == 0.0 {
        0.0
    } else {
        spent / budget * 100.0
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// The weighted composite progress score: 40% budget, 30% timeline, 20%
/// milestones, 10% quality. The weighting is a fixed business rule. Rounds
/// half away from zero, matching how the dashboard always displayed it.
pub fn composite_progress(inputs: &ProgressInputs) -> u8 {
    let quality = inputs.quality.unwrap_or(DEFAULT_QUALITY_SCORE);
    let weighted = clamp_score(inputs.budget_utilization) * BUDGET_WEIGHT
        + clamp_score(inputs.timeline) * TIMELINE_WEIGHT
        + clamp_score(inputs.milestone) * MILESTONE_WEIGHT
        + clamp_score(quality) * QUALITY_WEIGHT;
    weighted.round() as u8
}

/// One category's share of a breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub category: ExpenseCategory,
    pub total: f64,
    /// Share of the grand total, one decimal place; 0.0 when the grand total
    /// is zero.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub slices: Vec<CategorySlice>,
    pub grand_total: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Per-category totals and percentage shares over a set of expenses. Every
/// known category appears, zero or not, so summary cards line up.
pub fn expense_breakdown(expenses: &[Expense]) -> CategoryBreakdown {
    let mut totals = [0.0f64; ExpenseCategory::ALL.len()];
    for expense in expenses {
        let idx = ExpenseCategory::ALL
            .iter()
            .position(|c| *c == expense.category)
            .unwrap_or(ExpenseCategory::ALL.len() - 1);
        totals[idx] += expense.amount;
    }
    let grand_total: f64 = totals.iter().sum();

    let slices = ExpenseCategory::ALL
        .iter()
        .zip(totals)
        .map(|(category, total)| CategorySlice {
            category: *category,
            total,
            percent: if grand_total == 0.0 {
                0.0
            } else {
                round1(total / grand_total * 100.0)
            },
        })
        .collect();

    CategoryBreakdown {
        slices,
        grand_total,
    }
}

/// Work entries tallied per status, in declaration order.
pub fn work_status_counts(entries: &[WorkEntry]) -> Vec<(WorkStatus, usize)> {
    const STATUSES: [WorkStatus; 4] = [
        WorkStatus::Pending,
        WorkStatus::InProgress,
        WorkStatus::Completed,
        WorkStatus::Unknown,
    ];
    STATUSES
        .iter()
        .map(|status| {
            (
                *status,
                entries.iter().filter(|e| e.status == *status).count(),
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkedCounts {
    pub linked: usize,
    pub unlinked: usize,
}

/// Receipts partitioned on whether they reference the purchase that paid for
/// them.
pub fn purchase_link_counts(receipts: &[MaterialReceipt]) -> LinkedCounts {
    let linked = receipts.iter().filter(|r| r.purchase_id.is_some()).count();
    LinkedCounts {
        linked,
        unlinked: receipts.len() - linked,
    }
}

/// A material is low on stock when what is available has fallen to (or below)
/// its reorder level.
pub fn is_low_stock(available: f64, reorder_level: f64) -> bool {
    available <= reorder_level
}
