use std::sync::Arc;

use chrono::NaiveDate;

use crate::aggregate::{fetch_all, DEFAULT_PAGE_SIZE};
use crate::client::ApiClient;
use crate::error::{AppError, AppResult};
use crate::metrics::{expense_breakdown, CategoryBreakdown};
use crate::model::{Expense, ExpenseField};
use crate::table::{Criterion, TableState, TableView};

/// The expenses page: the assembled expense collection plus the table state
/// driving it. Summary cards are derived from the *filtered* subset, so they
/// always agree with the rows on screen.
pub struct ExpenseScreen {
    client: Arc<ApiClient>,
    expenses: Vec<Expense>,
    complete: bool,
    pub table: TableState<Expense>,
}

impl ExpenseScreen {
    pub fn new(client: Arc<ApiClient>) -> Self {
        ExpenseScreen {
            client,
            expenses: Vec::new(),
            complete: true,
            table: TableState::new(),
        }
    }

    /// Rebuild the collection from the backend. Filter state survives a
    /// refresh; the collection never does.
    pub async fn refresh(&mut self) -> AppResult<()> {
        let aggregate =
            fetch_all::<Expense>(&self.client, &Expense::RESOURCE, DEFAULT_PAGE_SIZE, &[])
                .await
                .map_err(|err| AppError::from(err).with_context("screen", "expenses"))?;
        self.expenses = aggregate.items;
        self.complete = aggregate.complete;
        Ok(())
    }

    /// Whether the last refresh got every page the backend promised.
    pub fn complete(&self) -> bool {
        self.complete
    }

    pub fn set_date_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.table
            .set_filter(ExpenseField::Date, Criterion::DateRange { from, to });
    }

    /// Category filter; the sentinel `"all"` clears it.
    pub fn set_category(&mut self, category: &str) {
        if category.eq_ignore_ascii_case("all") {
            self.table.clear_filter(ExpenseField::Category);
        } else {
            self.table
                .set_filter(ExpenseField::Category, Criterion::Equals(category.into()));
        }
    }

    pub fn set_site(&mut self, site_id: &str) {
        if site_id.eq_ignore_ascii_case("all") {
            self.table.clear_filter(ExpenseField::Site);
        } else {
            self.table
                .set_filter(ExpenseField::Site, Criterion::Equals(site_id.into()));
        }
    }

    pub fn view(&self) -> TableView<'_, Expense> {
        self.table.view(&self.expenses)
    }

    fn filtered(&self) -> Vec<Expense> {
        self.expenses
            .iter()
            .filter(|e| self.table.filters().matches(*e))
            .cloned()
            .collect()
    }

    /// Category breakdown over the filtered (not paged) subset.
    pub fn summary(&self) -> CategoryBreakdown {
        expense_breakdown(&self.filtered())
    }
}
