//! The per-screen compositions the dashboard repeats: assemble a collection,
//! scope it, derive the numbers the cards and dialogs show.

pub mod expenses;
pub mod progress;
pub mod receipts;
pub mod stock;

pub use expenses::ExpenseScreen;
pub use progress::{progress_board, ProgressBoard, SiteProgress};
pub use receipts::{ReceiptHistory, ReceiptHistoryScreen};
pub use stock::{stock_overview, StockOverview, StockRow};
