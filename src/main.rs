use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use sitedesk::catalog::Catalog;
use sitedesk::client::{ApiClient, ClientConfig};
use sitedesk::screens::{progress_board, stock_overview, ExpenseScreen, ReceiptHistoryScreen};

#[derive(Debug, Parser)]
#[command(name = "sitedesk", about = "Construction-site dashboard data core", version)]
struct Cli {
    /// Backend base URL; falls back to SITEDESK_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Stock position per material, with low-stock alerts.
    Stock {
        /// Emit machine-readable JSON instead of the table view.
        #[arg(long)]
        json: bool,
    },
    /// Expense totals and category breakdown over an optional filter.
    Expenses {
        /// Earliest date to include (YYYY-MM-DD).
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest date to include (YYYY-MM-DD).
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Category name, or "all".
        #[arg(long)]
        category: Option<String>,
        /// Site id, or "all".
        #[arg(long)]
        site: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Composite progress score per site.
    Progress {
        #[arg(long)]
        json: bool,
    },
    /// Receipt history for one material.
    Receipts {
        material_id: String,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    sitedesk::init_logging();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let base_url = cli
        .base_url
        .or_else(|| std::env::var("SITEDESK_BASE_URL").ok())
        .context("--base-url or SITEDESK_BASE_URL is required")?;
    let config =
        ClientConfig::new(base_url).with_timeout(Duration::from_secs(cli.timeout_secs.max(1)));
    let client = Arc::new(ApiClient::new(&config)?);

    tracing::debug!(target: "sitedesk", base_url = client.base_url(), "client ready");

    let runtime = tokio::runtime::Runtime::new().context("start async runtime")?;
    runtime.block_on(handle_command(cli.command, client))
}

async fn handle_command(command: Commands, client: Arc<ApiClient>) -> Result<i32> {
    match command {
        Commands::Stock { json } => {
            let catalog = Catalog::load(&client).await?;
            let overview = stock_overview(&client, &catalog).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                println!(
                    "{:<28} {:>10} {:>10} {:>10} {:>10}",
                    "material", "received", "used", "available", "reorder"
                );
                for row in &overview.rows {
                    let marker = if row.low { "  LOW" } else { "" };
                    println!(
                        "{:<28} {:>10.1} {:>10.1} {:>10.1} {:>10.1}{marker}",
                        row.material_name, row.received, row.used, row.available, row.reorder_level
                    );
                }
                if !overview.complete {
                    eprintln!("warning: showing partial data (some pages failed to load)");
                }
            }
            Ok(0)
        }
        Commands::Expenses {
            from,
            to,
            category,
            site,
            json,
        } => {
            let mut screen = ExpenseScreen::new(client);
            screen.refresh().await?;
            if from.is_some() || to.is_some() {
                screen.set_date_range(from, to);
            }
            if let Some(category) = category.as_deref() {
                screen.set_category(category);
            }
            if let Some(site) = site.as_deref() {
                screen.set_site(site);
            }

            let summary = screen.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{:<12} {:>12} {:>7}", "category", "total", "share");
                for slice in &summary.slices {
                    println!(
                        "{:<12} {:>12.2} {:>6.1}%",
                        slice.category.as_str(),
                        slice.total,
                        slice.percent
                    );
                }
                println!("{:<12} {:>12.2}", "total", summary.grand_total);
                if !screen.complete() {
                    eprintln!("warning: showing partial data (some pages failed to load)");
                }
            }
            Ok(0)
        }
        Commands::Progress { json } => {
            let board = progress_board(&client).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                println!("{:<28} {:>6} {:>6} {:>11}", "site", "score", "open", "status");
                for card in &board.sites {
                    println!(
                        "{:<28} {:>5}% {:>6} {:>11}",
                        card.site.name,
                        card.score,
                        card.open_entries,
                        card.site.status.as_str()
                    );
                }
                if !board.complete {
                    eprintln!("warning: showing partial data (some pages failed to load)");
                }
            }
            Ok(0)
        }
        Commands::Receipts { material_id, json } => {
            let screen = ReceiptHistoryScreen::new(client);
            // The CLI run is never superseded, so open always commits.
            let history = screen
                .open(&material_id)
                .await?
                .context("receipt history run was superseded")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                println!(
                    "{} receipts for {} ({} linked to purchases, {} unlinked)",
                    history.receipts.len(),
                    history.material_id,
                    history.link_counts.linked,
                    history.link_counts.unlinked
                );
                for receipt in &history.receipts {
                    println!(
                        "{:<12} {:>10.1} {:>12.2}  {}",
                        receipt.date.map(|d| d.to_string()).unwrap_or_default(),
                        receipt.quantity,
                        receipt.amount,
                        receipt.supplier.as_deref().unwrap_or("-")
                    );
                }
                if !history.complete {
                    eprintln!("warning: showing partial data (some pages failed to load)");
                }
            }
            Ok(0)
        }
    }
}
