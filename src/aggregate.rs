use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::client::{ApiClient, FetchError, Resource};

/// Server page size used when assembling complete collections.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A fully (or partially) assembled collection. `complete` is false when a
/// later page failed mid-sequence and the loop stopped with what it had.
#[derive(Debug, Clone)]
pub struct Aggregate<T> {
    pub items: Vec<T>,
    pub complete: bool,
}

impl<T> Aggregate<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Assemble the complete result set of a paginated listing.
///
/// Page 1 decides everything: a failure there propagates (nothing was
/// gathered), and absent pagination metadata or `totalPages <= 1` means the
/// page-1 items already are the whole set. Later pages are fetched strictly
/// one at a time, in page order; a failure there logs, stops the loop and
/// returns the items gathered so far with `complete: false`.
pub async fn fetch_all<T: DeserializeOwned>(
    client: &ApiClient,
    resource: &Resource,
    limit: u32,
    extra: &[(&str, String)],
) -> Result<Aggregate<T>, FetchError> {
    let first = client.fetch_page_with(resource, 1, limit, extra).await?;
    let total_pages = first.pagination.map(|p| p.total_pages).unwrap_or(1);
    let mut items = first.items;

    if total_pages <= 1 {
        return Ok(Aggregate {
            items,
            complete: true,
        });
    }

    for page in 2..=total_pages {
        match client.fetch_page_with::<T>(resource, page, limit, extra).await {
            Ok(next) => {
                if next.items.is_empty() {
                    // The backend shrank between pages; stop rather than loop
                    // on a promise it no longer keeps.
                    tracing::debug!(
                        target: "sitedesk",
                        resource = resource.path,
                        page,
                        "empty page before promised totalPages, stopping"
                    );
                    break;
                }
                items.extend(next.items);
            }
            Err(err) => {
                tracing::warn!(
                    target: "sitedesk",
                    resource = resource.path,
                    page,
                    total_pages,
                    error = %err,
                    "page fetch failed, returning partial collection"
                );
                return Ok(Aggregate {
                    items,
                    complete: false,
                });
            }
        }
    }

    Ok(Aggregate {
        items,
        complete: true,
    })
}

/// Hands out generations for aggregation runs over one logical target (a
/// dialog, a screen). Starting a new run or invalidating the target bumps the
/// generation, which turns any in-flight run's commit into a no-op.
#[derive(Clone, Default)]
pub struct AggregatorHandle {
    generation: Arc<AtomicU64>,
}

impl AggregatorHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run, superseding any run still in flight.
    pub fn begin(&self) -> RunToken {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RunToken {
            generation,
            handle: self.generation.clone(),
        }
    }

    /// Invalidate without starting a new run (dialog closed, filter cleared).
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Token stamped with the generation its run was started under.
pub struct RunToken {
    generation: u64,
    handle: Arc<AtomicU64>,
}

impl RunToken {
    pub fn is_current(&self) -> bool {
        self.handle.load(Ordering::SeqCst) == self.generation
    }

    /// Hand back `value` only if this run is still the current one. A stale
    /// run's results must be dropped, never applied over fresher state.
    pub fn commit<T>(&self, value: T) -> Option<T> {
        if self.is_current() {
            Some(value)
        } else {
            tracing::debug!(
                target: "sitedesk",
                generation = self.generation,
                "discarding superseded aggregation result"
            );
            None
        }
    }
}
