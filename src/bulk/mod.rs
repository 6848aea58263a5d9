use std::future::Future;
use std::time::Duration;

use crate::overlay::Overlay;

#[derive(Clone, Debug)]
pub struct BulkOptions {
    pub delay: Duration,
    pub error_preview: usize,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            error_preview: 5,
        }
    }
}

/// One unit of a bulk run: the id sent to the API and the label used in
/// progress and error lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkItem {
    pub id: String,
    pub label: String,
}

impl BulkItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BulkSummary {
    pub total: usize,
    pub succeeded: usize,
    /// Sum of the counts reported by successful steps.
    pub processed: u64,
    pub errors: Vec<String>,
}

impl BulkSummary {
    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}

/// First `limit` errors, then a line counting the rest.
pub fn error_digest(errors: &[String], limit: usize) -> Vec<String> {
    let mut out: Vec<String> = errors.iter().take(limit).cloned().collect();
    if errors.len() > limit {
        out.push(format!(
            "... and {} more errors (see log)",
            errors.len() - limit
        ));
    }
    out
}

/// Runs `step` over `items` one at a time, pausing `options.delay` between
/// items. A failing item is recorded and the run continues.
pub async fn run_sequential<F, Fut>(
    items: &[BulkItem],
    options: &BulkOptions,
    overlay: &Overlay,
    mut step: F,
) -> BulkSummary
where
    F: FnMut(BulkItem) -> Fut,
    Fut: Future<Output = Result<u64, String>>,
{
    let mut summary = BulkSummary {
        total: items.len(),
        ..Default::default()
    };

    for (i, item) in items.iter().enumerate() {
        overlay.step(
            i,
            &format!("{} ({}/{})", item.label, i + 1, items.len()),
        );
        match step(item.clone()).await {
            Ok(count) => {
                summary.succeeded += 1;
                summary.processed = summary.processed.saturating_add(count);
                tracing::info!(id = %item.id, count, "bulk step succeeded");
            }
            Err(e) => {
                tracing::error!(id = %item.id, "bulk step failed: {e}");
                summary.errors.push(format!("{}: {e}", item.label));
            }
        }
        overlay.advance();

        if i + 1 < items.len() && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    summary
}
