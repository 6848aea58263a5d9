//! One method per user action: validate the input, issue the request, render
//! the reply. Nothing here writes to the terminal; the caller decides where a
//! [`Rendered`] view goes.

use crate::api::{ApiClient, ApiError, Endpoint, Transport};
use crate::bulk::{self, BulkItem, BulkOptions, BulkSummary};
use crate::models::{
    present, BatchUpdateReply, HorseList, HorseProfileReply, HorseScrapeReply,
    PedigreeMissingReply, Participant, Race, RaceEntries, SavedRaces, ScrapeHorsesReply,
    ScrapeOutcome, ScratchReport,
};
use crate::overlay::Overlay;
use crate::render::{self, PedigreeViewer};
use crate::utils;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    /// HTML for the results container.
    Fragment(String),
    /// Plain-text summary.
    Alert(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub view: View,
    pub ok: bool,
}

impl Rendered {
    fn fragment(html: String, ok: bool) -> Self {
        Self {
            view: View::Fragment(html),
            ok,
        }
    }

    fn alert(text: String, ok: bool) -> Self {
        Self {
            view: View::Alert(text),
            ok,
        }
    }

    pub fn text(&self) -> &str {
        match &self.view {
            View::Fragment(s) | View::Alert(s) => s,
        }
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self.view, View::Fragment(_))
    }
}

#[derive(Clone, Debug)]
pub struct ControllerOptions {
    pub bulk: BulkOptions,
    pub progress: bool,
    pub profile_base: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            bulk: BulkOptions::default(),
            progress: false,
            profile_base: utils::DEFAULT_PROFILE_BASE.to_string(),
        }
    }
}

const BATCH_ERROR_PREVIEW: usize = 3;

fn application_error(error: Option<String>) -> ApiError {
    ApiError::Application(error.unwrap_or_else(|| "unknown error".to_string()))
}

fn count_or_placeholder(value: Option<u64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| render::PLACEHOLDER.to_string())
}

fn push_error_digest(text: &mut String, errors: &[String], limit: usize) {
    if errors.is_empty() {
        return;
    }
    text.push_str(&format!("\n❌ Errors: {}\n", errors.len()));
    text.push_str(&bulk::error_digest(errors, limit).join("\n"));
}

fn scratch_summary(report: &ScratchReport) -> String {
    let mut text = String::from("🔍 Scratch check complete!\n\n");
    text.push_str(&format!("🐎 Active horses: {}\n", report.active_horses.len()));
    text.push_str(&format!("❌ Scratched horses: {}\n", report.total_scratched));
    if !report.scratched_horses.is_empty() {
        text.push_str("\n🚫 Scratched:\n");
        for horse in &report.scratched_horses {
            text.push_str(&format!(
                "• {} ({})\n",
                present(&horse.horse_name).unwrap_or(render::PLACEHOLDER),
                present(&horse.horse_id).unwrap_or(render::PLACEHOLDER)
            ));
        }
    }
    text
}

fn bulk_summary_text(summary: &BulkSummary, preview: usize) -> String {
    let mut text = String::from("✅ Scrape complete!\n\n");
    text.push_str(&format!("🐎 Horses scraped: {}\n", summary.processed));
    text.push_str(&format!(
        "🏁 Races succeeded: {}/{}\n",
        summary.succeeded, summary.total
    ));
    if summary.failed() > 0 {
        text.push_str(&format!("⚠️ Races failed: {}\n", summary.failed()));
        text.push_str("\n❌ Errors:\n");
        text.push_str(&bulk::error_digest(&summary.errors, preview).join("\n"));
    }
    text
}

pub struct ViewController<T: Transport> {
    client: ApiClient<T>,
    options: ControllerOptions,
    viewer: Option<Box<dyn PedigreeViewer>>,
}

impl<T: Transport> ViewController<T> {
    pub fn new(client: ApiClient<T>, options: ControllerOptions) -> Self {
        Self {
            client,
            options,
            viewer: None,
        }
    }

    pub fn with_viewer(mut self, viewer: Box<dyn PedigreeViewer>) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// `POST /api/scrape` for a race-card URL.
    pub async fn search_races(&self, url: &str) -> Rendered {
        let url = url.trim();
        if url.is_empty() {
            return Rendered::fragment(
                render::error_message("Please enter a race-card URL to search."),
                false,
            );
        }
        if !utils::is_http_url(url) {
            return Rendered::fragment(
                render::error_message("Please enter a valid http(s) URL."),
                false,
            );
        }

        let endpoint = Endpoint::ScrapeUrl {
            url: url.to_string(),
        };
        match self.client.call(&endpoint).await {
            Ok(body) => {
                let outcome = ScrapeOutcome::classify(body);
                if matches!(outcome, ScrapeOutcome::Unrecognized) {
                    tracing::error!(url, "unexpected scrape response shape");
                }
                let ok = !matches!(outcome, ScrapeOutcome::Unrecognized);
                Rendered::fragment(render::scrape_outcome(&outcome), ok)
            }
            Err(e) => {
                tracing::error!(url, "search failed: {e}");
                Rendered::fragment(render::error_message(&format!("Error: {e}")), false)
            }
        }
    }

    async fn fetch_saved_races(&self) -> Result<SavedRaces, ApiError> {
        self.client.call_as::<SavedRaces>(&Endpoint::ListRaces).await
    }

    async fn fetch_entries(&self, race_id: &str) -> Result<Vec<Participant>, ApiError> {
        let endpoint = Endpoint::RaceEntries {
            race_id: race_id.to_string(),
        };
        let reply = self.client.call_as::<RaceEntries>(&endpoint).await?;
        Ok(reply.entries)
    }

    // entries are fetched one race at a time; the first failure aborts the listing
    async fn load_saved_races(
        &self,
    ) -> Result<(Vec<(Race, Vec<Participant>)>, Option<u64>), ApiError> {
        let saved = self.fetch_saved_races().await?;
        let mut out = Vec::with_capacity(saved.races.len());
        for race in saved.races {
            let entries = match present(&race.race_id) {
                Some(id) => self.fetch_entries(id).await?,
                None => Vec::new(),
            };
            out.push((race, entries));
        }
        Ok((out, saved.total))
    }

    pub async fn saved_races(&self) -> Rendered {
        match self.load_saved_races().await {
            Ok((races, total)) => Rendered::fragment(render::saved_races(&races, total), true),
            Err(e) => {
                tracing::error!("loading saved races failed: {e}");
                Rendered::fragment(
                    render::error_message(&format!("Error loading races: {e}")),
                    false,
                )
            }
        }
    }

    pub async fn race_entries(&self, race_id: &str) -> Rendered {
        let race_id = race_id.trim();
        if race_id.is_empty() {
            return Rendered::fragment(render::error_message("Please enter a race ID."), false);
        }
        match self.fetch_entries(race_id).await {
            Ok(entries) => Rendered::fragment(render::race_entries(race_id, &entries), true),
            Err(e) => {
                tracing::error!(race_id, "loading entries failed: {e}");
                Rendered::fragment(
                    render::error_message(&format!("Error loading entries: {e}")),
                    false,
                )
            }
        }
    }

    async fn scrape_one_race(&self, race_id: &str) -> Result<u64, ApiError> {
        let endpoint = Endpoint::ScrapeHorses {
            race_id: race_id.to_string(),
        };
        let reply = self.client.call_as::<ScrapeHorsesReply>(&endpoint).await?;
        if !reply.success {
            return Err(application_error(reply.error));
        }
        Ok(reply.scraped_count)
    }

    pub async fn scrape_race_horses(&self, race_id: &str) -> Rendered {
        let race_id = race_id.trim();
        if race_id.is_empty() {
            return Rendered::alert("❌ Please provide a race ID.".to_string(), false);
        }
        match self.scrape_one_race(race_id).await {
            Ok(count) => Rendered::alert(
                format!("✅ Scrape complete: {count} horses processed for race {race_id}"),
                true,
            ),
            Err(ApiError::Application(msg)) => {
                tracing::error!(race_id, "scrape-horses rejected: {msg}");
                Rendered::alert(format!("❌ Error: {msg}"), false)
            }
            Err(e) => {
                tracing::error!(race_id, "scrape-horses failed: {e}");
                Rendered::alert(format!("❌ Error scraping horses: {e}"), false)
            }
        }
    }

    /// Scrapes every race in `race_ids`, or every saved race when the list is empty.
    pub async fn scrape_all_race_horses(&self, race_ids: &[String]) -> Rendered {
        let items: Vec<BulkItem> = if race_ids.is_empty() {
            match self.fetch_saved_races().await {
                Ok(saved) => saved
                    .races
                    .iter()
                    .filter_map(|r| present(&r.race_id))
                    .map(|id| BulkItem::new(id, format!("Race {id}")))
                    .collect(),
                Err(e) => {
                    tracing::error!("loading saved races failed: {e}");
                    return Rendered::alert(format!("❌ Error loading races: {e}"), false);
                }
            }
        } else {
            race_ids
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .map(|id| BulkItem::new(id, format!("Race {id}")))
                .collect()
        };

        if items.is_empty() {
            return Rendered::alert(
                "❌ No races found to scrape. Search for races first with `paddock search <URL>`."
                    .to_string(),
                false,
            );
        }

        let overlay = Overlay::bar(
            self.options.progress,
            items.len() as u64,
            "Scraping horses...",
        );
        let this = self;
        let summary = bulk::run_sequential(&items, &self.options.bulk, &overlay, move |item| {
            async move {
                this.scrape_one_race(&item.id)
                    .await
                    .map_err(|e| e.to_string())
            }
        })
        .await;
        drop(overlay);

        Rendered::alert(
            bulk_summary_text(&summary, self.options.bulk.error_preview),
            summary.failed() == 0,
        )
    }

    async fn scratch_check(&self, endpoint: Endpoint, label: &str) -> Rendered {
        let overlay = Overlay::spinner(self.options.progress, label);
        let result = self.client.call_as::<ScratchReport>(&endpoint).await;
        drop(overlay);

        let report = match result {
            Ok(report) if report.success => report,
            Ok(report) => {
                let e = application_error(report.error);
                tracing::error!("scratch check rejected: {e}");
                return Rendered::alert(format!("❌ Error checking scratches: {e}"), false);
            }
            Err(e) => {
                tracing::error!("scratch check failed: {e}");
                return Rendered::alert(format!("❌ Error checking scratches: {e}"), false);
            }
        };
        Rendered::alert(scratch_summary(&report), true)
    }

    pub async fn check_scratches(&self, race_id: &str) -> Rendered {
        let race_id = race_id.trim();
        if race_id.is_empty() {
            return Rendered::alert("❌ Please provide a race ID.".to_string(), false);
        }
        let label = format!("Checking scratches for race {race_id}...");
        self.scratch_check(
            Endpoint::CheckScratches {
                race_id: race_id.to_string(),
            },
            &label,
        )
        .await
    }

    pub async fn check_all_scratches(&self) -> Rendered {
        self.scratch_check(
            Endpoint::CheckAllScratches,
            "Checking scratches for every race...",
        )
        .await
    }

    /// `POST /api/scrape-horse/{id}`, rendered as a profile with pedigree.
    pub async fn scrape_horse(&self, horse_id: &str) -> Rendered {
        let horse_id = horse_id.trim();
        if horse_id.is_empty() {
            return Rendered::fragment(render::error_message("Please enter a horse ID."), false);
        }
        let endpoint = Endpoint::ScrapeHorse {
            horse_id: horse_id.to_string(),
        };
        let reply = match self.client.call_as::<HorseScrapeReply>(&endpoint).await {
            Ok(reply) if reply.success => reply,
            Ok(reply) => {
                let msg = reply
                    .error
                    .or(reply.message)
                    .unwrap_or_else(|| "unknown error".to_string());
                tracing::error!(horse_id, "scrape-horse rejected: {msg}");
                return Rendered::fragment(render::scrape_error(&msg), false);
            }
            Err(e) => {
                tracing::error!(horse_id, "scrape-horse failed: {e}");
                return Rendered::fragment(render::scrape_error(&e.to_string()), false);
            }
        };

        let mut profile = reply.data_updated.unwrap_or_default();
        if profile.pedigree.is_none() {
            profile.pedigree = reply.pedigree;
        }
        if present(&profile.horse_name).is_none() {
            profile.horse_name = reply.horse_name;
        }
        if profile.link().is_none() {
            profile.profile_url = reply.profile_url;
        }
        let id = present(&reply.horse_id).unwrap_or(horse_id);
        Rendered::fragment(
            render::horse_profile(&profile, Some(id), self.viewer.as_deref()),
            true,
        )
    }

    /// `POST /api/scrape-horse-profile` with the profile URL built from the id.
    pub async fn scrape_horse_profile(&self, horse_id: &str) -> Rendered {
        let horse_id = horse_id.trim();
        if horse_id.is_empty() {
            return Rendered::fragment(render::error_message("Please enter a horse ID."), false);
        }
        let endpoint = Endpoint::ScrapeHorseProfile {
            horse_url: utils::horse_profile_url(&self.options.profile_base, horse_id),
        };
        match self.client.call_as::<HorseProfileReply>(&endpoint).await {
            Ok(HorseProfileReply {
                success: true,
                horse_data: Some(profile),
                ..
            }) => Rendered::fragment(
                render::horse_profile(&profile, Some(horse_id), self.viewer.as_deref()),
                true,
            ),
            Ok(reply) => {
                let e = application_error(reply.error);
                tracing::error!(horse_id, "scrape-horse-profile rejected: {e}");
                Rendered::fragment(render::scrape_error(&e.to_string()), false)
            }
            Err(e) => {
                tracing::error!(horse_id, "scrape-horse-profile failed: {e}");
                Rendered::fragment(render::scrape_error(&e.to_string()), false)
            }
        }
    }

    pub async fn list_horses(&self) -> Rendered {
        match self.client.call_as::<HorseList>(&Endpoint::ListHorses).await {
            Ok(list) => Rendered::fragment(render::horse_list(&list.horses, list.total), true),
            Err(e) => {
                tracing::error!("loading horses failed: {e}");
                Rendered::fragment(
                    render::error_message(&format!("Error loading horses: {e}")),
                    false,
                )
            }
        }
    }

    pub async fn check_missing_pedigree(&self) -> Rendered {
        let reply = match self
            .client
            .call_as::<PedigreeMissingReply>(&Endpoint::PedigreeCheckMissing)
            .await
        {
            Ok(reply) if reply.success => reply,
            Ok(reply) => {
                let e = application_error(reply.error);
                tracing::error!("pedigree check rejected: {e}");
                return Rendered::alert(format!("❌ Error: {e}"), false);
            }
            Err(e) => {
                tracing::error!("pedigree check failed: {e}");
                return Rendered::alert(format!("❌ Connection error: {e}"), false);
            }
        };

        let mut text = String::from("✅ Pedigree check complete\n\n📊 Summary:\n");
        text.push_str(&format!(
            "• Horses found in pedigrees: {}\n",
            reply.total_pedigree_horses
        ));
        text.push_str(&format!(
            "• Already in the horses table: {}\n",
            reply.horses_already_exist
        ));
        text.push_str(&format!("• New horses added: {}\n\n", reply.horses_added));
        if reply.horses_added > 0 {
            text.push_str("🎉 New horses were added to the horses table!");
        } else {
            text.push_str("✅ Every pedigree horse was already in the horses table.");
        }
        Rendered::alert(text, true)
    }

    async fn batch_update(
        &self,
        endpoint: Endpoint,
        label: &str,
    ) -> Result<BatchUpdateReply, String> {
        let overlay = Overlay::spinner(self.options.progress, label);
        let result = self.client.call_as::<BatchUpdateReply>(&endpoint).await;
        drop(overlay);
        match result {
            Ok(reply) if reply.success => {
                tracing::debug!(?reply, "batch update finished");
                Ok(reply)
            }
            Ok(reply) => {
                let e = application_error(reply.error);
                tracing::error!("batch update rejected: {e}");
                Err(format!("❌ Error: {e}"))
            }
            Err(e) => {
                tracing::error!("batch update failed: {e}");
                Err(format!("❌ Error reviewing horses: {e}"))
            }
        }
    }

    /// Re-scrapes horses the server considers stale.
    pub async fn check_and_update_horses(&self) -> Rendered {
        let reply = match self
            .batch_update(
                Endpoint::CheckAndUpdateHorses,
                "Reviewing horses that need an update...",
            )
            .await
        {
            Ok(reply) => reply,
            Err(text) => return Rendered::alert(text, false),
        };
        let mut text = String::from("✅ Review complete!\n\n");
        text.push_str(&format!(
            "🔍 Horses needing an update: {}\n",
            count_or_placeholder(reply.horses_to_update)
        ));
        text.push_str(&format!(
            "✅ Already up to date: {}\n",
            count_or_placeholder(reply.already_updated)
        ));
        text.push_str(&format!("🐎 Horses updated: {}\n", reply.scraped_count));
        push_error_digest(&mut text, &reply.errors, BATCH_ERROR_PREVIEW);
        Rendered::alert(text, true)
    }

    /// Scrapes horses whose profile was never filled in.
    pub async fn scrape_null_horses(&self) -> Rendered {
        let reply = match self
            .batch_update(
                Endpoint::ScrapeNullHorses,
                "Scraping horses with empty profiles...",
            )
            .await
        {
            Ok(reply) => reply,
            Err(text) => return Rendered::alert(text, false),
        };
        let mut text = String::from("✅ Empty-profile scrape complete!\n\n");
        text.push_str(&format!(
            "🔍 Empty horses found: {}\n",
            count_or_placeholder(reply.null_horses_found)
        ));
        text.push_str(&format!("✅ Horses scraped: {}\n", reply.scraped_count));
        push_error_digest(&mut text, &reply.errors, BATCH_ERROR_PREVIEW);
        Rendered::alert(text, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_summary_lists_scratched_horses() {
        let report: ScratchReport = serde_json::from_value(serde_json::json!({
            "success": true,
            "active_horses": [{}, {}],
            "total_scratched": 1,
            "scratched_horses": [{"horse_id": "Flash_2", "horse_name": "Flash"}]
        }))
        .unwrap();
        let text = scratch_summary(&report);
        assert!(text.contains("Active horses: 2"));
        assert!(text.contains("• Flash (Flash_2)"));
    }

    #[test]
    fn batch_digest_shows_three_errors() {
        let mut text = String::new();
        let errors: Vec<String> = (0..5).map(|i| format!("e{i}")).collect();
        push_error_digest(&mut text, &errors, BATCH_ERROR_PREVIEW);
        assert!(text.contains("Errors: 5"));
        assert!(text.contains("e2"));
        assert!(!text.contains("e3"));
        assert!(text.contains("... and 2 more errors"));
    }
}
