use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::{ApiClient, ApiError, ApiReply, ApiRequest, Transport};
use crate::bulk::BulkOptions;
use crate::cli::args::Command;
use crate::controller::{ControllerOptions, View, ViewController};
use crate::render::BracketViewer;

/// Records every request and answers from a queue; an empty queue answers `200 {}`.
#[derive(Default)]
struct RecordingTransport {
    requests: Mutex<Vec<ApiRequest>>,
    replies: Mutex<VecDeque<Result<ApiReply, ApiError>>>,
}

impl RecordingTransport {
    fn with_replies(replies: Vec<(u16, Value)>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|(status, body)| Ok(ApiReply { status, body }))
                    .collect(),
            ),
        }
    }

    fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path()))
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiReply, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies.lock().unwrap().pop_front().unwrap_or(Ok(ApiReply {
            status: 200,
            body: json!({}),
        }))
    }
}

fn controller(replies: Vec<(u16, Value)>) -> ViewController<RecordingTransport> {
    ViewController::new(
        ApiClient::new(RecordingTransport::with_replies(replies)),
        ControllerOptions {
            bulk: BulkOptions {
                delay: Duration::ZERO,
                error_preview: 5,
            },
            progress: false,
            profile_base: "https://site/horse".to_string(),
        },
    )
}

fn sent(c: &ViewController<RecordingTransport>) -> Vec<String> {
    c.client().transport().paths()
}

fn bodies(c: &ViewController<RecordingTransport>) -> Vec<Option<Value>> {
    c.client()
        .transport()
        .requests
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.body.clone())
        .collect()
}

#[tokio::test]
async fn search_posts_the_url() {
    let c = controller(vec![(200, json!({"success": true, "races": []}))]);
    c.search_races(" https://example.com/entries ").await;
    assert_eq!(sent(&c), vec!["POST /api/scrape"]);
    assert_eq!(
        bodies(&c),
        vec![Some(json!({"url": "https://example.com/entries"}))]
    );
}

#[tokio::test]
async fn empty_or_invalid_input_sends_nothing() {
    let c = controller(vec![]);
    let r = c.search_races("   ").await;
    assert!(!r.ok);
    assert!(r.text().contains("error-message"));
    let r = c.search_races("not a url").await;
    assert!(!r.ok);
    c.race_entries("").await;
    c.scrape_race_horses(" ").await;
    c.check_scratches("").await;
    c.scrape_horse("").await;
    c.scrape_horse_profile("").await;
    assert!(sent(&c).is_empty());
}

#[tokio::test]
async fn empty_race_list_says_so() {
    let c = controller(vec![(200, json!({"success": true, "races": []}))]);
    let r = c.search_races("https://example.com/entries").await;
    assert!(r.ok);
    assert!(r.text().contains("No races found on the page."));
    assert!(!r.text().contains(r#"class="race""#));
}

#[tokio::test]
async fn races_render_end_to_end() {
    let c = controller(vec![(
        200,
        json!({
            "success": true,
            "page_title": "Today",
            "races": [{
                "title": "R1",
                "race_id": "123",
                "participants": [{"horse_id": "H1", "status": "active"}]
            }]
        }),
    )]);
    let r = c.search_races("https://example.com/entries").await;
    assert!(r.ok);
    assert!(r.is_fragment());
    let html = r.text();
    assert!(html.contains("R1"));
    assert!(html.contains("123"));
    assert!(html.contains("✅"));
    assert!(html.contains(r#"data-copy="H1""#));
}

#[tokio::test]
async fn scratched_participant_is_dimmed() {
    let c = controller(vec![(
        200,
        json!({
            "success": true,
            "races": [{
                "title": "R2",
                "participants": [
                    {"horse_id": "Out_1", "status": "scratched"},
                    {"horse_id": "In_2"}
                ]
            }]
        }),
    )]);
    let html = c.search_races("https://example.com/e").await.text().to_string();
    assert!(html.contains("opacity: 0.6"));
    assert!(html.contains("❌ Scratched"));
    assert!(html.contains("✅ Active"));
    assert!(html.contains("Scratched (no history)"));
}

#[tokio::test]
async fn notice_legacy_and_unknown_shapes() {
    let c = controller(vec![
        (
            200,
            json!({"message": "No entries today", "page_title": "Card", "data_found": []}),
        ),
        (200, json!([{"title": "Old Race", "participants": []}])),
        (200, json!({"weird": true})),
    ]);
    let notice = c.search_races("https://example.com/a").await;
    assert!(notice.ok);
    assert!(notice.text().contains("No entries today"));
    assert!(notice.text().contains("No structured data found."));

    let legacy = c.search_races("https://example.com/b").await;
    assert!(legacy.text().contains("Old Race"));
    assert!(legacy.text().contains("No participants found for this race."));

    let unknown = c.search_races("https://example.com/c").await;
    assert!(!unknown.ok);
    assert!(unknown.text().contains("Unexpected response from the server."));
}

#[tokio::test]
async fn http_error_text_is_shown_inline() {
    let c = controller(vec![(500, json!({"error": "database is locked"}))]);
    let r = c.search_races("https://example.com/entries").await;
    assert!(!r.ok);
    assert!(r.text().contains("database is locked"));

    let c = controller(vec![(502, Value::Null)]);
    let r = c.list_horses().await;
    assert!(r.text().contains("server error: 502"));
}

#[tokio::test]
async fn saved_races_fetch_entries_in_order() {
    let c = controller(vec![
        (
            200,
            json!({"total": 2, "races": [
                {"race_id": 7, "race_number": 1, "race_name": "First"},
                {"race_id": 9, "race_number": 2, "race_name": "Second"}
            ]}),
        ),
        (200, json!({"entries": [{"horse_id": "A_1"}, {"horse_id": "B_2"}]})),
        (200, json!({"entries": [{"horse_id": "C_3", "status": "withdrawn"}]})),
    ]);
    let r = c.saved_races().await;
    assert_eq!(
        sent(&c),
        vec![
            "GET /api/races",
            "GET /api/races/7/entries",
            "GET /api/races/9/entries"
        ]
    );
    let html = r.text();
    assert!(html.contains("Race #1"));
    assert!(html.contains("Race #2"));
    assert!(html.contains("<strong>Horses:</strong> 3"));
    assert!(html.contains("⚠️ Withdrawn"));
}

#[tokio::test]
async fn saved_races_stop_at_first_entries_error() {
    let c = controller(vec![
        (200, json!({"races": [{"race_id": "1"}, {"race_id": "2"}]})),
        (404, json!({"error": "race not found"})),
    ]);
    let r = c.saved_races().await;
    assert!(!r.ok);
    assert!(r.text().contains("race not found"));
    assert_eq!(sent(&c).len(), 2);
}

#[tokio::test]
async fn single_race_scrape_reports_count_or_error() {
    let c = controller(vec![
        (200, json!({"success": true, "scraped_count": 8})),
        (200, json!({"success": false, "error": "race closed"})),
    ]);
    let ok = c.scrape_race_horses("42").await;
    assert!(ok.ok);
    assert!(matches!(ok.view, View::Alert(_)));
    assert!(ok.text().contains("8 horses processed for race 42"));

    let failed = c.scrape_race_horses("43").await;
    assert!(!failed.ok);
    assert_eq!(failed.text(), "❌ Error: race closed");
    assert_eq!(
        sent(&c),
        vec!["POST /api/scrape-horses/42", "POST /api/scrape-horses/43"]
    );
}

#[tokio::test]
async fn bulk_scrape_is_sequential_and_digests_errors() {
    let c = controller(vec![
        (200, json!({"success": true, "scraped_count": 4})),
        (500, json!({"error": "timeout upstream"})),
        (200, json!({"success": true, "scraped_count": 6})),
    ]);
    let ids: Vec<String> = ["1", "2", "3"].iter().map(|s| s.to_string()).collect();
    let r = c.scrape_all_race_horses(&ids).await;
    assert_eq!(
        sent(&c),
        vec![
            "POST /api/scrape-horses/1",
            "POST /api/scrape-horses/2",
            "POST /api/scrape-horses/3"
        ]
    );
    let text = r.text();
    assert!(text.contains("Horses scraped: 10"));
    assert!(text.contains("Races succeeded: 2/3"));
    assert!(text.contains("Races failed: 1"));
    assert!(text.contains("Race 2: timeout upstream"));
    assert!(!r.ok);
}

#[tokio::test]
async fn bulk_digest_truncates_after_preview() {
    let failures: Vec<(u16, Value)> = (0..7)
        .map(|i| (200, json!({"success": false, "error": format!("fail {i}")})))
        .collect();
    let c = controller(failures);
    let ids: Vec<String> = (1..=7).map(|i| i.to_string()).collect();
    let text = c.scrape_all_race_horses(&ids).await.text().to_string();
    assert!(text.contains("Race 5: fail 4"));
    assert!(!text.contains("Race 6: fail 5"));
    assert!(text.contains("... and 2 more errors (see log)"));
}

#[tokio::test]
async fn bulk_without_ids_uses_saved_races() {
    let c = controller(vec![
        (200, json!({"races": [{"race_id": "11"}, {"race_id": null}, {"race_id": "12"}]})),
        (200, json!({"success": true, "scraped_count": 1})),
        (200, json!({"success": true, "scraped_count": 2})),
    ]);
    let r = c.scrape_all_race_horses(&[]).await;
    assert!(r.ok);
    assert_eq!(
        sent(&c),
        vec![
            "GET /api/races",
            "POST /api/scrape-horses/11",
            "POST /api/scrape-horses/12"
        ]
    );

    let empty = controller(vec![(200, json!({"races": []}))]);
    let r = empty.scrape_all_race_horses(&[]).await;
    assert!(!r.ok);
    assert!(r.text().contains("No races found to scrape"));
}

#[tokio::test]
async fn scratch_check_summarizes() {
    let c = controller(vec![(
        200,
        json!({
            "success": true,
            "active_horses": [{"horse_id": "A"}],
            "total_scratched": 1,
            "scratched_horses": [{"horse_id": "B_2", "horse_name": "Bee"}]
        }),
    )]);
    let r = c.check_scratches("5").await;
    assert_eq!(sent(&c), vec!["POST /api/races/5/check-scratches"]);
    assert!(r.text().contains("Scratched horses: 1"));
    assert!(r.text().contains("• Bee (B_2)"));

    let c = controller(vec![(200, json!({"success": false, "error": "no races"}))]);
    let r = c.check_all_scratches().await;
    assert_eq!(sent(&c), vec!["POST /api/check-all-scratches"]);
    assert!(!r.ok);
    assert!(r.text().contains("no races"));
}

#[tokio::test]
async fn horse_scrape_renders_profile_and_pedigree() {
    let c = controller(vec![(
        200,
        json!({
            "success": true,
            "horse_id": "Flash_2",
            "data_updated": {
                "owner": "Stable & Sons",
                "age": 4,
                "pedigree": {"sire_id": "Sire_A", "dam_id": "N/A"}
            }
        }),
    )]);
    let r = c.scrape_horse("Flash_2").await;
    assert!(r.ok);
    assert_eq!(sent(&c), vec!["POST /api/scrape-horse/Flash_2"]);
    assert_eq!(bodies(&c), vec![Some(json!({}))]);
    let html = r.text();
    assert!(html.contains("Stable &amp; Sons"));
    assert!(html.contains("Sire A"));
    assert!(html.contains("Completeness: 7% (1/14)"));
    assert!(html.contains("Not available"));
}

#[tokio::test]
async fn horse_scrape_failure_uses_error_block() {
    let c = controller(vec![(200, json!({"success": false, "error": "horse not found"}))]);
    let r = c.scrape_horse("Ghost").await;
    assert!(!r.ok);
    assert!(r.text().contains("Scrape failed"));
    assert!(r.text().contains("horse not found"));
}

#[tokio::test]
async fn horse_profile_builds_profile_url() {
    let c = controller(vec![(
        200,
        json!({"success": true, "horse_data": {"horse_name": "Flash", "pedigree": null}}),
    )])
    .with_viewer(Box::new(BracketViewer));
    let r = c.scrape_horse_profile("Flash_2").await;
    assert!(r.ok);
    assert_eq!(sent(&c), vec!["POST /api/scrape-horse-profile"]);
    assert_eq!(
        bodies(&c),
        vec![Some(json!({"horse_url": "https://site/horse/Flash_2"}))]
    );
    assert!(r.text().contains("No pedigree data available"));
}

#[tokio::test]
async fn maintenance_summaries() {
    let c = controller(vec![
        (
            200,
            json!({"success": true, "total_pedigree_horses": 30, "horses_already_exist": 28, "horses_added": 2}),
        ),
        (
            200,
            json!({
                "success": true,
                "horses_to_update": 5,
                "already_updated": 10,
                "scraped_count": 4,
                "errors": ["a", "b", "c", "d"]
            }),
        ),
        (
            200,
            json!({"success": true, "null_horses_found": 3, "scraped_count": 3, "errors": []}),
        ),
    ]);
    let pedigree = c.check_missing_pedigree().await;
    assert!(pedigree.text().contains("New horses added: 2"));
    assert!(pedigree.text().contains("🎉"));

    let update = c.check_and_update_horses().await;
    assert!(update.text().contains("Horses needing an update: 5"));
    assert!(update.text().contains("Errors: 4"));
    assert!(update.text().contains("... and 1 more errors (see log)"));

    let null = c.scrape_null_horses().await;
    assert!(null.text().contains("Empty horses found: 3"));
    assert!(!null.text().contains("Errors"));

    assert_eq!(
        sent(&c),
        vec![
            "POST /api/pedigree/check-missing-horses",
            "POST /api/check-and-update-horses",
            "POST /api/scrape-null-horses"
        ]
    );
}

#[tokio::test]
async fn null_lists_render_as_empty() {
    let c = controller(vec![
        (
            200,
            json!({"success": true, "races": [{"title": "R1", "race_id": "123", "participants": null}]}),
        ),
        (200, json!({"entries": null, "total": null})),
        (
            200,
            json!({"success": true, "active_horses": null, "total_scratched": 0, "scratched_horses": null}),
        ),
        (
            200,
            json!({"success": true, "null_horses_found": 0, "scraped_count": 0, "errors": null}),
        ),
        (200, json!({"horses": null})),
    ]);

    let search = c.search_races("https://example.com/entries").await;
    assert!(search.ok);
    assert!(search.text().contains("R1"));
    assert!(search.text().contains("No participants found for this race."));

    let entries = c.race_entries("123").await;
    assert!(entries.ok);
    assert!(entries.text().contains("<strong>Entries:</strong> 0"));

    let scratches = c.check_all_scratches().await;
    assert!(scratches.ok);
    assert!(scratches.text().contains("Active horses: 0"));
    assert!(scratches.text().contains("Scratched horses: 0"));

    let null = c.scrape_null_horses().await;
    assert!(null.ok);
    assert!(!null.text().contains("Errors"));

    assert!(c.list_horses().await.ok);
}

#[tokio::test]
async fn null_scalars_render_placeholders() {
    let c = controller(vec![(
        200,
        json!({
            "success": true,
            "races": [{
                "title": "R3",
                "race_id": null,
                "participants": [
                    {"horse_id": "Late_7", "trainer": null, "jockey": "J. Rider", "status": null}
                ]
            }]
        }),
    )]);
    let r = c.search_races("https://example.com/entries").await;
    assert!(r.ok);
    let html = r.text();
    assert!(html.contains("<td>N/A</td><td>J. Rider</td>"));
    assert!(html.contains("✅ Active"));
}

#[tokio::test]
async fn dispatch_routes_commands() {
    let c = controller(vec![(200, json!({"horses": [{"horse_id": "Z_1"}], "total": 1}))]);
    let r = crate::app::dispatch(&c, &Command::Horses).await.unwrap();
    assert!(r.text().contains("Z_1"));

    let none = crate::app::dispatch(
        &c,
        &Command::Copy {
            horse_id: "Z_1".to_string(),
        },
    )
    .await;
    assert!(none.is_none());
    assert_eq!(sent(&c), vec!["GET /api/horses"]);
}

#[tokio::test]
async fn dispatch_splits_comma_separated_race_ids() {
    let c = controller(vec![]);
    crate::app::dispatch(
        &c,
        &Command::ScrapeAllHorses {
            race_ids: vec!["1,2".to_string(), "3".to_string()],
        },
    )
    .await;
    assert_eq!(
        sent(&c),
        vec![
            "POST /api/scrape-horses/1",
            "POST /api/scrape-horses/2",
            "POST /api/scrape-horses/3"
        ]
    );
}
