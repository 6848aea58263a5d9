//! HTML fragments for every view the client can produce.
//!
//! Every interpolated value goes through [`escape_html`]; absent fields render as a placeholder
//! instead of failing.

pub mod history;
pub mod pedigree;

use crate::models::{
    present, HorseProfile, Participant, ParticipantStatus, Race, ScrapeNotice, ScrapeOutcome,
    ScrapeReport,
};
use crate::utils;

pub use pedigree::{BracketViewer, PedigreeViewer};

pub const PLACEHOLDER: &str = "N/A";
pub const PROFILE_PLACEHOLDER: &str = "Not available";

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    match value {
        Some(v) => escape_html(v),
        None => placeholder.to_string(),
    }
}

pub fn error_message(message: &str) -> String {
    format!(r#"<p class="error-message">{}</p>"#, escape_html(message))
}

pub fn info_message(message: &str) -> String {
    format!(r#"<p class="info-message">{}</p>"#, escape_html(message))
}

pub fn status_label(status: ParticipantStatus) -> &'static str {
    match status {
        ParticipantStatus::Active => "✅ Active",
        ParticipantStatus::Scratched => "❌ Scratched",
        ParticipantStatus::Withdrawn => "⚠️ Withdrawn",
    }
}

fn detail_line(html: &mut String, label: &str, value: Option<&str>) {
    if let Some(v) = value {
        html.push_str(&format!(
            "<p><strong>{label}:</strong> {}</p>",
            escape_html(v)
        ));
    }
}

fn link_line(html: &mut String, value: Option<&str>) {
    if let Some(url) = value {
        let url = escape_html(url);
        html.push_str(&format!(
            r#"<p><strong>URL:</strong> <a href="{url}" target="_blank">{url}</a></p>"#
        ));
    }
}

fn horse_id_cell(p: &Participant) -> String {
    match present(&p.horse_id) {
        Some(id) => {
            let id = escape_html(id);
            format!(r#"<code class="horse-id" data-copy="{id}" title="paddock copy {id}">{id}</code>"#)
        }
        None => format!(r#"<code class="horse-id">{PLACEHOLDER}</code>"#),
    }
}

fn participant_row(p: &Participant) -> String {
    let status = p.status();
    let row_attrs = if status.is_out() {
        r#" class="participant participant-out" style="opacity: 0.6; background: #ffebee;""#
    } else {
        r#" class="participant""#
    };
    let name = match p.display_name() {
        Some(name) => format!("<br><small>{}</small>", escape_html(name)),
        None => String::new(),
    };
    format!(
        "<tr{row_attrs}><td><strong>{}</strong>{name}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        horse_id_cell(p),
        or_placeholder(present(&p.trainer), PLACEHOLDER),
        or_placeholder(present(&p.jockey), PLACEHOLDER),
        status_label(status),
        history::render(p.status_history.as_deref(), status),
    )
}

/// Participants table of one race, with a status-driven row style.
pub fn participants_table(participants: &[Participant]) -> String {
    let mut html = String::new();
    html.push_str(r#"<table class="participants-table">"#);
    html.push_str("<thead><tr><th>Horse</th><th>Trainer</th><th>Jockey</th><th>Status</th><th>History</th></tr></thead>");
    html.push_str("<tbody>");
    if participants.is_empty() {
        html.push_str(r#"<tr><td colspan="5">No participants found for this race.</td></tr>"#);
    } else {
        for p in participants {
            html.push_str(&participant_row(p));
        }
    }
    html.push_str("</tbody></table>");
    html
}

fn race_actions(race: &Race) -> String {
    match present(&race.race_id) {
        Some(id) => format!(
            r#"<p class="race-actions"><code>paddock scrape-horses {}</code></p>"#,
            escape_html(id)
        ),
        None => String::new(),
    }
}

/// One race block as produced by the scrape endpoint.
pub fn race_block(race: &Race) -> String {
    let mut html = String::new();
    html.push_str(r#"<div class="race">"#);
    html.push_str(&format!(
        "<h2>{}</h2>",
        or_placeholder(race.heading(), "Untitled race")
    ));
    detail_line(&mut html, "Race ID", present(&race.race_id));
    detail_line(&mut html, "Distance", present(&race.distance));
    detail_line(&mut html, "Surface", present(&race.surface));
    detail_line(&mut html, "Type", race.kind());
    detail_line(&mut html, "Conditions", race.conditions_text());
    detail_line(&mut html, "Age", race.age_text());
    link_line(&mut html, race.link());
    html.push_str(&race_actions(race));
    html.push_str(&participants_table(&race.participants));
    html.push_str("</div>");
    html
}

fn horse_total(races: &[Race]) -> usize {
    races.iter().map(|r| r.participants.len()).sum()
}

fn scrape_report(report: &ScrapeReport) -> String {
    let mut html = String::new();
    html.push_str(r#"<div class="success-message">"#);
    html.push_str("<h3>✅ Scrape succeeded</h3>");
    html.push_str(&format!(
        "<p><strong>Page:</strong> {}</p>",
        or_placeholder(present(&report.page_title), PLACEHOLDER)
    ));
    let total = present(&report.total_races)
        .map(str::to_string)
        .unwrap_or_else(|| report.races.len().to_string());
    html.push_str(&format!(
        "<p><strong>Total races:</strong> {}</p>",
        escape_html(&total)
    ));
    html.push_str(&format!(
        "<p><strong>Total horses:</strong> {}</p>",
        horse_total(&report.races)
    ));
    html.push_str(&format!(
        "<p><strong>URL:</strong> {}</p>",
        or_placeholder(present(&report.url), PLACEHOLDER)
    ));
    html.push_str("</div>");

    if report.races.is_empty() {
        html.push_str(&info_message("No races found on the page."));
    } else {
        for race in &report.races {
            html.push_str(&race_block(race));
        }
    }
    html
}

fn scrape_notice(notice: &ScrapeNotice) -> String {
    let mut html = info_message(present(&notice.message).unwrap_or_default());
    if let Some(title) = present(&notice.page_title) {
        html.push_str(&format!("<p>Page title: {}</p>", escape_html(title)));
    }
    if let Some(url) = present(&notice.url_processed) {
        html.push_str(&format!("<p>Processed URL: {}</p>", escape_html(url)));
    }
    let nothing_found = notice
        .data_found
        .as_ref()
        .and_then(|v| v.as_array())
        .map(|a| a.is_empty())
        .unwrap_or(false);
    if nothing_found {
        html.push_str("<p>No structured data found.</p>");
    }
    html
}

fn legacy_races(races: &[Race]) -> String {
    if races.is_empty() {
        return info_message(
            "No races found, or the page could not be read in the expected format.",
        );
    }
    races.iter().map(race_block).collect()
}

/// Renders whatever shape the scrape endpoint answered with.
pub fn scrape_outcome(outcome: &ScrapeOutcome) -> String {
    match outcome {
        ScrapeOutcome::Races(report) => scrape_report(report),
        ScrapeOutcome::Notice(notice) => scrape_notice(notice),
        ScrapeOutcome::Legacy(races) => legacy_races(races),
        ScrapeOutcome::Unrecognized => error_message("Unexpected response from the server."),
    }
}

fn saved_race_block(race: &Race, entries: &[Participant]) -> String {
    let mut html = String::new();
    html.push_str(r#"<div class="race">"#);
    html.push_str(&format!(
        "<h2>Race #{}</h2>",
        or_placeholder(present(&race.race_number), "?")
    ));
    if let Some(title) = race.heading() {
        html.push_str(&format!(r#"<p class="race-title">{}</p>"#, escape_html(title)));
    }
    html.push_str(&format!(
        "<p><strong>Race ID:</strong> {}</p>",
        or_placeholder(present(&race.race_id), PLACEHOLDER)
    ));
    html.push_str(&format!(
        "<p><strong>Race type:</strong> {}</p>",
        or_placeholder(race.kind(), PLACEHOLDER)
    ));
    html.push_str(&format!(
        "<p><strong>Distance:</strong> {} | <strong>Surface:</strong> {}</p>",
        or_placeholder(present(&race.distance), PLACEHOLDER),
        or_placeholder(present(&race.surface), PLACEHOLDER)
    ));
    html.push_str(&format!(
        "<p><strong>Conditions:</strong> {}</p>",
        or_placeholder(race.conditions_text(), PLACEHOLDER)
    ));
    html.push_str(&format!(
        "<p><strong>Age:</strong> {}</p>",
        or_placeholder(race.age_text(), PLACEHOLDER)
    ));
    link_line(&mut html, race.link());
    html.push_str(&race_actions(race));
    if !entries.is_empty() {
        html.push_str(&participants_table(entries));
    }
    html.push_str("</div>");
    html
}

/// Saved races with the entries fetched for each of them.
pub fn saved_races(races: &[(Race, Vec<Participant>)], total: Option<u64>) -> String {
    let horses: usize = races.iter().map(|(_, e)| e.len()).sum();
    let mut html = String::new();
    html.push_str(&format!(
        r#"<div class="saved-summary"><p><strong>Saved races:</strong> {}</p><p><strong>Horses:</strong> {}</p></div>"#,
        total.unwrap_or(races.len() as u64),
        horses
    ));
    if races.is_empty() {
        html.push_str(&info_message("No saved races."));
        return html;
    }
    for (race, entries) in races {
        html.push_str(&saved_race_block(race, entries));
    }
    html
}

/// Entries of a single race.
pub fn race_entries(race_id: &str, entries: &[Participant]) -> String {
    format!(
        r#"<div class="race"><h2>Race {}</h2><p><strong>Entries:</strong> {}</p>{}</div>"#,
        escape_html(race_id),
        entries.len(),
        participants_table(entries)
    )
}

fn detail_item(label: &str, value: Option<&str>, class: &str) -> String {
    format!(
        r#"<div class="detail-item"><strong>{label}:</strong> <span class="{class}">{}</span></div>"#,
        or_placeholder(value, PROFILE_PLACEHOLDER)
    )
}

/// Horse profile with its pedigree section.
pub fn horse_profile(
    profile: &HorseProfile,
    horse_id: Option<&str>,
    viewer: Option<&dyn PedigreeViewer>,
) -> String {
    let horse_id = horse_id.or_else(|| present(&profile.horse_id));
    let name = present(&profile.horse_name)
        .map(str::to_string)
        .or_else(|| horse_id.map(utils::clean_horse_name));

    let mut html = String::new();
    html.push_str(r#"<div class="complete-horse-profile"><div class="horse-profile">"#);
    html.push_str(&format!(
        "<h2>🐎 {}</h2>",
        or_placeholder(horse_id, PLACEHOLDER)
    ));
    html.push_str(r#"<div class="horse-details-grid"><div class="horse-details-column">"#);
    html.push_str(&detail_item("Name", name.as_deref(), "value"));
    html.push_str(&detail_item("Owner", present(&profile.owner), "value"));
    html.push_str(&detail_item("Trainer", present(&profile.trainer), "value"));
    html.push_str(&detail_item("Breeder", present(&profile.breeder), "value"));
    html.push_str(&detail_item("Sex", present(&profile.sex), "value"));
    html.push_str(&detail_item("Color", present(&profile.color), "value"));
    match profile.link() {
        Some(url) => html.push_str(&format!(
            r#"<div class="detail-item"><strong>URL:</strong> <a href="{}" target="_blank" class="profile-link">View profile</a></div>"#,
            escape_html(url)
        )),
        None => html.push_str(&detail_item("URL", None, "value")),
    }
    html.push_str(r#"</div><div class="horse-details-column">"#);
    html.push_str(&detail_item("Name IPA", present(&profile.horse_name_ipa), "ipa-text"));
    html.push_str(&detail_item("Owner IPA", present(&profile.owner_ipa), "ipa-text"));
    html.push_str(&detail_item("Trainer IPA", present(&profile.trainer_ipa), "ipa-text"));
    html.push_str(&detail_item("Breeder IPA", present(&profile.breeder_ipa), "ipa-text"));
    html.push_str(&detail_item("Age", present(&profile.age), "value"));
    html.push_str(&detail_item("Country", profile.country_text(), "value"));
    html.push_str(&detail_item("Status", present(&profile.status), "value"));
    html.push_str("</div></div></div>");
    html.push_str(&pedigree::render(profile.pedigree.as_ref(), horse_id, viewer));
    html.push_str("</div>");
    html
}

/// Table of every horse known to the API.
pub fn horse_list(horses: &[HorseProfile], total: Option<u64>) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        r#"<div class="saved-summary"><p><strong>Horses:</strong> {}</p></div>"#,
        total.unwrap_or(horses.len() as u64)
    ));
    if horses.is_empty() {
        html.push_str(&info_message("No horses stored yet."));
        return html;
    }
    html.push_str(r#"<table class="horses-table">"#);
    html.push_str("<thead><tr><th>Horse ID</th><th>Name</th><th>Trainer</th><th>Owner</th><th>Status</th><th>Updated</th></tr></thead><tbody>");
    for h in horses {
        html.push_str(&format!(
            "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            or_placeholder(present(&h.horse_id), PLACEHOLDER),
            or_placeholder(present(&h.horse_name), PLACEHOLDER),
            or_placeholder(present(&h.trainer), PLACEHOLDER),
            or_placeholder(present(&h.owner), PLACEHOLDER),
            or_placeholder(present(&h.status), PLACEHOLDER),
            or_placeholder(present(&h.updated_at), "never"),
        ));
    }
    html.push_str("</tbody></table>");
    html
}

/// Error block of the horse views.
pub fn scrape_error(message: &str) -> String {
    format!(
        r#"<div class="error"><h3>❌ Scrape failed</h3><p><strong>Message:</strong> {}</p><p>Check the horse ID and try again.</p></div>"#,
        escape_html(message)
    )
}
