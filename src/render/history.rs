use crate::models::ParticipantStatus;

use super::escape_html;

/// Presentation bucket of the most recent status transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryCategory {
    NewActive,
    InitiallyWithdrawn,
    Changed(String),
    Other(String),
}

const ARROW: &str = "→";

fn latest_line(log: &str) -> Option<&str> {
    log.lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .last()
}

/// Classifies the last non-blank line of a status log. `None` when the log is blank.
pub fn classify(log: &str) -> Option<HistoryCategory> {
    let line = latest_line(log)?;
    let category = if line.contains("inicial → active") {
        HistoryCategory::NewActive
    } else if line.contains("inicial") || line.contains("scratched") {
        HistoryCategory::InitiallyWithdrawn
    } else if line.contains(ARROW) {
        let change = match line.split_once(": ") {
            Some((_, rest)) => rest,
            None => line,
        };
        HistoryCategory::Changed(change.trim().to_string())
    } else {
        HistoryCategory::Other(line.trim().to_string())
    };
    Some(category)
}

pub fn label(category: &HistoryCategory) -> String {
    match category {
        HistoryCategory::NewActive => "🆕 New (active)".to_string(),
        HistoryCategory::InitiallyWithdrawn => "🔄 Initially scratched".to_string(),
        HistoryCategory::Changed(change) => format!("📝 {change}"),
        HistoryCategory::Other(line) => line.clone(),
    }
}

/// Renders the history cell of a participant row.
pub fn render(history: Option<&str>, status: ParticipantStatus) -> String {
    match history.and_then(classify) {
        Some(category) => {
            let text = escape_html(&label(&category));
            match category {
                HistoryCategory::NewActive => {
                    format!(r#"<span class="history history-new">{text}</span>"#)
                }
                HistoryCategory::InitiallyWithdrawn => {
                    format!(r#"<span class="history history-withdrawn">{text}</span>"#)
                }
                HistoryCategory::Changed(_) => {
                    format!(r#"<span class="history history-changed">{text}</span>"#)
                }
                HistoryCategory::Other(_) => {
                    format!(r#"<small class="history history-other">{text}</small>"#)
                }
            }
        }
        None if status == ParticipantStatus::Scratched => {
            r#"<span class="history history-withdrawn">🔄 Scratched (no history)</span>"#
                .to_string()
        }
        None => r#"<span class="history history-none">⚠️ No history</span>"#.to_string(),
    }
}
