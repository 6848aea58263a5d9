use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ids, race numbers and ages show up as strings or numbers depending on the endpoint
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

// the backend sends `null` for lists it has nothing to put in
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(truthy(value.as_ref()))
}

/// Returns the field when it holds a non-blank value.
pub fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

/// First non-blank value among `fields`.
pub fn first_present<'a>(fields: &[&'a Option<String>]) -> Option<&'a str> {
    fields.iter().find_map(|f| present(f))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticipantStatus {
    Active,
    Scratched,
    Withdrawn,
}

impl ParticipantStatus {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("scratched") => Self::Scratched,
            Some("withdrawn") => Self::Withdrawn,
            _ => Self::Active,
        }
    }

    pub fn is_out(self) -> bool {
        matches!(self, Self::Scratched | Self::Withdrawn)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Participant {
    #[serde(default, deserialize_with = "lenient_string")]
    pub horse_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub horse_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub horse: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trainer: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub jockey: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sire: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub post_position: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_history: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_changed_at: Option<String>,
}

impl Participant {
    pub fn status(&self) -> ParticipantStatus {
        ParticipantStatus::parse(present(&self.status))
    }

    pub fn display_name(&self) -> Option<&str> {
        first_present(&[&self.horse_name, &self.horse])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Race {
    #[serde(default, deserialize_with = "lenient_string")]
    pub race_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub race_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, rename = "raceTitle", deserialize_with = "lenient_string")]
    pub race_title_legacy: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub race_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub race_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub distance: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub surface: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub race_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub race_type_from_detail: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub conditions: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub conditions_clean: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub age_restriction: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub age_restriction_scraped: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub specific_race_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub race_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub track_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub participants: Vec<Participant>,
}

impl Race {
    pub fn heading(&self) -> Option<&str> {
        first_present(&[
            &self.title,
            &self.race_title_legacy,
            &self.race_title,
            &self.race_name,
        ])
    }

    pub fn kind(&self) -> Option<&str> {
        first_present(&[&self.race_type_from_detail, &self.race_type])
    }

    pub fn conditions_text(&self) -> Option<&str> {
        first_present(&[&self.conditions_clean, &self.conditions])
    }

    pub fn age_text(&self) -> Option<&str> {
        first_present(&[&self.age_restriction_scraped, &self.age_restriction])
    }

    pub fn link(&self) -> Option<&str> {
        first_present(&[&self.specific_race_url, &self.url])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Pedigree {
    #[serde(default, deserialize_with = "lenient_string")]
    pub sire_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dam_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub paternal_grandsire_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub paternal_granddam_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub maternal_grandsire_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub maternal_granddam_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub paternal_gg_sire_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub paternal_gg_dam_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub paternal_gd_sire_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub paternal_gd_dam_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub maternal_gg_sire_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub maternal_gg_dam_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub maternal_gd_sire_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub maternal_gd_dam_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct HorseProfile {
    #[serde(default, deserialize_with = "lenient_string")]
    pub horse_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub horse_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub horse_name_ipa: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sex: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub owner_ipa: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trainer: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trainer_ipa: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub breeder: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub breeder_ipa: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country_of_birth: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub profile_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub pedigree: Option<Pedigree>,
}

impl HorseProfile {
    pub fn country_text(&self) -> Option<&str> {
        first_present(&[&self.country_of_birth, &self.country])
    }

    pub fn link(&self) -> Option<&str> {
        first_present(&[&self.profile_url, &self.url])
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScrapeReport {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub races: Vec<Race>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub page_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_races: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScrapeNotice {
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub page_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url_processed: Option<String>,
    #[serde(default)]
    pub data_found: Option<Value>,
}

/// The shapes `POST /api/scrape` is known to answer with.
#[derive(Clone, Debug)]
pub enum ScrapeOutcome {
    Races(ScrapeReport),
    Notice(ScrapeNotice),
    Legacy(Vec<Race>),
    Unrecognized,
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

impl ScrapeOutcome {
    pub fn classify(body: Value) -> Self {
        if truthy(body.get("success")) && body.get("races").map(Value::is_array).unwrap_or(false)
        {
            return match serde_json::from_value::<ScrapeReport>(body) {
                Ok(report) => Self::Races(report),
                Err(e) => {
                    tracing::warn!("scrape response with races did not decode: {e}");
                    Self::Unrecognized
                }
            };
        }
        if truthy(body.get("message")) {
            return match serde_json::from_value::<ScrapeNotice>(body) {
                Ok(notice) => Self::Notice(notice),
                Err(e) => {
                    tracing::warn!("scrape notice did not decode: {e}");
                    Self::Unrecognized
                }
            };
        }
        if body.is_array() {
            return match serde_json::from_value::<Vec<Race>>(body) {
                Ok(races) => Self::Legacy(races),
                Err(e) => {
                    tracing::warn!("legacy scrape response did not decode: {e}");
                    Self::Unrecognized
                }
            };
        }
        Self::Unrecognized
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SavedRaces {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub races: Vec<Race>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RaceEntries {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub entries: Vec<Participant>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HorseList {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub horses: Vec<HorseProfile>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScrapeHorsesReply {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub scraped_count: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HorseRef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub horse_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub horse_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ScratchReport {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub active_horses: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_scratched: u64,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub scratched_horses: Vec<HorseRef>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HorseScrapeReply {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub horse_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub horse_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub data_updated: Option<HorseProfile>,
    #[serde(default)]
    pub pedigree: Option<Pedigree>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HorseProfileReply {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub success: bool,
    #[serde(default)]
    pub horse_data: Option<HorseProfile>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PedigreeMissingReply {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_pedigree_horses: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub horses_already_exist: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub horses_added: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

/// Reply of the server-side batch jobs (`check-and-update-horses`, `scrape-null-horses`).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BatchUpdateReply {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub scraped_count: u64,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub errors: Vec<String>,
    #[serde(default)]
    pub horses_to_update: Option<u64>,
    #[serde(default)]
    pub already_updated: Option<u64>,
    #[serde(default)]
    pub null_horses_found: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_ids_are_accepted() {
        let race: Race = serde_json::from_value(json!({
            "race_id": 123,
            "race_number": 4,
            "race_title": "Allowance",
            "race_name": "Allowance"
        }))
        .unwrap();
        assert_eq!(race.race_id.as_deref(), Some("123"));
        assert_eq!(race.race_number.as_deref(), Some("4"));
        assert_eq!(race.heading(), Some("Allowance"));
    }

    #[test]
    fn blank_fields_fall_through_to_legacy_names() {
        let race: Race = serde_json::from_value(json!({
            "title": "",
            "raceTitle": "Legacy Title",
            "conditions": "raw",
            "conditions_clean": "clean"
        }))
        .unwrap();
        assert_eq!(race.heading(), Some("Legacy Title"));
        assert_eq!(race.conditions_text(), Some("clean"));
    }

    #[test]
    fn null_lists_decode_as_empty() {
        let race: Race =
            serde_json::from_value(json!({"title": "R1", "participants": null})).unwrap();
        assert!(race.participants.is_empty());

        let report: ScratchReport = serde_json::from_value(json!({
            "success": true,
            "active_horses": null,
            "scratched_horses": null
        }))
        .unwrap();
        assert!(report.active_horses.is_empty());
        assert!(report.scratched_horses.is_empty());

        let batch: BatchUpdateReply =
            serde_json::from_value(json!({"success": true, "errors": null})).unwrap();
        assert!(batch.errors.is_empty());
    }

    #[test]
    fn status_defaults_to_active() {
        assert_eq!(ParticipantStatus::parse(None), ParticipantStatus::Active);
        assert_eq!(ParticipantStatus::parse(Some("odd")), ParticipantStatus::Active);
        assert_eq!(
            ParticipantStatus::parse(Some("Scratched")),
            ParticipantStatus::Scratched
        );
        assert!(ParticipantStatus::Withdrawn.is_out());
    }

    #[test]
    fn classify_picks_races_shape() {
        let outcome = ScrapeOutcome::classify(json!({"success": true, "races": []}));
        assert!(matches!(outcome, ScrapeOutcome::Races(r) if r.races.is_empty()));
    }

    #[test]
    fn classify_picks_notice_and_legacy_shapes() {
        let notice = ScrapeOutcome::classify(json!({"message": "nothing here", "data_found": []}));
        assert!(matches!(notice, ScrapeOutcome::Notice(_)));

        let legacy = ScrapeOutcome::classify(json!([{"title": "R9"}]));
        assert!(matches!(legacy, ScrapeOutcome::Legacy(r) if r.len() == 1));
    }

    #[test]
    fn classify_rejects_unknown_shapes() {
        assert!(matches!(
            ScrapeOutcome::classify(json!({"success": false, "races": []})),
            ScrapeOutcome::Unrecognized
        ));
        assert!(matches!(
            ScrapeOutcome::classify(json!({"foo": 1})),
            ScrapeOutcome::Unrecognized
        ));
        assert!(matches!(
            ScrapeOutcome::classify(json!("text")),
            ScrapeOutcome::Unrecognized
        ));
    }
}
