//! Wire representation of a chore.
//!
//! Writing always produces the camelCase layout with state names. Reading
//! is lenient: unknown members are ignored, missing members take defaults,
//! and the layout of older chore files (PascalCase members, full date-times
//! in `date`, numeric state codes) is accepted.

use crate::chore::{Chore, Observers};
use crate::ids::{ChoreId, WorkerId};
use crate::state::ChoreState;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoreRecord {
    #[serde(alias = "Id", default = "ChoreId::generate")]
    pub id: ChoreId,
    #[serde(alias = "Name", default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(alias = "Description", default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(alias = "Comment", default, deserialize_with = "nullable_string")]
    pub comment: String,
    #[serde(alias = "Date", default = "epoch_day", deserialize_with = "lenient_date")]
    pub date: NaiveDate,
    #[serde(
        alias = "LastModified",
        default = "Utc::now",
        deserialize_with = "lenient_timestamp"
    )]
    pub last_modified: DateTime<Utc>,
    #[serde(
        alias = "Completed",
        default,
        deserialize_with = "lenient_optional_timestamp"
    )]
    pub completed: Option<DateTime<Utc>>,
    #[serde(alias = "Worker", default)]
    pub worker: Option<WorkerId>,
    #[serde(alias = "State", default, deserialize_with = "lenient_state")]
    pub state: ChoreState,
    #[serde(alias = "Value", default)]
    pub value: Option<f64>,
    #[serde(alias = "Locked", default, deserialize_with = "nullable_bool")]
    pub locked: bool,
}

impl From<&Chore> for ChoreRecord {
    fn from(chore: &Chore) -> Self {
        Self {
            id: chore.id.clone(),
            name: chore.name.clone(),
            description: chore.description.clone(),
            comment: chore.comment.clone(),
            date: chore.date,
            last_modified: chore.last_modified,
            completed: chore.completed,
            worker: chore.worker.clone(),
            state: chore.state,
            value: chore.value,
            locked: chore.locked,
        }
    }
}

impl From<ChoreRecord> for Chore {
    fn from(record: ChoreRecord) -> Self {
        Chore {
            id: record.id,
            name: record.name,
            description: record.description,
            comment: record.comment,
            date: record.date,
            last_modified: record.last_modified,
            completed: record.completed,
            worker: record.worker,
            state: record.state,
            value: record.value,
            locked: record.locked,
            observers: Observers::default(),
        }
    }
}

/// 1970-01-01, used when a record carries no date at all.
fn epoch_day() -> NaiveDate {
    NaiveDate::default()
}

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_naive_date_time(input: &str) -> Option<NaiveDateTime> {
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
}

/// Accepts `2024-01-31`, `2024-01-31T00:00:00`, and RFC 3339 date-times.
/// A date-time keeps the calendar day as written; its offset is ignored.
pub(crate) fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.date_naive());
    }
    parse_naive_date_time(input).map(|naive| naive.date())
}

/// RFC 3339 with any offset, or a naive date-time taken as UTC.
pub(crate) fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Some(naive) = parse_naive_date_time(input) {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(epoch_day()),
        Some(raw) => parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date '{raw}'"))),
    }
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(Utc::now()),
        Some(raw) => {
            parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
        }
    }
}

fn lenient_optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StateRepr {
    Name(String),
    Code(i64),
}

fn lenient_state<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ChoreState, D::Error> {
    match Option::<StateRepr>::deserialize(deserializer)? {
        None => Ok(ChoreState::Blank),
        Some(StateRepr::Name(name)) => name.parse().map_err(D::Error::custom),
        Some(StateRepr::Code(code)) => ChoreState::from_legacy_code(code)
            .ok_or_else(|| D::Error::custom(format!("unknown chore state code {code}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn writes_documented_layout() {
        let record = ChoreRecord {
            id: ChoreId::new("c-1"),
            name: "Walk Dog".into(),
            description: "Around the block".into(),
            comment: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            last_modified: Utc.with_ymd_and_hms(2024, 1, 2, 8, 30, 0).unwrap(),
            completed: None,
            worker: Some(WorkerId::new("w-1")),
            state: ChoreState::NotDone,
            value: Some(12.5),
            locked: false,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-01-02");
        assert_eq!(json["lastModified"], "2024-01-02T08:30:00Z");
        assert_eq!(json["completed"], serde_json::Value::Null);
        assert_eq!(json["state"], "NOTDONE");
        assert_eq!(json["worker"], "w-1");
        assert_eq!(json["value"], 12.5);
        assert_eq!(json["locked"], false);
    }

    #[test]
    fn reads_legacy_layout() {
        let json = r#"{
            "Id": "8f0c",
            "Name": "Dishes",
            "Description": null,
            "Date": "2020-05-01T00:00:00",
            "LastModified": "2020-05-01T18:12:44.1234567+02:00",
            "Completed": "2020-05-01T18:12:44",
            "Worker": "w-9",
            "State": 4,
            "Value": 5.0,
            "Locked": true
        }"#;
        let record: ChoreRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_str(), "8f0c");
        assert_eq!(record.description, "");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2020, 5, 1).unwrap());
        assert_eq!(
            record.last_modified,
            Utc.with_ymd_and_hms(2020, 5, 1, 16, 12, 44).unwrap()
                + chrono::Duration::nanoseconds(123_456_700)
        );
        assert_eq!(record.state, ChoreState::Done);
        assert!(record.completed.is_some());
        assert!(record.locked);
    }

    #[test]
    fn offset_date_keeps_written_day() {
        for raw in ["2020-05-01T00:00:00+02:00", "2020-05-01T23:30:00-05:00"] {
            let json = format!(r#"{{"id":"c","date":"{raw}"}}"#);
            let record: ChoreRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(record.date, NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(), "{raw}");
        }
    }

    #[test]
    fn tolerates_missing_and_unknown_members() {
        let record: ChoreRecord =
            serde_json::from_str(r#"{"name":"Laundry","colour":"blue"}"#).unwrap();
        assert_eq!(record.name, "Laundry");
        assert_eq!(record.state, ChoreState::Blank);
        assert_eq!(record.date, epoch_day());
        assert!(!record.id.as_str().is_empty());
        assert!(record.worker.is_none());
        assert!(!record.locked);
    }

    #[test]
    fn rejects_unknown_state_names() {
        let err = serde_json::from_str::<ChoreRecord>(r#"{"state":"FINISHED"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown chore state"));
    }
}
