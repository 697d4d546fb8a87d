use crate::ids::WorkerId;
use serde::{Deserialize, Serialize};

/// A person who can be assigned chores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    /// Required; a stored worker without an id cannot be matched to its chores.
    #[serde(alias = "Id")]
    id: WorkerId,
    #[serde(alias = "Name", default)]
    pub name: String,
    /// Monetary total maintained outside the chore queries.
    #[serde(alias = "MonthlyChoreValue", default)]
    pub monthly_chore_value: f64,
}

impl Worker {
    pub fn new(id: impl Into<WorkerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            monthly_chore_value: 0.0,
        }
    }

    pub fn id(&self) -> &WorkerId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_pascal_case_members() {
        let json = r#"{"Id":"w-7","Name":"Kari","MonthlyChoreValue":125.5}"#;
        let worker: Worker = serde_json::from_str(json).unwrap();
        assert_eq!(worker.id().as_str(), "w-7");
        assert_eq!(worker.name, "Kari");
        assert_eq!(worker.monthly_chore_value, 125.5);
    }

    #[test]
    fn writes_camel_case_members() {
        let worker = Worker::new("w-1", "Ola");
        let json = serde_json::to_value(&worker).unwrap();
        assert_eq!(json["monthlyChoreValue"], 0.0);
        assert_eq!(json["id"], "w-1");
    }

    #[test]
    fn tolerates_unknown_and_missing_members() {
        let worker: Worker = serde_json::from_str(r#"{"id":"w-2","age":9}"#).unwrap();
        assert_eq!(worker.name, "");
        assert_eq!(worker.monthly_chore_value, 0.0);
    }

    #[test]
    fn missing_id_is_rejected() {
        let err = serde_json::from_str::<Worker>(r#"{"name":"Kari"}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `id`"));
    }
}
