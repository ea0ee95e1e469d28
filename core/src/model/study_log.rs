use serde::{Deserialize, Deserializer, Serialize};
use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudyLog {
    pub id: String,
    pub date: NaiveDate,
    pub lesson_id: String,
    pub topic: String,
    // Minutes
    pub duration: u32,
    pub questions_solved: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A log as submitted by the user, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudyLog {
    pub date: NaiveDate,
    pub lesson_id: String,
    pub topic: String,
    pub duration: u32,
    pub questions_solved: u32,
    pub notes: Option<String>,
}

impl StudyLog {
    pub fn from_new(new_log: NewStudyLog, id: String) -> Self {
        Self {
            id,
            date: new_log.date,
            lesson_id: new_log.lesson_id,
            topic: new_log.topic,
            duration: new_log.duration,
            questions_solved: new_log.questions_solved,
            notes: new_log.notes,
        }
    }
}

pub fn generate_log_id() -> String {
    Uuid::new_v4().to_string()
}

/// Shape used when reading persisted logs. Older or hand-edited documents may
/// lack ids or carry odd numbers, so every field is read leniently here and
/// tightened by `into_log`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredStudyLog {
    #[serde(default)]
    pub id: Option<String>,
    pub date: NaiveDate,
    pub lesson_id: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub duration: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub questions_solved: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl StoredStudyLog {
    pub fn into_log(self, id: String) -> StudyLog {
        StudyLog {
            id,
            date: self.date,
            lesson_id: self.lesson_id,
            topic: self.topic,
            duration: self.duration,
            questions_solved: self.questions_solved,
            notes: self.notes,
        }
    }
}

/// Accepts any JSON value and coerces it to a non-negative count.
/// Negative numbers clamp to zero, fractions truncate, numeric strings are
/// parsed and anything else becomes zero.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_count(&value))
}

fn coerce_count(value: &serde_json::Value) -> u32 {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u.min(u32::MAX as u64) as u32
            } else if let Some(f) = n.as_f64() {
                if f.is_finite() && f > 0.0 {
                    f.min(u32::MAX as f64) as u32
                } else {
                    0
                }
            } else {
                0
            }
        }
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .map(|f| coerce_count(&serde_json::json!(f)))
            .unwrap_or(0),
        _ => 0,
    }
}
