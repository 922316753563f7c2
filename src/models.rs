use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque, server-assigned conversation identifier.
/// Accepts either a JSON string or integer on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for ConversationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self(n.to_string()),
        })
    }
}

/// Closed set of email purposes. Selects which optional fields apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Purpose {
    #[default]
    #[serde(rename = "Job Application")]
    JobApplication,
    #[serde(rename = "Sales / Lead Generation")]
    Sales,
    #[serde(rename = "Networking / Relationship Building")]
    Networking,
}

impl Purpose {
    pub const ALL: [Purpose; 3] = [Purpose::JobApplication, Purpose::Sales, Purpose::Networking];

    /// Wire value, also used as the `purpose` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::JobApplication => "Job Application",
            Purpose::Sales => "Sales / Lead Generation",
            Purpose::Networking => "Networking / Relationship Building",
        }
    }

    /// Short badge label for list rendering.
    pub fn category(&self) -> &'static str {
        match self {
            Purpose::JobApplication => "Job",
            Purpose::Sales => "Sales",
            Purpose::Networking => "Networking",
        }
    }

    /// Label for the purpose selector.
    pub fn option_label(&self) -> &'static str {
        match self {
            Purpose::JobApplication => "Job Application / Recruiting",
            Purpose::Sales | Purpose::Networking => self.as_str(),
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Purpose {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Purpose::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown purpose: {s}"))
    }
}

/// Full server-side conversation record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub purpose: Purpose,
    pub sender_name: String,
    pub sender_title: String,
    pub sender_company_name: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub recipient_name: Option<String>,
    pub call_to_action: String,
    pub generated_email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub follow_up_messages: Vec<String>,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn summary(&self) -> HistoryEntry {
        HistoryEntry {
            id: self.id.clone(),
            purpose: self.purpose,
            created_at: self.created_at,
            generated_email: self.generated_email.clone(),
        }
    }
}

/// Reduced view of a conversation used by the history list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: ConversationId,
    pub purpose: Purpose,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub generated_email: String,
}

/// `POST /generate-email/` success body.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GeneratedEmail {
    pub email: String,
}

/// `POST /chat-continue/` success body.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FollowUpReply {
    pub response: String,
    pub conversation_id: ConversationId,
}

/// Error body returned with non-2xx responses.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Extracts a string `detail` from a raw body. Validation errors that carry
    /// a list-shaped `detail` yield `None`.
    pub fn detail_from(body: &str) -> Option<String> {
        match serde_json::from_str::<ErrorBody>(body).ok()?.detail {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }
}

fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// RFC 3339, or naive ISO-8601 interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_conversation() {
        let json = r#"{
            "id": 42,
            "purpose": "Sales / Lead Generation",
            "sender_name": "Al",
            "sender_title": "Eng",
            "sender_company_name": "Acme",
            "recipient_name": "",
            "call_to_action": "Chat?",
            "generated_email": "Hi there",
            "follow_up_messages": null,
            "created_at": "2025-03-01T09:30:15.123456",
            "product_service_description": "ignored"
        }"#;

        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conv.id.as_str(), "42");
        assert_eq!(conv.purpose, Purpose::Sales);
        assert_eq!(conv.recipient_name, None);
        assert!(conv.follow_up_messages.is_empty());
        assert_eq!(conv.created_at.to_rfc3339(), "2025-03-01T09:30:15.123456+00:00");
    }

    #[test]
    fn decodes_history_list() {
        let json = r#"[
            {"id": "a1", "purpose": "Job Application", "created_at": "2025-03-01T09:30:00Z", "generated_email": "Dear team"},
            {"id": "b2", "purpose": "Networking / Relationship Building", "created_at": "2025-03-02 10:00:00", "generated_email": "Hello"}
        ]"#;

        let entries: Vec<HistoryEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].purpose, Purpose::JobApplication);
        assert_eq!(entries[1].purpose, Purpose::Networking);
        assert_eq!(entries[1].created_at.format("%Y-%m-%d %H:%M").to_string(), "2025-03-02 10:00");
    }

    #[test]
    fn rejects_unknown_purpose() {
        let json = r#"{"id": "x", "purpose": "Marketing", "created_at": "2025-03-01T09:30:00Z", "generated_email": ""}"#;
        assert!(serde_json::from_str::<HistoryEntry>(json).is_err());
        assert!(Purpose::try_from("Marketing").is_err());
        assert_eq!(Purpose::try_from("Job Application"), Ok(Purpose::JobApplication));
    }

    #[test]
    fn error_body_detail() {
        assert_eq!(ErrorBody::detail_from(r#"{"detail":"Bad URL"}"#).as_deref(), Some("Bad URL"));
        assert_eq!(ErrorBody::detail_from(r#"{"detail":[{"loc":["body"]}]}"#), None);
        assert_eq!(ErrorBody::detail_from("<html>502</html>"), None);
        assert_eq!(ErrorBody::detail_from(""), None);
    }
}
