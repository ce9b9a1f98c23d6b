//! Conversation events: the ordered input of one generation run.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decodes a field, falling back to its default with a warning when the value has the wrong
/// shape.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(T::default());
    }
    match serde_json::from_value(raw) {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring malformed conversation field");
            Ok(T::default())
        }
    }
}

/// Numbers, or strings holding numbers. Anything else counts as missing.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let parsed = match &raw {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        tracing::warn!(value = %raw, "non-numeric chart value; counting it as zero");
    }
    Ok(parsed)
}

/// Keeps every row that is an object, so legends and bars stay aligned with the input.
fn lenient_items<'de, D>(deserializer: D) -> std::result::Result<Vec<ChartItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let rows = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::Array(rows) => rows,
        other => {
            tracing::warn!(value = %other, "chart items must be an array; drawing an empty chart");
            return Ok(Vec::new());
        }
    };
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(row, raw)| {
            serde_json::from_value(raw).unwrap_or_else(|err| {
                tracing::warn!(row, error = %err, "malformed chart row; drawing it empty");
                ChartItem::default()
            })
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    #[serde(alias = "self", alias = "A", alias = "a")]
    Me,
    #[serde(alias = "other", alias = "B", alias = "b")]
    Visitor,
}

impl Sender {
    pub fn is_me(self) -> bool {
        matches!(self, Sender::Me)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sender::Me => "me",
            Sender::Visitor => "visitor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChartType {
    #[default]
    Bar,
    Donut,
    /// Kept verbatim so the renderer can name it when it skips the event.
    Unsupported(String),
}

impl From<String> for ChartType {
    fn from(value: String) -> Self {
        match value.trim() {
            "bar" | "horizontalBar" => ChartType::Bar,
            "donut" => ChartType::Donut,
            _ => ChartType::Unsupported(value),
        }
    }
}

impl From<ChartType> for String {
    fn from(value: ChartType) -> Self {
        match value {
            ChartType::Bar => "bar".to_string(),
            ChartType::Donut => "donut".to_string(),
            ChartType::Unsupported(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartItem {
    #[serde(default, deserialize_with = "lenient")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub color: Option<String>,
}

impl ChartItem {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: Some(value),
            color: None,
        }
    }

    /// Missing or non-finite values count as zero.
    pub fn value_or_zero(&self) -> f64 {
        self.value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub chart_type: ChartType,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<ChartItem>,
    #[serde(default, deserialize_with = "lenient")]
    pub center_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub value_suffix: Option<String>,
}

impl ChartData {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Scale maximum for bar lengths: `maxValue` if set, otherwise the largest value (at least 1).
    pub fn scale_max(&self) -> f64 {
        if let Some(max) = self.max_value.filter(|v| v.is_finite() && *v > 0.0) {
            return max;
        }
        self.items
            .iter()
            .map(ChartItem::value_or_zero)
            .fold(1.0_f64, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum EventContent {
    Text(String),
    Chart(ChartData),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Text,
    Chart,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub sender: Sender,
    #[serde(flatten)]
    pub content: EventContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
}

impl ConversationEvent {
    pub fn text(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: None,
            sender,
            content: EventContent::Text(text.into()),
            reaction: None,
        }
    }

    pub fn chart(sender: Sender, chart: ChartData) -> Self {
        Self {
            id: None,
            sender,
            content: EventContent::Chart(chart),
            reaction: None,
        }
    }

    pub fn with_reaction(mut self, reaction: impl Into<String>) -> Self {
        self.reaction = Some(reaction.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn kind(&self) -> EventKind {
        match self.content {
            EventContent::Text(_) => EventKind::Text,
            EventContent::Chart(_) => EventKind::Chart,
        }
    }

    pub fn reaction(&self) -> Option<&str> {
        self.reaction.as_deref().filter(|r| !r.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRecord {
    #[serde(default)]
    id: Option<Value>,
    sender: Sender,
    #[serde(default, alias = "contentType", deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    chart_data: Option<ChartData>,
    #[serde(default, deserialize_with = "lenient")]
    reaction: Option<String>,
}

impl EventRecord {
    fn into_event(self, index: usize) -> ConversationEvent {
        let id = self.id.and_then(|v| match v {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        });
        let kind = self.kind.as_deref().unwrap_or("text");

        let content = match (kind, self.chart_data, self.text) {
            ("chart", Some(chart), _) => EventContent::Chart(chart),
            ("chart", None, text) => {
                tracing::warn!(index, "chart event without chartData; rendering an empty bubble");
                EventContent::Text(text.unwrap_or_default())
            }
            ("text", _, Some(text)) => EventContent::Text(text),
            ("text", _, None) => {
                tracing::warn!(index, "text event without text; rendering an empty bubble");
                EventContent::Text(String::new())
            }
            (other, _, text) => {
                tracing::warn!(index, kind = other, "unknown event kind; treating it as text");
                EventContent::Text(text.unwrap_or_default())
            }
        };

        ConversationEvent {
            id,
            sender: self.sender,
            content,
            reaction: self.reaction,
        }
    }
}

/// Parses a conversation from an already-decoded JSON document.
///
/// Accepts either an array of event records or an object with a `messages` array.
/// Malformed individual records are content problems and degrade with a warning; only a
/// document that is not a list of records at all is an error.
pub fn parse_conversation_value(value: Value) -> Result<Vec<ConversationEvent>> {
    let records = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("messages") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::ConversationJson {
                    message: "expected an array of events or an object with `messages`"
                        .to_string(),
                });
            }
        },
        _ => {
            return Err(Error::ConversationJson {
                message: "expected an array of events".to_string(),
            });
        }
    };

    let mut events = Vec::with_capacity(records.len());
    for (index, raw) in records.into_iter().enumerate() {
        let fallback_sender = salvage_sender(&raw, events.last());
        let event = match serde_json::from_value::<EventRecord>(raw) {
            Ok(record) => record.into_event(index),
            Err(err) => {
                tracing::warn!(index, error = %err, "unreadable event; rendering an empty bubble");
                ConversationEvent::text(fallback_sender, String::new())
            }
        };
        events.push(event);
    }
    Ok(events)
}

/// Best guess at who sent an unreadable record: its own `sender` if that parses, otherwise the
/// opposite of the previous speaker so turn-taking stays plausible.
fn salvage_sender(raw: &Value, previous: Option<&ConversationEvent>) -> Sender {
    raw.get("sender")
        .and_then(|v| Sender::deserialize(v).ok())
        .unwrap_or(match previous.map(|e| e.sender) {
            Some(Sender::Visitor) => Sender::Me,
            _ => Sender::Visitor,
        })
}

pub fn parse_conversation_json(text: &str) -> Result<Vec<ConversationEvent>> {
    let value: Value = serde_json::from_str(text).map_err(|e| Error::ConversationJson {
        message: e.to_string(),
    })?;
    parse_conversation_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sender_aliases_are_accepted() {
        let events = parse_conversation_value(json!([
            {"sender": "A", "text": "a"},
            {"sender": "other", "text": "b"},
            {"sender": "me", "text": "c"},
        ]))
        .unwrap();
        let senders = events.iter().map(|e| e.sender).collect::<Vec<_>>();
        assert_eq!(senders, vec![Sender::Me, Sender::Visitor, Sender::Me]);
    }

    #[test]
    fn chart_records_use_content_type_alias() {
        let events = parse_conversation_value(json!([{
            "id": 7,
            "sender": "visitor",
            "contentType": "chart",
            "chartData": {
                "type": "horizontalBar",
                "title": "Languages",
                "items": [{"label": "Rust", "value": 60}, {"label": "Go"}]
            }
        }]))
        .unwrap();
        assert_eq!(events[0].id.as_deref(), Some("7"));
        let EventContent::Chart(chart) = &events[0].content else {
            panic!("expected a chart event");
        };
        assert_eq!(chart.chart_type, ChartType::Bar);
        assert_eq!(chart.items[1].value_or_zero(), 0.0);
        assert_eq!(chart.scale_max(), 60.0);
    }

    #[test]
    fn missing_payloads_degrade_to_empty_text() {
        let events = parse_conversation_value(json!([
            {"sender": "me"},
            {"sender": "me", "kind": "chart"},
        ]))
        .unwrap();
        assert_eq!(events[0].content, EventContent::Text(String::new()));
        assert_eq!(events[1].content, EventContent::Text(String::new()));
    }

    #[test]
    fn unknown_chart_types_are_preserved() {
        let chart: ChartData = serde_json::from_value(json!({"type": "radar"})).unwrap();
        assert_eq!(chart.chart_type, ChartType::Unsupported("radar".to_string()));
    }

    #[test]
    fn an_unknown_sender_degrades_to_an_empty_bubble() {
        let events = parse_conversation_json(
            r#"[{"sender": "me", "text": "a"}, {"sender": "robot", "text": "x"}, 42]"#,
        )
        .unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].sender, Sender::Visitor);
        assert_eq!(events[1].content, EventContent::Text(String::new()));
        assert_eq!(events[2].sender, Sender::Me);
    }

    #[test]
    fn malformed_chart_fields_fall_back_per_row() {
        let events = parse_conversation_value(json!([
            {"sender": "me", "text": "Hi there"},
            {
                "sender": "visitor",
                "kind": "chart",
                "chartData": {
                    "type": "bar",
                    "title": 5,
                    "items": [
                        {"label": "Rust", "value": 12},
                        {"label": "Go", "value": "n/a"},
                        {"label": "Zig", "value": " 7.5 "},
                        "oops"
                    ],
                    "maxValue": "lots"
                }
            },
            {"sender": "visitor", "kind": "chart", "chartData": {"type": "donut", "items": {"a": 1}}},
            {"sender": "me", "text": "Nice"},
        ]))
        .unwrap();
        assert_eq!(events.len(), 4);

        let EventContent::Chart(bar) = &events[1].content else {
            panic!("expected a chart event");
        };
        assert_eq!(bar.title, None);
        assert_eq!(bar.max_value, None);
        let values = bar.items.iter().map(ChartItem::value_or_zero).collect::<Vec<_>>();
        assert_eq!(values, vec![12.0, 0.0, 7.5, 0.0]);
        assert_eq!(bar.items[1].label, "Go");
        assert_eq!(bar.items[3].label, "");

        let EventContent::Chart(donut) = &events[2].content else {
            panic!("expected a chart event");
        };
        assert_eq!(donut.chart_type, ChartType::Donut);
        assert!(donut.items.is_empty());
    }
}
