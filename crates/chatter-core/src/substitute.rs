//! `{placeholder}` substitution.
//!
//! Unknown keys are left verbatim so missing data is visible in the output.

use crate::conversation::{ConversationEvent, EventContent};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("valid regex"))
}

/// A flat key/value map resolved by an external collaborator before generation starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Substitutions(IndexMap<String, String>);

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds a map from a JSON object. Scalars are stringified; `null` entries are skipped.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::Substitutions {
                message: "expected a JSON object".to_string(),
            });
        };
        let mut out = Self::new();
        for (key, v) in map {
            let text = match v {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Bool(_) | Value::Number(_) => v.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(Error::Substitutions {
                        message: format!("value for `{key}` is not a scalar"),
                    });
                }
            };
            out.insert(key.clone(), text);
        }
        Ok(out)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = json5::from_str(text).map_err(|e| Error::Substitutions {
            message: e.to_string(),
        })?;
        Self::from_value(&value)
    }

    /// Replaces every `{key}` token found in the map.
    pub fn resolve<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.is_empty() || !text.contains('{') {
            return Cow::Borrowed(text);
        }
        placeholder_regex().replace_all(text, |caps: &Captures<'_>| {
            match self.get(&caps[1]) {
                Some(v) => v.to_string(),
                None => caps[0].to_string(),
            }
        })
    }

    fn resolve_owned(&self, text: &str) -> String {
        self.resolve(text).into_owned()
    }

    /// Returns a copy of `event` with placeholders resolved in every user-visible string.
    pub fn resolve_event(&self, event: &ConversationEvent) -> ConversationEvent {
        let content = match &event.content {
            EventContent::Text(text) => EventContent::Text(self.resolve_owned(text)),
            EventContent::Chart(chart) => {
                let mut chart = chart.clone();
                chart.title = chart.title.as_deref().map(|t| self.resolve_owned(t));
                chart.center_text = chart.center_text.as_deref().map(|t| self.resolve_owned(t));
                for item in &mut chart.items {
                    item.label = self.resolve_owned(&item.label);
                }
                EventContent::Chart(chart)
            }
        };
        ConversationEvent {
            id: event.id.clone(),
            sender: event.sender,
            content,
            reaction: event.reaction.as_deref().map(|r| self.resolve_owned(r)),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Substitutions {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
