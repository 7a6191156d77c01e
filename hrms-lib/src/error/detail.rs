//! Structured validation errors from the API.

use std::collections::BTreeMap;

use serde_json::Value;

/// A JSON error body in the API's validation format.
///
/// The server answers with any mix of a top-level `detail` string, a
/// `non_field_errors` list and one message list per offending field:
///
/// ```json
/// {"employee_id": ["employee with this employee id already exists."]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetail {
    pub detail: Option<String>,
    pub non_field_errors: Vec<String>,
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ErrorDetail {
    /// Parse an error body. Returns `None` for anything that is not a JSON
    /// object or carries no messages.
    pub fn parse(body: &str) -> Option<Self> {
        let Value::Object(map) = serde_json::from_str::<Value>(body).ok()? else {
            return None;
        };

        let mut detail = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "detail" => detail.detail = value.as_str().map(str::to_string),
                "non_field_errors" => detail.non_field_errors = messages(&value),
                _ => {
                    let list = messages(&value);
                    if !list.is_empty() {
                        detail.fields.insert(key, list);
                    }
                }
            }
        }

        let empty = detail.detail.is_none()
            && detail.non_field_errors.is_empty()
            && detail.fields.is_empty();
        (!empty).then_some(detail)
    }

    /// First message for `field`.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|list| list.first())
            .map(String::as_str)
    }

    /// `detail`, else the first non-field error, else the first message of
    /// the first listed field that has one.
    pub fn first_message(&self, fields: &[&str]) -> Option<&str> {
        self.detail
            .as_deref()
            .or_else(|| self.non_field_errors.first().map(String::as_str))
            .or_else(|| fields.iter().find_map(|f| self.field(f)))
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(detail) = &self.detail {
            return f.write_str(detail);
        }
        let mut parts: Vec<String> = self.non_field_errors.clone();
        for (field, list) in &self.fields {
            for message in list {
                parts.push(format!("{field}: {message}"));
            }
        }
        f.write_str(&parts.join("; "))
    }
}

fn messages(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
