use serde::Deserialize;
use serde_json::{Map, Value};

/// Fixed `ddsource` used when no source is configured.
pub const DEFAULT_SOURCE: &str = "php";

/// Optional delivery attributes attached to every shipped record.
///
/// Each unset attribute falls back to something derived from the record or
/// the environment at delivery time; see
/// [`DatadogHandler`](crate::handler::DatadogHandler).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Attributes {
    pub source: Option<String>,
    pub service: Option<String>,
    pub hostname: Option<String>,
    pub tags: Option<Tags>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn tags(mut self, tags: impl Into<Tags>) -> Self {
        self.tags = Some(tags.into());
        self
    }
}

/// Configured tags, either as a list (`["env:prod"]`) or as a map whose
/// values are the tags (`{"env": "env:prod"}`). Only the values are shipped,
/// in their configured order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<String>),
    Map(Map<String, Value>),
}

impl Tags {
    /// Parse a comma separated list, ignoring blank entries.
    pub fn parse_list(raw: &str) -> Self {
        Tags::List(
            raw.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Tags::List(list) => list.is_empty(),
            Tags::Map(map) => map.is_empty(),
        }
    }

    /// The configured tags joined with `,`, or `None` when there are none.
    pub fn joined(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let joined = match self {
            Tags::List(list) => list.join(","),
            Tags::Map(map) => map
                .values()
                .map(|value| match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        };
        Some(joined)
    }
}

impl From<Vec<String>> for Tags {
    fn from(list: Vec<String>) -> Self {
        Tags::List(list)
    }
}

impl From<Vec<&str>> for Tags {
    fn from(list: Vec<&str>) -> Self {
        Tags::List(list.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Tags {
    fn from(list: [&str; N]) -> Self {
        Tags::List(list.iter().map(|tag| tag.to_string()).collect())
    }
}

impl From<Map<String, Value>> for Tags {
    fn from(map: Map<String, Value>) -> Self {
        Tags::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_list_and_map_forms() {
        let attrs: Attributes = serde_json::from_value(json!({
            "service": "checkout",
            "tags": ["env:prod", "team:x"]
        }))
        .unwrap();
        assert_eq!(attrs.service.as_deref(), Some("checkout"));
        assert_eq!(attrs.tags.unwrap().joined().as_deref(), Some("env:prod,team:x"));

        let attrs: Attributes = serde_json::from_value(json!({
            "tags": {"env": "env:prod", "team": "team:x"}
        }))
        .unwrap();
        assert_eq!(attrs.tags.unwrap().joined().as_deref(), Some("env:prod,team:x"));
    }

    #[test]
    fn rejects_unknown_options() {
        let result = serde_json::from_value::<Attributes>(json!({"sauce": "php"}));
        assert!(result.is_err());
    }

    #[test]
    fn empty_tags_join_to_none() {
        assert_eq!(Tags::List(vec![]).joined(), None);
        assert_eq!(Tags::Map(Map::new()).joined(), None);
    }

    #[test]
    fn parses_comma_separated_list() {
        assert_eq!(
            Tags::parse_list(" env:prod, ,team:x,"),
            Tags::from(["env:prod", "team:x"])
        );
        assert!(Tags::parse_list("").is_empty());
    }

    #[test]
    fn non_string_map_values_are_stringified() {
        let tags = Tags::from(json!({"a": "x:1", "b": 2}).as_object().unwrap().clone());
        assert_eq!(tags.joined().as_deref(), Some("x:1,2"));
    }
}
