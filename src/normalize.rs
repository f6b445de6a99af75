use serde::Serialize;
use serde_json::{Map, Value};
use std::any::type_name;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;

pub const DEFAULT_MAX_DEPTH: usize = 9;
pub const DEFAULT_MAX_ITEMS: usize = 1000;

/// Bounds the size of structured values before they are encoded.
///
/// Containers nested deeper than `max_depth` are replaced by a marker
/// string, and containers with more than `max_items` entries are cut off
/// with a trailing `"..."` entry describing how much was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    pub max_depth: usize,
    pub max_items: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl Normalizer {
    pub fn new(max_depth: usize, max_items: usize) -> Self {
        Self {
            max_depth,
            max_items: max_items.max(1),
        }
    }

    /// Normalize a map that sits directly under the record (depth 1).
    pub fn normalize_map(&self, map: &Map<String, Value>) -> Map<String, Value> {
        self.object(map, 1)
    }

    pub fn normalize(&self, value: &Value, depth: usize) -> Value {
        if depth > self.max_depth {
            return Value::String(format!(
                "Over {} levels deep, aborting normalization",
                self.max_depth
            ));
        }

        match value {
            Value::Object(map) => Value::Object(self.object(map, depth)),
            Value::Array(items) => {
                let mut out: Vec<Value> = items
                    .iter()
                    .take(self.max_items)
                    .map(|item| self.normalize(item, depth + 1))
                    .collect();
                if items.len() > self.max_items {
                    out.push(Value::String(self.overflow(items.len())));
                }
                Value::Array(out)
            }
            scalar => scalar.clone(),
        }
    }

    fn object(&self, map: &Map<String, Value>, depth: usize) -> Map<String, Value> {
        let mut out = Map::new();
        for (key, value) in map.iter().take(self.max_items) {
            out.insert(key.clone(), self.normalize(value, depth + 1));
        }
        if map.len() > self.max_items {
            out.insert("...".to_string(), Value::String(self.overflow(map.len())));
        }
        out
    }

    fn overflow(&self, total: usize) -> String {
        format!(
            "Over {} items ({} total), aborting normalization",
            self.max_items, total
        )
    }
}

/// Serializable snapshot of an error and its `source()` chain.
///
/// The outermost error records its concrete type as `class`; causes reached
/// through `source()` are type-erased, so they only carry a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Box<ErrorReport>>,
}

impl ErrorReport {
    pub fn new<E: Error + 'static>(err: &E) -> Self {
        let mut report = Self::from_dyn(err);
        report.class = Some(type_name::<E>().to_string());
        report
    }

    /// Like [`ErrorReport::new`], also capturing a backtrace of the current
    /// thread when enabled through `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`.
    pub fn capture<E: Error + 'static>(err: &E) -> Self {
        Self::new(err).with_backtrace(&Backtrace::capture())
    }

    pub fn from_dyn(err: &(dyn Error + 'static)) -> Self {
        Self {
            class: None,
            message: err.to_string(),
            trace: Vec::new(),
            previous: err.source().map(|source| Box::new(Self::from_dyn(source))),
        }
    }

    pub fn with_backtrace(mut self, backtrace: &Backtrace) -> Self {
        if backtrace.status() == BacktraceStatus::Captured {
            self.trace = backtrace
                .to_string()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
        }
        self
    }

    pub fn into_value(self) -> Value {
        // A struct of strings, vectors and options always serializes.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
