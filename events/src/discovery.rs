//! Discovery mode: a catalogue of every event code observed.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use protocol16::{Parameters, Value};
use serde::Serialize;
use tracing::info;

/// Sample strings longer than this are cut.
const MAX_SAMPLE_STRING: usize = 100;
/// Sample byte runs longer than this collapse to a placeholder.
const MAX_SAMPLE_BYTES: usize = 50;
/// Sample heterogeneous arrays longer than this collapse to a placeholder.
const MAX_SAMPLE_ARRAY: usize = 10;

/// Result type for discovery persistence.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Errors that can occur while saving the catalogue.
#[derive(Debug)]
pub enum DiscoveryError {
    /// Creating the parent directory or writing the file failed.
    Io(std::io::Error),
    /// Serializing the catalogue failed.
    Json(serde_json::Error),
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to write discovery file: {err}"),
            Self::Json(err) => write!(f, "failed to serialize discovery catalogue: {err}"),
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DiscoveryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// One catalogued event code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredEvent {
    pub code: i16,
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Sample value per parameter key, truncated for display.
    pub sample_data: BTreeMap<u8, serde_json::Value>,
    /// Runtime type name per parameter key.
    pub param_types: BTreeMap<u8, String>,
}

/// The catalogue of observed event codes.
///
/// Writes happen during parsing under the write lock; snapshot and save
/// take the read lock and deep-copy.
#[derive(Debug, Default)]
pub struct Discovery {
    events: RwLock<HashMap<i16, DiscoveredEvent>>,
}

impl Discovery {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one sighting of `code` with its parameters.
    ///
    /// `handled` marks codes the interpreter already knows; a first
    /// sighting of an unhandled code is logged.
    pub fn record(&self, code: i16, params: &Parameters, handled: bool) {
        let Ok(mut events) = self.events.write() else {
            return;
        };

        let now = Utc::now();
        let entry = events.entry(code).or_insert_with(|| {
            if !handled {
                info!(code, params = params.len(), "new event code discovered");
            }
            DiscoveredEvent {
                code,
                count: 0,
                first_seen: now,
                last_seen: now,
                sample_data: BTreeMap::new(),
                param_types: BTreeMap::new(),
            }
        });

        entry.count += 1;
        entry.last_seen = now;

        // Keep the first sample seen for each parameter key.
        for (key, value) in params {
            if !entry.param_types.contains_key(key) {
                entry
                    .param_types
                    .insert(*key, value.type_name().to_owned());
                entry.sample_data.insert(*key, sample_json(value));
            }
        }
    }

    /// Number of distinct codes observed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().map_or(0, |events| events.len())
    }

    /// Returns `true` when nothing has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deep-copies the catalogue. Mutating the returned map has no effect
    /// on the catalogue.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<i16, DiscoveredEvent> {
        self.events.read().map_or_else(|_| HashMap::new(), |events| events.clone())
    }

    /// Serializes the catalogue to a pretty JSON file keyed by decimal
    /// event-code strings, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] on I/O or serialization failure.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> DiscoveryResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // BTreeMap keys serialize as decimal JSON object keys.
        let ordered: BTreeMap<i16, DiscoveredEvent> =
            self.snapshot().into_iter().collect();
        let json = serde_json::to_string_pretty(&ordered)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// JSON-reflects a sample value with the display truncation rules.
fn sample_json(value: &Value) -> serde_json::Value {
    use serde_json::json;

    match value {
        Value::Null => serde_json::Value::Null,
        Value::U8(v) => json!(v),
        Value::Bool(v) => json!(v),
        Value::I16(v) => json!(v),
        Value::I32(v) => json!(v),
        Value::I64(v) => json!(v),
        Value::F32(v) => serde_json::Number::from_f64(f64::from(*v))
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::F64(v) => serde_json::Number::from_f64(*v)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Str(v) => {
            if v.chars().count() > MAX_SAMPLE_STRING {
                let cut: String = v.chars().take(MAX_SAMPLE_STRING).collect();
                json!(format!("{cut}..."))
            } else {
                json!(v)
            }
        }
        Value::Bytes(v) => {
            if v.len() > MAX_SAMPLE_BYTES {
                json!(format!("[{} bytes]", v.len()))
            } else {
                json!(v)
            }
        }
        Value::Array(v) | Value::ObjectArray(v) => {
            if v.len() > MAX_SAMPLE_ARRAY {
                json!(format!("[array of {} items]", v.len()))
            } else {
                serde_json::Value::Array(v.iter().map(sample_json).collect())
            }
        }
        Value::IntArray(v) => json!(v),
        Value::StrArray(v) => json!(v),
        Value::Dict(entries) => {
            let map: serde_json::Map<String, serde_json::Value> = entries
                .iter()
                .map(|(key, val)| (dict_key_string(key), sample_json(val)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

fn dict_key_string(key: &Value) -> String {
    match key {
        Value::Str(v) => v.clone(),
        Value::U8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::Bool(v) => v.to_string(),
        other => format!("{other:?}"),
    }
}
