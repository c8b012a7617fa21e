//! Item id to display-name translation.
//!
//! The game's static item dump is a JSON document grouping item entries by
//! category; an item's numeric id is its position in a fixed category
//! walk. Loading happens once at startup; after that the index is
//! immutable and can be shared across threads without locking.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value as Json;

/// Category walk order; ids are assigned by position across this walk.
const CATEGORIES: [&str; 15] = [
    "hideoutitem",
    "farmableitem",
    "simpleitem",
    "consumableitem",
    "consumablefrominventoryitem",
    "equipmentitem",
    "weapon",
    "mount",
    "furnitureitem",
    "mountskin",
    "journalitem",
    "labourercontract",
    "crystalleagueitem",
    "killtrophy",
    "trackingitem",
];

/// Result type for item index loading.
pub type ItemIndexResult<T> = Result<T, ItemIndexError>;

/// Errors that can occur while loading the item index.
#[derive(Debug)]
pub enum ItemIndexError {
    /// The asset file could not be read.
    Io(std::io::Error),
    /// The asset is not valid JSON.
    Json(serde_json::Error),
    /// The JSON document does not contain the expected `items` object.
    MissingItemsKey,
}

impl fmt::Display for ItemIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read item asset: {err}"),
            Self::Json(err) => write!(f, "failed to parse item asset: {err}"),
            Self::MissingItemsKey => write!(f, "item asset has no top-level \"items\" object"),
        }
    }
}

impl std::error::Error for ItemIndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::MissingItemsKey => None,
        }
    }
}

impl From<std::io::Error> for ItemIndexError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ItemIndexError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Immutable mapping from numeric item id to internal unique name.
#[derive(Debug, Default)]
pub struct ItemIndex {
    names: HashMap<i32, String>,
}

impl ItemIndex {
    /// Loads the index from an items JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ItemIndexError`] when the file is unreadable, not JSON,
    /// or missing the `items` object.
    pub fn load_from_file(path: impl AsRef<Path>) -> ItemIndexResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parses the index from an items JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ItemIndexError`] when the document is not JSON or
    /// missing the `items` object.
    pub fn from_json_str(contents: &str) -> ItemIndexResult<Self> {
        let root: Json = serde_json::from_str(contents)?;
        let items = root
            .get("items")
            .and_then(Json::as_object)
            .ok_or(ItemIndexError::MissingItemsKey)?;

        let mut names = HashMap::new();
        let mut index: i32 = 0;
        for category in CATEGORIES {
            let Some(entries) = items.get(category) else {
                continue;
            };
            match entries {
                Json::Array(array) => {
                    for entry in array {
                        if let Some(name) = unique_name(entry) {
                            names.insert(index, name.to_owned());
                            index += 1;
                        }
                    }
                }
                Json::Object(_) => {
                    if let Some(name) = unique_name(entries) {
                        names.insert(index, name.to_owned());
                        index += 1;
                    }
                }
                _ => {}
            }
        }

        Ok(Self { names })
    }

    /// Wraps the index for lock-free sharing across threads.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Resolved display name for an item id, or `None` on a miss.
    #[must_use]
    pub fn name_for(&self, item_id: i32) -> Option<String> {
        self.names.get(&item_id).map(|name| format_item_name(name))
    }

    /// Number of indexed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` when nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn unique_name(entry: &Json) -> Option<&str> {
    let name = entry.get("@uniquename")?.as_str()?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// The substitute name used when an id has no index entry.
#[must_use]
pub fn placeholder_name(item_id: i32) -> String {
    format!("Item#{item_id}")
}

/// Converts an internal unique name to a readable display name.
///
/// `T4_BAG` becomes `T4 Bag`; the enchantment suffix folds into the tier:
/// `T8_LEATHER@3` becomes `T8.3 Leather`.
#[must_use]
pub fn format_item_name(name: &str) -> String {
    if name.is_empty() {
        return "Unknown".to_owned();
    }

    let (base, enchant) = match name.split_once('@') {
        Some((base, enchant)) => (base, Some(enchant)),
        None => (name, None),
    };

    let mut parts = base.split('_');
    let first = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    if first.len() >= 2 && first.starts_with('T') && !rest.is_empty() {
        let tier = match enchant {
            Some(enchant) => format!("{first}.{enchant}"),
            None => first.to_owned(),
        };
        let rest = rest
            .iter()
            .map(|word| title_case(word))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{tier} {rest}")
    } else {
        base.split('_')
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
