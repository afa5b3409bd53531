//! Team records and normalization of the raw record tree
//!
//! The document store hands back either a list or a map of records. The tree
//! is decoded once into [`RecordTree`] and then flattened into a single
//! ordered stream of raw record maps.

use serde_json::{Map, Value};
use tracing::debug;

use crate::{Error, Result};

/// Name used when a record does not carry a team name
pub const UNKNOWN_TEAM: &str = "Unknown Team";

/// Wire field holding the team name
pub const NAME_FIELD: &str = "name_of_the_team";
/// Wire field holding the repository URL
pub const REPO_FIELD: &str = "github_repo";
/// Wire field holding the local base path
pub const PATH_FIELD: &str = "local_path";

/// One raw record as stored in the document store
pub type RawRecord = Map<String, Value>;

/// One team's descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRecord {
    /// Team name, also the directory name under the base path
    pub name: String,
    /// Repository to clone or pull
    pub repository_url: Option<String>,
    /// Directory the team directory is created in
    pub local_base_path: Option<String>,
}

impl TeamRecord {
    /// Create a record with all fields present
    pub fn new(
        name: impl Into<String>,
        repository_url: impl Into<String>,
        local_base_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            repository_url: Some(repository_url.into()),
            local_base_path: Some(local_base_path.into()),
        }
    }

    /// Extract a record from its raw map
    ///
    /// Only string values count; anything else is treated as absent. An
    /// absent name falls back to [`UNKNOWN_TEAM`], and so does an empty one:
    /// `""` is not kept as a name, because joining it onto the base path
    /// would make the team directory the base path itself.
    pub fn from_raw(raw: &RawRecord) -> Self {
        let name = string_field(raw, NAME_FIELD).unwrap_or_else(|| UNKNOWN_TEAM.to_string());

        Self {
            name,
            repository_url: string_field(raw, REPO_FIELD),
            local_base_path: string_field(raw, PATH_FIELD),
        }
    }
}

fn string_field(raw: &RawRecord, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Shape of the tree returned by the record source
#[derive(Debug, Clone, PartialEq)]
pub enum RecordTree {
    /// Nothing at the path: null, an empty list, or an empty map
    Empty,
    /// A list of records; non-map elements are skipped
    Sequence(Vec<Value>),
    /// A map of record id to record; keys are ignored
    Mapping(Map<String, Value>),
    /// Any other JSON value
    Invalid(Value),
}

impl RecordTree {
    /// Decode the raw tree fetched from the store
    pub fn decode(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Empty,
            Some(Value::Array(items)) if items.is_empty() => Self::Empty,
            Some(Value::Object(map)) if map.is_empty() => Self::Empty,
            Some(Value::Array(items)) => Self::Sequence(items),
            Some(Value::Object(map)) => Self::Mapping(map),
            Some(other) => Self::Invalid(other),
        }
    }

    /// Flatten the tree into a stream of raw records
    ///
    /// Fails with [`Error::NoData`] for an empty tree and
    /// [`Error::UnexpectedStructure`] for a scalar.
    pub fn into_records(self) -> Result<RawRecords> {
        match self {
            Self::Empty => Err(Error::NoData),
            Self::Invalid(value) => {
                debug!(kind = value_kind(&value), "Record tree is neither list nor map");
                Err(Error::UnexpectedStructure)
            }
            Self::Sequence(items) => Ok(RawRecords::Sequence(items.into_iter())),
            Self::Mapping(map) => Ok(RawRecords::Mapping(map.into_iter())),
        }
    }
}

/// Lazy iterator over the raw records of a tree
pub enum RawRecords {
    /// Elements of a list-shaped tree
    Sequence(std::vec::IntoIter<Value>),
    /// Values of a map-shaped tree, in document order
    Mapping(serde_json::map::IntoIter),
}

impl Iterator for RawRecords {
    type Item = RawRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let value = match self {
                Self::Sequence(items) => items.next()?,
                Self::Mapping(entries) => entries.next()?.1,
            };

            match value {
                Value::Object(record) => return Some(record),
                other => debug!(kind = value_kind(&other), "Skipping non-map record"),
            }
        }
    }
}

impl std::fmt::Debug for RawRecords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shape = match self {
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        };
        f.debug_struct("RawRecords")
            .field("shape", &shape)
            .finish_non_exhaustive()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
