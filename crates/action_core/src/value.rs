use serde::{Deserialize, Serialize};

use crate::record::{ActionRecord, RecordStore};

const DEFAULT_SCHEMA: &str = "playlist-actions";
const DEFAULT_VERSION: u32 = 1;

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

/// The record list as exchanged with the host for saving and loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionList {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
}

impl ActionList {
    pub fn from_store(store: &RecordStore) -> Self {
        Self::from_records(store.records().to_vec())
    }

    pub fn from_records(actions: Vec<ActionRecord>) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            actions,
        }
    }

    pub fn into_store(self) -> RecordStore {
        RecordStore::new(self.actions)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
