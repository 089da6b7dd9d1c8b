// src/config.rs
//
// Store configuration: storage keys and the dataset used to seed an empty
// store.

use std::path::PathBuf;

pub const CONTACTS_STORAGE_KEY: &str = "tria-contacts";
pub const GROUPS_STORAGE_KEY: &str = "tria-groups";

const BUNDLED_CONTACTS: &str = include_str!("../seed/contacts.json");
const BUNDLED_GROUPS: &str = include_str!("../seed/groups.json");

/// Where a collection comes from the first time its key is absent.
#[derive(Debug, Clone, Default)]
pub enum SeedSource {
    /// Datasets compiled into the crate
    #[default]
    Bundled,
    /// Start with empty collections
    Empty,
    /// Caller-supplied JSON arrays
    Inline { contacts: String, groups: String },
}

impl SeedSource {
    pub fn contacts_json(&self) -> &str {
        match self {
            SeedSource::Bundled => BUNDLED_CONTACTS,
            SeedSource::Empty => "[]",
            SeedSource::Inline { contacts, .. } => contacts,
        }
    }

    pub fn groups_json(&self) -> &str {
        match self {
            SeedSource::Bundled => BUNDLED_GROUPS,
            SeedSource::Empty => "[]",
            SeedSource::Inline { groups, .. } => groups,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub contacts_key: String,
    pub groups_key: String,
    pub seed: SeedSource,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            contacts_key: CONTACTS_STORAGE_KEY.to_string(),
            groups_key: GROUPS_STORAGE_KEY.to_string(),
            seed: SeedSource::Bundled,
        }
    }
}

impl StoreConfig {
    pub fn with_seed(mut self, seed: SeedSource) -> Self {
        self.seed = seed;
        self
    }
}

/// Default data directory for the CLI: `<local data dir>/tria-contacts`,
/// falling back to `./contacts-data` when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tria-contacts"))
        .unwrap_or_else(|| PathBuf::from("./contacts-data"))
}
