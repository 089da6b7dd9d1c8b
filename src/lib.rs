// src/lib.rs
//
// Contacts backend: persisted contact/group store, view projection, list
// session state and a JSON command bridge.
//
//   ContactStore  (store.rs, groups.rs) - CRUD + bulk + membership, whole-collection writes
//   view          (view.rs)             - scope / search / tag projection, badge counts
//   ContactsSession (session.rs)        - selection, bulk actions, confirmations
//   ContactsBridge  (bridge.rs)         - JSON commands for a UI shell
//   Storage       (storage.rs)          - get/set boundary (memory, SQLite)

use once_cell::sync::OnceCell;

pub mod bridge;
pub mod config;
pub mod error;
pub mod groups;
pub mod models;
pub mod session;
pub mod storage;
pub mod store;
pub mod view;

pub use bridge::ContactsBridge;
pub use config::{SeedSource, StoreConfig};
pub use error::{StorageError, StoreError, StoreResult};
pub use models::{Contact, ContactPatch, Group, GroupPatch, NewContact, NewGroup, StoreEvent};
pub use session::{BulkAction, BulkOutcome, ContactsSession};
pub use storage::{MemoryStorage, SqliteStorage, Storage};
pub use store::{ContactStore, StoreSubscription};
pub use view::{ActiveView, TagFilter, ViewCounts, ViewQuery};

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Installs the stderr tracing subscriber once per process. `RUST_LOG`
/// overrides `default_filter`.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.get_or_init(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));

        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);

        // Another subscriber may already be installed (tests, host app).
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init();

        tracing::debug!("Tracing initialized");
    });
}
