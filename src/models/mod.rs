// src/models/mod.rs
//
// Models module - data types for the contacts backend
//
// Structure:
//   core.rs     - Entity types (Contact, Group) and their derived fields
//   dto.rs      - Creation inputs, typed patches, snapshot
//   commands.rs - JSON commands accepted by the bridge
//   events.rs   - Store change notifications

pub mod core;
pub mod dto;
pub mod commands;
pub mod events;

// Re-exports for convenience
pub use self::core::{Contact, Group, avatar_for, member_count, sync_member_counts};
pub use dto::*;
pub use events::StoreEvent;
