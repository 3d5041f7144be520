// Adapters layer: concrete implementations of the domain ports.

pub mod auth;
pub mod memory;

pub use auth::StaticAuthorizer;
pub use memory::{InMemoryInventory, InventorySnapshot};
