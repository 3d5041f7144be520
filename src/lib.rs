pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{InMemoryInventory, StaticAuthorizer};
pub use app::{DeleteCommand, DeleteHandler};
pub use config::GuardConfig;
pub use crate::core::{
    checker::DependencyChecker,
    guard::{DeletionGuard, EnvironmentFailurePolicy},
    lifecycle::DeleteService,
};
pub use utils::error::{GuardError, Result};
