pub mod checker;
pub mod guard;
pub mod lifecycle;

pub use crate::domain::model::{ActorId, ChildLookup, ParentRef, Resource, ResourceKind};
pub use crate::domain::ports::{
    AppRepository, Authorizer, EnvironmentRepository, LifecycleService, PipelineRepository,
    StoreError, StoreResult,
};
pub use crate::utils::error::Result;
