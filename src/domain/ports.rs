use crate::domain::model::{
    ActorId, App, ChildLookup, ClusterId, Environment, EnvironmentId, Pipeline, ResourceKind,
    TeamId,
};
use async_trait::async_trait;
use thiserror::Error;

/// Storage-level failures reported by repositories and lifecycle services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: String },

    #[error("constraint violated: {message}")]
    Constraint { message: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait EnvironmentRepository: Send + Sync {
    async fn find_active_by_cluster_id(
        &self,
        cluster_id: ClusterId,
    ) -> StoreResult<ChildLookup<Environment>>;
}

#[async_trait]
pub trait PipelineRepository: Send + Sync {
    async fn find_active_by_environment_id(
        &self,
        environment_id: EnvironmentId,
    ) -> StoreResult<ChildLookup<Pipeline>>;
}

#[async_trait]
pub trait AppRepository: Send + Sync {
    async fn find_active_by_team_id(&self, team_id: TeamId) -> StoreResult<ChildLookup<App>>;
}

/// 實際執行刪除（或停用）的服務
///
/// Not assumed idempotent: a second call for the same resource may fail.
#[async_trait]
pub trait LifecycleService<R>: Send + Sync {
    async fn delete(&self, resource: &R, actor: ActorId) -> StoreResult<()>;
}

/// Authorization capability consumed by the delete handler.
pub trait Authorizer: Send + Sync {
    fn is_allowed(&self, actor: ActorId, kind: ResourceKind, name: &str) -> bool;
}
