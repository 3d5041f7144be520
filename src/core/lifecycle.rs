use crate::domain::model::{ActorId, Cluster, Environment, Resource, Team};
use crate::domain::ports::LifecycleService;
use crate::utils::error::{GuardError, Result};
use std::sync::Arc;
use tracing::{Instrument, Span};

/// Base delete service: hands a delete to the lifecycle service of each
/// resource kind without any dependency checks.
#[derive(Clone)]
pub struct DeleteService {
    clusters: Arc<dyn LifecycleService<Cluster>>,
    environments: Arc<dyn LifecycleService<Environment>>,
    teams: Arc<dyn LifecycleService<Team>>,
    span: Span,
}

impl DeleteService {
    pub fn new(
        clusters: Arc<dyn LifecycleService<Cluster>>,
        environments: Arc<dyn LifecycleService<Environment>>,
        teams: Arc<dyn LifecycleService<Team>>,
    ) -> Self {
        Self {
            clusters,
            environments,
            teams,
            span: Span::none(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub async fn delete_cluster(&self, cluster: &Cluster, actor: ActorId) -> Result<()> {
        delegate(self.clusters.as_ref(), cluster, actor, "delete cluster")
            .instrument(self.span.clone())
            .await
    }

    pub async fn delete_environment(&self, environment: &Environment, actor: ActorId) -> Result<()> {
        delegate(
            self.environments.as_ref(),
            environment,
            actor,
            "delete environment",
        )
        .instrument(self.span.clone())
        .await
    }

    pub async fn delete_team(&self, team: &Team, actor: ActorId) -> Result<()> {
        delegate(self.teams.as_ref(), team, actor, "delete team")
            .instrument(self.span.clone())
            .await
    }
}

async fn delegate<R: Resource>(
    service: &dyn LifecycleService<R>,
    resource: &R,
    actor: ActorId,
    operation: &'static str,
) -> Result<()> {
    match service.delete(resource, actor).await {
        Ok(()) => {
            tracing::info!(
                resource = %resource.parent_ref(),
                name = resource.name(),
                %actor,
                "{} deleted",
                R::KIND
            );
            Ok(())
        }
        Err(source) => {
            tracing::error!(
                resource = %resource.parent_ref(),
                name = resource.name(),
                %actor,
                operation,
                error = %source,
                "error in deleting {}",
                R::KIND
            );
            Err(GuardError::infrastructure(
                operation,
                resource.parent_ref(),
                source,
            ))
        }
    }
}
