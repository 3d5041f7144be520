use crate::core::guard::DeletionGuard;
use crate::domain::model::{ActorId, Cluster, Environment, ResourceKind, Team};
use crate::domain::ports::Authorizer;
use crate::utils::error::{GuardError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A delete request coming from the request layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "resource", rename_all = "snake_case")]
pub enum DeleteCommand {
    Cluster(Cluster),
    Environment(Environment),
    Team(Team),
}

impl DeleteCommand {
    pub fn kind(&self) -> ResourceKind {
        match self {
            DeleteCommand::Cluster(_) => ResourceKind::Cluster,
            DeleteCommand::Environment(_) => ResourceKind::Environment,
            DeleteCommand::Team(_) => ResourceKind::Team,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DeleteCommand::Cluster(cluster) => &cluster.name,
            DeleteCommand::Environment(environment) => &environment.name,
            DeleteCommand::Team(team) => &team.name,
        }
    }
}

/// In-process entry point: authenticates the actor, asks the [`Authorizer`],
/// then runs the guarded delete under a request deadline.
#[derive(Clone)]
pub struct DeleteHandler {
    guard: Arc<DeletionGuard>,
    authorizer: Arc<dyn Authorizer>,
    request_timeout: Duration,
}

impl DeleteHandler {
    pub fn new(guard: Arc<DeletionGuard>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            guard,
            authorizer,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub async fn handle(&self, command: DeleteCommand, actor: ActorId) -> Result<()> {
        if !actor.is_authenticated() {
            tracing::warn!(kind = %command.kind(), name = command.name(), "unauthenticated delete request");
            return Err(GuardError::Unauthenticated);
        }

        if !self
            .authorizer
            .is_allowed(actor, command.kind(), command.name())
        {
            tracing::warn!(%actor, kind = %command.kind(), name = command.name(), "delete forbidden");
            return Err(GuardError::Forbidden {
                actor,
                kind: command.kind(),
                resource: command.name().to_string(),
            });
        }

        let started = Instant::now();
        let run = async {
            match &command {
                DeleteCommand::Cluster(cluster) => self.guard.delete_cluster(cluster, actor).await,
                DeleteCommand::Environment(environment) => {
                    self.guard.delete_environment(environment, actor).await
                }
                DeleteCommand::Team(team) => self.guard.delete_team(team, actor).await,
            }
        };

        match tokio::time::timeout(self.request_timeout, run).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(
                    kind = %command.kind(),
                    name = command.name(),
                    timeout_ms = self.request_timeout.as_millis() as u64,
                    "delete request timed out"
                );
                Err(GuardError::Timeout {
                    kind: command.kind(),
                    resource: command.name().to_string(),
                    elapsed: started.elapsed(),
                })
            }
        }
    }
}
