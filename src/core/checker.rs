use crate::domain::model::{ChildLookup, ParentRef};
use crate::domain::ports::{AppRepository, EnvironmentRepository, PipelineRepository, StoreResult};
use crate::utils::error::{GuardError, Result};
use std::sync::Arc;
use tracing::{Instrument, Span};

/// Answers whether a parent resource still has active children.
///
/// Child kind per parent: environments for a cluster, pipelines for an
/// environment, apps for a team. Only an explicit [`ChildLookup::NotFound`]
/// counts as "no children"; a `Found` result is treated as blocking even when
/// it carries no rows. Lookup failures are reported as
/// [`GuardError::Infrastructure`] and never folded into either answer.
#[derive(Clone)]
pub struct DependencyChecker {
    environments: Arc<dyn EnvironmentRepository>,
    pipelines: Arc<dyn PipelineRepository>,
    apps: Arc<dyn AppRepository>,
    span: Span,
}

impl DependencyChecker {
    pub fn new(
        environments: Arc<dyn EnvironmentRepository>,
        pipelines: Arc<dyn PipelineRepository>,
        apps: Arc<dyn AppRepository>,
    ) -> Self {
        Self {
            environments,
            pipelines,
            apps,
            span: Span::none(),
        }
    }

    /// 指定此元件的日誌 span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub async fn has_active_children(&self, parent: ParentRef) -> Result<bool> {
        self.check(parent).instrument(self.span.clone()).await
    }

    async fn check(&self, parent: ParentRef) -> Result<bool> {
        let (operation, lookup) = match parent {
            ParentRef::Cluster(id) => (
                "find environments by cluster",
                count(self.environments.find_active_by_cluster_id(id).await),
            ),
            ParentRef::Environment(id) => (
                "find active pipelines by environment",
                count(self.pipelines.find_active_by_environment_id(id).await),
            ),
            ParentRef::Team(id) => (
                "find apps by team",
                count(self.apps.find_active_by_team_id(id).await),
            ),
        };

        match lookup {
            Ok(None) => {
                tracing::debug!(resource = %parent, "no active children found");
                Ok(false)
            }
            Ok(Some(rows)) => {
                tracing::debug!(
                    resource = %parent,
                    rows,
                    "active {} found",
                    parent.kind().child_label()
                );
                Ok(true)
            }
            Err(source) => {
                tracing::error!(
                    resource = %parent,
                    operation,
                    error = %source,
                    "dependency lookup failed"
                );
                Err(GuardError::infrastructure(operation, parent, source))
            }
        }
    }
}

// NotFound => None, Found(rows) => Some(row count), 錯誤原樣傳回
fn count<T>(lookup: StoreResult<ChildLookup<T>>) -> StoreResult<Option<usize>> {
    lookup.map(|result| match result {
        ChildLookup::NotFound => None,
        ChildLookup::Found(rows) => Some(rows.len()),
    })
}
