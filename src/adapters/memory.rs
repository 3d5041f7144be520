use crate::domain::model::{
    ActorId, App, AuditStamp, ChildLookup, Cluster, ClusterId, Environment, EnvironmentId,
    Pipeline, ResourceKind, Team, TeamId,
};
use crate::domain::ports::{
    AppRepository, EnvironmentRepository, LifecycleService, PipelineRepository, StoreError,
    StoreResult,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// 附帶稽核欄位的資料列
#[derive(Debug, Clone)]
pub struct Row<T> {
    pub value: T,
    pub audit: Option<AuditStamp>,
}

impl<T> Row<T> {
    fn new(value: T) -> Self {
        Self { value, audit: None }
    }
}

#[derive(Debug, Default)]
struct State {
    clusters: BTreeMap<ClusterId, Row<Cluster>>,
    environments: BTreeMap<EnvironmentId, Row<Environment>>,
    pipelines: Vec<Row<Pipeline>>,
    teams: BTreeMap<TeamId, Row<Team>>,
    apps: Vec<Row<App>>,
    fail_lookups: Option<String>,
    fail_deletes: Option<String>,
    lookup_delay: Option<Duration>,
    delete_calls: HashMap<(ResourceKind, i32), usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub clusters: Vec<Cluster>,
    pub environments: Vec<Environment>,
    pub pipelines: Vec<Pipeline>,
    pub teams: Vec<Team>,
    pub apps: Vec<App>,
}

/// In-memory storage backing every repository and lifecycle port.
///
/// Environments are soft-deactivated on delete, clusters and teams are
/// removed. Deleting something that is already gone fails with
/// [`StoreError::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventory {
    state: Arc<RwLock<State>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| StoreError::Unavailable {
            message: "inventory lock poisoned".to_string(),
        })
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| StoreError::Unavailable {
            message: "inventory lock poisoned".to_string(),
        })
    }

    pub fn insert_cluster(&self, cluster: Cluster) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.clusters.contains_key(&cluster.id) {
            return Err(StoreError::Constraint {
                message: format!("duplicate cluster id {}", cluster.id),
            });
        }
        state.clusters.insert(cluster.id, Row::new(cluster));
        Ok(())
    }

    pub fn insert_environment(&self, environment: Environment) -> StoreResult<()> {
        let mut state = self.write()?;
        // 已停用的資料列可以指向已刪除的父資源
        if environment.active && !state.clusters.contains_key(&environment.cluster_id) {
            return Err(StoreError::Constraint {
                message: format!(
                    "environment {} references missing cluster {}",
                    environment.id, environment.cluster_id
                ),
            });
        }
        if state.environments.contains_key(&environment.id) {
            return Err(StoreError::Constraint {
                message: format!("duplicate environment id {}", environment.id),
            });
        }
        state.environments.insert(environment.id, Row::new(environment));
        Ok(())
    }

    pub fn insert_pipeline(&self, pipeline: Pipeline) -> StoreResult<()> {
        let mut state = self.write()?;
        if pipeline.active && !state.environments.contains_key(&pipeline.environment_id) {
            return Err(StoreError::Constraint {
                message: format!(
                    "pipeline {} references missing environment {}",
                    pipeline.id, pipeline.environment_id
                ),
            });
        }
        if state.pipelines.iter().any(|row| row.value.id == pipeline.id) {
            return Err(StoreError::Constraint {
                message: format!("duplicate pipeline id {}", pipeline.id),
            });
        }
        state.pipelines.push(Row::new(pipeline));
        Ok(())
    }

    pub fn insert_team(&self, team: Team) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.teams.contains_key(&team.id) {
            return Err(StoreError::Constraint {
                message: format!("duplicate team id {}", team.id),
            });
        }
        state.teams.insert(team.id, Row::new(team));
        Ok(())
    }

    pub fn insert_app(&self, app: App) -> StoreResult<()> {
        let mut state = self.write()?;
        if app.active && !state.teams.contains_key(&app.team_id) {
            return Err(StoreError::Constraint {
                message: format!("app {} references missing team {}", app.id, app.team_id),
            });
        }
        if state.apps.iter().any(|row| row.value.id == app.id) {
            return Err(StoreError::Constraint {
                message: format!("duplicate app id {}", app.id),
            });
        }
        state.apps.push(Row::new(app));
        Ok(())
    }

    /// Copies every stored row, deactivated ones included, ordered by id.
    pub fn snapshot(&self) -> StoreResult<InventorySnapshot> {
        let state = self.read()?;
        let mut pipelines: Vec<Pipeline> = state.pipelines.iter().map(|r| r.value.clone()).collect();
        pipelines.sort_by_key(|p| p.id);
        let mut apps: Vec<App> = state.apps.iter().map(|r| r.value.clone()).collect();
        apps.sort_by_key(|a| a.id);

        Ok(InventorySnapshot {
            clusters: state.clusters.values().map(|r| r.value.clone()).collect(),
            environments: state.environments.values().map(|r| r.value.clone()).collect(),
            pipelines,
            teams: state.teams.values().map(|r| r.value.clone()).collect(),
            apps,
        })
    }

    pub fn cluster_by_name(&self, name: &str) -> StoreResult<Option<Cluster>> {
        let state = self.read()?;
        Ok(state
            .clusters
            .values()
            .find(|row| row.value.name == name)
            .map(|row| row.value.clone()))
    }

    pub fn environment_by_name(&self, name: &str) -> StoreResult<Option<Environment>> {
        let state = self.read()?;
        Ok(state
            .environments
            .values()
            .find(|row| row.value.active && row.value.name == name)
            .map(|row| row.value.clone()))
    }

    pub fn team_by_name(&self, name: &str) -> StoreResult<Option<Team>> {
        let state = self.read()?;
        Ok(state
            .teams
            .values()
            .find(|row| row.value.active && row.value.name == name)
            .map(|row| row.value.clone()))
    }

    pub fn contains_cluster(&self, id: ClusterId) -> bool {
        self.read()
            .map(|state| state.clusters.contains_key(&id))
            .unwrap_or(false)
    }

    pub fn contains_team(&self, id: TeamId) -> bool {
        self.read()
            .map(|state| state.teams.contains_key(&id))
            .unwrap_or(false)
    }

    /// Stored environment row, including deactivated ones.
    pub fn environment(&self, id: EnvironmentId) -> Option<Row<Environment>> {
        self.read()
            .ok()
            .and_then(|state| state.environments.get(&id).cloned())
    }

    /// Makes every child lookup fail with [`StoreError::Unavailable`].
    pub fn fail_lookups(&self, message: impl Into<String>) {
        if let Ok(mut state) = self.write() {
            state.fail_lookups = Some(message.into());
        }
    }

    /// Makes every lifecycle delete fail with [`StoreError::Unavailable`].
    pub fn fail_deletes(&self, message: impl Into<String>) {
        if let Ok(mut state) = self.write() {
            state.fail_deletes = Some(message.into());
        }
    }

    /// Delays every child lookup, for deadline tests.
    pub fn delay_lookups(&self, delay: Duration) {
        if let Ok(mut state) = self.write() {
            state.lookup_delay = Some(delay);
        }
    }

    pub fn delete_calls(&self, kind: ResourceKind, id: i32) -> usize {
        self.read()
            .ok()
            .and_then(|state| state.delete_calls.get(&(kind, id)).copied())
            .unwrap_or(0)
    }

    async fn before_lookup(&self) -> StoreResult<()> {
        let (delay, failure) = {
            let state = self.read()?;
            (state.lookup_delay, state.fail_lookups.clone())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(message) => Err(StoreError::Unavailable { message }),
            None => Ok(()),
        }
    }

    // 記錄呼叫次數，並套用注入的失敗
    fn begin_delete(state: &mut State, kind: ResourceKind, id: i32) -> StoreResult<()> {
        *state.delete_calls.entry((kind, id)).or_insert(0) += 1;
        match &state.fail_deletes {
            Some(message) => Err(StoreError::Unavailable {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EnvironmentRepository for InMemoryInventory {
    async fn find_active_by_cluster_id(
        &self,
        cluster_id: ClusterId,
    ) -> StoreResult<ChildLookup<Environment>> {
        self.before_lookup().await?;
        let state = self.read()?;
        let rows = state
            .environments
            .values()
            .filter(|row| row.value.active && row.value.cluster_id == cluster_id)
            .map(|row| row.value.clone())
            .collect();
        Ok(ChildLookup::from_rows(rows))
    }
}

#[async_trait]
impl PipelineRepository for InMemoryInventory {
    async fn find_active_by_environment_id(
        &self,
        environment_id: EnvironmentId,
    ) -> StoreResult<ChildLookup<Pipeline>> {
        self.before_lookup().await?;
        let state = self.read()?;
        let rows = state
            .pipelines
            .iter()
            .filter(|row| row.value.active && row.value.environment_id == environment_id)
            .map(|row| row.value.clone())
            .collect();
        Ok(ChildLookup::from_rows(rows))
    }
}

#[async_trait]
impl AppRepository for InMemoryInventory {
    async fn find_active_by_team_id(&self, team_id: TeamId) -> StoreResult<ChildLookup<App>> {
        self.before_lookup().await?;
        let state = self.read()?;
        let rows = state
            .apps
            .iter()
            .filter(|row| row.value.active && row.value.team_id == team_id)
            .map(|row| row.value.clone())
            .collect();
        Ok(ChildLookup::from_rows(rows))
    }
}

#[async_trait]
impl LifecycleService<Cluster> for InMemoryInventory {
    async fn delete(&self, cluster: &Cluster, _actor: ActorId) -> StoreResult<()> {
        let mut state = self.write()?;
        Self::begin_delete(&mut state, ResourceKind::Cluster, cluster.id.0)?;
        state
            .clusters
            .remove(&cluster.id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                kind: ResourceKind::Cluster,
                id: cluster.id.to_string(),
            })
    }
}

#[async_trait]
impl LifecycleService<Environment> for InMemoryInventory {
    async fn delete(&self, environment: &Environment, actor: ActorId) -> StoreResult<()> {
        let mut state = self.write()?;
        Self::begin_delete(&mut state, ResourceKind::Environment, environment.id.0)?;
        match state.environments.get_mut(&environment.id) {
            Some(row) if row.value.active => {
                row.value.active = false;
                row.audit = Some(AuditStamp::now(actor));
                Ok(())
            }
            _ => Err(StoreError::NotFound {
                kind: ResourceKind::Environment,
                id: environment.id.to_string(),
            }),
        }
    }
}

#[async_trait]
impl LifecycleService<Team> for InMemoryInventory {
    async fn delete(&self, team: &Team, _actor: ActorId) -> StoreResult<()> {
        let mut state = self.write()?;
        Self::begin_delete(&mut state, ResourceKind::Team, team.id.0)?;
        state
            .teams
            .remove(&team.id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                kind: ResourceKind::Team,
                id: team.id.to_string(),
            })
    }
}
