use anyhow::Result;
use delete_guard::domain::model::{
    ActorId, App, AppId, Cluster, ClusterId, Environment, EnvironmentId, Pipeline, PipelineId,
    ResourceKind, Team, TeamId,
};
use delete_guard::{
    DeleteService, DeletionGuard, DependencyChecker, EnvironmentFailurePolicy, GuardError,
    InMemoryInventory,
};
use std::sync::Arc;

fn guard_over(inventory: &InMemoryInventory) -> DeletionGuard {
    let store = Arc::new(inventory.clone());
    let checker = DependencyChecker::new(store.clone(), store.clone(), store.clone());
    let base = DeleteService::new(store.clone(), store.clone(), store);
    DeletionGuard::new(base, checker)
}

fn cluster(id: i32, name: &str) -> Cluster {
    Cluster {
        id: ClusterId(id),
        name: name.to_string(),
    }
}

fn environment(id: i32, name: &str, cluster_id: i32) -> Environment {
    Environment {
        id: EnvironmentId(id),
        name: name.to_string(),
        cluster_id: ClusterId(cluster_id),
        active: true,
    }
}

fn team(id: i32, name: &str) -> Team {
    Team {
        id: TeamId(id),
        name: name.to_string(),
        active: true,
    }
}

#[tokio::test]
async fn test_cluster_with_environment_is_blocked() -> Result<()> {
    let inventory = InMemoryInventory::new();
    inventory.insert_cluster(cluster(1, "c1"))?;
    inventory.insert_environment(environment(1, "e1", 1))?;
    let guard = guard_over(&inventory);

    let err = guard
        .delete_cluster(&cluster(1, "c1"), ActorId(1))
        .await
        .unwrap_err();

    assert!(err.is_blocked());
    assert!(err.to_string().contains("before deleting this cluster"));
    assert!(inventory.contains_cluster(ClusterId(1)));
    assert_eq!(inventory.delete_calls(ResourceKind::Cluster, 1), 0);
    Ok(())
}

#[tokio::test]
async fn test_empty_cluster_is_deleted_once() -> Result<()> {
    let inventory = InMemoryInventory::new();
    inventory.insert_cluster(cluster(2, "c2"))?;
    let guard = guard_over(&inventory);

    guard.delete_cluster(&cluster(2, "c2"), ActorId(1)).await?;

    assert!(!inventory.contains_cluster(ClusterId(2)));
    assert_eq!(inventory.delete_calls(ResourceKind::Cluster, 2), 1);
    Ok(())
}

#[tokio::test]
async fn test_cluster_with_only_deactivated_environment_is_deleted() -> Result<()> {
    let inventory = InMemoryInventory::new();
    inventory.insert_cluster(cluster(3, "c3"))?;
    inventory.insert_environment(Environment {
        active: false,
        ..environment(3, "old", 3)
    })?;
    let guard = guard_over(&inventory);

    guard.delete_cluster(&cluster(3, "c3"), ActorId(1)).await?;
    assert!(!inventory.contains_cluster(ClusterId(3)));
    Ok(())
}

#[tokio::test]
async fn test_team_with_app_is_blocked() -> Result<()> {
    let inventory = InMemoryInventory::new();
    inventory.insert_team(team(1, "t1"))?;
    inventory.insert_app(App {
        id: AppId(1),
        name: "a1".to_string(),
        team_id: TeamId(1),
        active: true,
    })?;
    let guard = guard_over(&inventory);

    let err = guard.delete_team(&team(1, "t1"), ActorId(1)).await.unwrap_err();

    assert!(err.is_blocked());
    assert!(err.to_string().contains("apps"));
    assert!(inventory.contains_team(TeamId(1)));
    assert_eq!(inventory.delete_calls(ResourceKind::Team, 1), 0);
    Ok(())
}

#[tokio::test]
async fn test_environments_with_and_without_pipelines() -> Result<()> {
    let inventory = InMemoryInventory::new();
    inventory.insert_cluster(cluster(1, "c1"))?;
    inventory.insert_environment(environment(1, "env1", 1))?;
    inventory.insert_environment(environment(2, "env2", 1))?;
    inventory.insert_pipeline(Pipeline {
        id: PipelineId(1),
        environment_id: EnvironmentId(1),
        active: true,
    })?;
    let guard = guard_over(&inventory);

    let err = guard
        .delete_environment(&environment(1, "env1", 1), ActorId(3))
        .await
        .unwrap_err();
    assert!(err.is_blocked());
    assert!(err.to_string().contains("related pipelines"));
    assert_eq!(inventory.delete_calls(ResourceKind::Environment, 1), 0);

    guard
        .delete_environment(&environment(2, "env2", 1), ActorId(3))
        .await?;
    assert_eq!(inventory.delete_calls(ResourceKind::Environment, 2), 1);

    // 軟刪除：資料列還在，但已停用
    let row = inventory.environment(EnvironmentId(2)).expect("row kept");
    assert!(!row.value.active);
    assert_eq!(row.audit.map(|a| a.updated_by), Some(ActorId(3)));
    Ok(())
}

#[tokio::test]
async fn test_cluster_becomes_deletable_after_environments_are_removed() -> Result<()> {
    let inventory = InMemoryInventory::new();
    inventory.insert_cluster(cluster(1, "c1"))?;
    inventory.insert_environment(environment(1, "e1", 1))?;
    let guard = guard_over(&inventory);

    assert!(guard
        .delete_cluster(&cluster(1, "c1"), ActorId(1))
        .await
        .is_err());

    guard
        .delete_environment(&environment(1, "e1", 1), ActorId(1))
        .await?;
    guard.delete_cluster(&cluster(1, "c1"), ActorId(1)).await?;

    assert!(!inventory.contains_cluster(ClusterId(1)));
    Ok(())
}

#[tokio::test]
async fn test_lookup_failure_is_not_reported_as_blocked() -> Result<()> {
    let inventory = InMemoryInventory::new();
    inventory.insert_team(team(1, "t1"))?;
    inventory.fail_lookups("connection refused");
    let guard = guard_over(&inventory);

    let err = guard.delete_team(&team(1, "t1"), ActorId(1)).await.unwrap_err();

    assert!(!err.is_blocked());
    assert!(matches!(err, GuardError::Infrastructure { .. }));
    assert_eq!(inventory.delete_calls(ResourceKind::Team, 1), 0);
    Ok(())
}

#[tokio::test]
async fn test_second_delete_surfaces_lifecycle_error() -> Result<()> {
    let inventory = InMemoryInventory::new();
    inventory.insert_cluster(cluster(1, "c1"))?;
    let guard = guard_over(&inventory);

    guard.delete_cluster(&cluster(1, "c1"), ActorId(1)).await?;
    let err = guard
        .delete_cluster(&cluster(1, "c1"), ActorId(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GuardError::Infrastructure {
            operation: "delete cluster",
            ..
        }
    ));
    assert_eq!(inventory.delete_calls(ResourceKind::Cluster, 1), 2);
    Ok(())
}

#[tokio::test]
async fn test_environment_failure_under_both_policies() -> Result<()> {
    let inventory = InMemoryInventory::new();
    inventory.insert_cluster(cluster(1, "c1"))?;
    inventory.insert_environment(environment(1, "e1", 1))?;
    inventory.fail_deletes("disk full");

    let strict = guard_over(&inventory);
    assert!(strict
        .delete_environment(&environment(1, "e1", 1), ActorId(1))
        .await
        .is_err());

    let legacy = guard_over(&inventory).with_environment_policy(EnvironmentFailurePolicy::LogOnly);
    legacy
        .delete_environment(&environment(1, "e1", 1), ActorId(1))
        .await?;

    // 回報成功，但環境其實沒被刪除
    let row = inventory.environment(EnvironmentId(1)).expect("row kept");
    assert!(row.value.active);
    assert_eq!(inventory.delete_calls(ResourceKind::Environment, 1), 2);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_deletes_on_independent_resources() -> Result<()> {
    let inventory = InMemoryInventory::new();
    for id in 1..=8 {
        inventory.insert_cluster(cluster(id, &format!("c{}", id)))?;
    }
    let guard = Arc::new(guard_over(&inventory));

    let mut handles = Vec::new();
    for id in 1..=8 {
        let guard = guard.clone();
        handles.push(tokio::spawn(async move {
            guard
                .delete_cluster(&cluster(id, &format!("c{}", id)), ActorId(1))
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    for id in 1..=8 {
        assert!(!inventory.contains_cluster(ClusterId(id)));
        assert_eq!(inventory.delete_calls(ResourceKind::Cluster, id), 1);
    }
    Ok(())
}
