use crate::adapters::{InMemoryInventory, StaticAuthorizer};
use crate::app::delete_handler::{DeleteCommand, DeleteHandler};
use crate::config::toml_config::InventoryConfig;
use crate::config::GuardConfig;
use crate::core::checker::DependencyChecker;
use crate::core::guard::DeletionGuard;
use crate::core::lifecycle::DeleteService;
use crate::domain::model::{ActorId, ResourceKind};
use crate::utils::error::{GuardError, Result};
use crate::utils::validation::Validate;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

/// Wires the guard and handler over an in-memory inventory.
pub fn build_handler(config: &GuardConfig, inventory: &InMemoryInventory) -> DeleteHandler {
    let store = Arc::new(inventory.clone());

    let checker = DependencyChecker::new(store.clone(), store.clone(), store.clone())
        .with_span(tracing::debug_span!("dependency_checker"));
    let base = DeleteService::new(store.clone(), store.clone(), store)
        .with_span(tracing::info_span!("delete_service"));
    let guard = DeletionGuard::new(base, checker)
        .with_environment_policy(config.environment_policy())
        .with_span(tracing::info_span!("deletion_guard"));

    let authorizer = match config.admins() {
        Some(admins) => StaticAuthorizer::admins(admins.iter().copied()),
        None => StaticAuthorizer::allow_all(),
    };

    DeleteHandler::new(Arc::new(guard), Arc::new(authorizer))
        .with_request_timeout(config.request_timeout())
}

/// 依名稱找出要刪除的資源
pub fn resolve_command(
    inventory: &InMemoryInventory,
    kind: ResourceKind,
    name: &str,
) -> Result<DeleteCommand> {
    let lookup_error = |source| GuardError::Infrastructure {
        operation: "resolve resource",
        resource: format!("{} '{}'", kind, name),
        source,
    };
    let unknown = || GuardError::UnknownResource {
        kind,
        name: name.to_string(),
    };

    match kind {
        ResourceKind::Cluster => inventory
            .cluster_by_name(name)
            .map_err(lookup_error)?
            .map(DeleteCommand::Cluster)
            .ok_or_else(unknown),
        ResourceKind::Environment => inventory
            .environment_by_name(name)
            .map_err(lookup_error)?
            .map(DeleteCommand::Environment)
            .ok_or_else(unknown),
        ResourceKind::Team => inventory
            .team_by_name(name)
            .map_err(lookup_error)?
            .map(DeleteCommand::Team)
            .ok_or_else(unknown),
    }
}

/// Runs one guarded delete against the inventory stored in `config_path`
/// and writes the inventory back when the delete succeeds.
pub async fn delete_from_config_file(
    config_path: impl AsRef<Path>,
    kind: ResourceKind,
    name: &str,
    actor: ActorId,
) -> Result<()> {
    let path = config_path.as_ref();
    let mut config = GuardConfig::from_file(path)?;
    config.validate()?;

    let inventory = config.inventory.load()?;
    let handler = build_handler(&config, &inventory);
    let command = resolve_command(&inventory, kind, name)?;
    handler.handle(command, actor).await?;

    let snapshot = inventory.snapshot().map_err(|source| GuardError::Infrastructure {
        operation: "snapshot inventory",
        resource: format!("{} '{}'", kind, name),
        source,
    })?;
    config.inventory = InventoryConfig::from(snapshot);
    config.save_to_file(path)?;
    tracing::info!(config = %path.display(), "inventory saved");

    Ok(())
}

/// 產生 `--json` 輸出
pub fn render_report(kind: ResourceKind, name: &str, outcome: &Result<()>) -> Result<String> {
    let report = match outcome {
        Ok(()) => json!({ "kind": kind, "name": name, "deleted": true }),
        Err(e) => json!({
            "kind": kind,
            "name": name,
            "deleted": false,
            "blocked": e.is_blocked(),
            "error": e.to_string(),
            "suggestion": e.recovery_suggestion(),
        }),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ClusterId;

    const CONFIG: &str = r#"
[auth]
admins = [1]

[[inventory.clusters]]
id = 1
name = "c1"

[[inventory.clusters]]
id = 2
name = "c2"

[[inventory.environments]]
id = 1
name = "e1"
cluster_id = 1
"#;

    #[tokio::test]
    async fn test_wired_handler_enforces_everything() {
        let config = GuardConfig::from_toml_str(CONFIG).unwrap();
        let inventory = config.inventory.load().unwrap();
        let handler = build_handler(&config, &inventory);

        let c1 = resolve_command(&inventory, ResourceKind::Cluster, "c1").unwrap();
        let err = handler.handle(c1, ActorId(1)).await.unwrap_err();
        assert!(err.is_blocked());

        let c2 = resolve_command(&inventory, ResourceKind::Cluster, "c2").unwrap();
        assert!(matches!(
            handler.handle(c2.clone(), ActorId(2)).await,
            Err(GuardError::Forbidden { .. })
        ));
        handler.handle(c2, ActorId(1)).await.unwrap();
        assert!(!inventory.contains_cluster(ClusterId(2)));
    }

    #[test]
    fn test_render_report() {
        let ok = render_report(ResourceKind::Team, "t1", &Ok(())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&ok).unwrap();
        assert_eq!(value["deleted"], true);
        assert_eq!(value["kind"], "team");

        let blocked = Err(GuardError::blocked(ResourceKind::Cluster, "c1"));
        let value: serde_json::Value =
            serde_json::from_str(&render_report(ResourceKind::Cluster, "c1", &blocked).unwrap())
                .unwrap();
        assert_eq!(value["deleted"], false);
        assert_eq!(value["blocked"], true);
    }

    #[test]
    fn test_resolve_unknown_resource() {
        let inventory = InMemoryInventory::new();
        let err = resolve_command(&inventory, ResourceKind::Team, "ghost").unwrap_err();
        assert!(matches!(err, GuardError::UnknownResource { .. }));
    }
}
