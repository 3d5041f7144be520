use crate::adapters::{InMemoryInventory, InventorySnapshot};
use crate::core::guard::EnvironmentFailurePolicy;
use crate::domain::model::{ActorId, App, Cluster, Environment, Pipeline, Team};
use crate::utils::error::{GuardError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub guard: GuardSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub inventory: InventoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardSection {
    #[serde(default)]
    pub environment_failure_policy: EnvironmentFailurePolicy,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for GuardSection {
    fn default() -> Self {
        Self {
            environment_failure_policy: EnvironmentFailurePolicy::default(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 有刪除權限的使用者；未設定時不限制
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admins: Option<Vec<ActorId>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub apps: Vec<App>,
}

impl GuardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${GUARD_TIMEOUT_MS})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GuardError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_positive_number(
            "guard.request_timeout_ms",
            self.guard.request_timeout_ms as usize,
            1,
        )?;

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            let valid_formats = ["compact", "json"];
            if !valid_formats.contains(&format) {
                return Err(GuardError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        valid_formats.join(", ")
                    ),
                });
            }
        }

        if let Some(admins) = self.auth.as_ref().and_then(|a| a.admins.as_ref()) {
            for admin in admins {
                if !admin.is_authenticated() {
                    return Err(GuardError::InvalidConfigValueError {
                        field: "auth.admins".to_string(),
                        value: admin.to_string(),
                        reason: "Actor ids must be positive".to_string(),
                    });
                }
            }
        }

        self.inventory.validate()
    }

    /// 寫回 TOML 檔案（會覆蓋原檔，註解不保留）
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.guard.request_timeout_ms)
    }

    pub fn environment_policy(&self) -> EnvironmentFailurePolicy {
        self.guard.environment_failure_policy
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }

    pub fn admins(&self) -> Option<&[ActorId]> {
        self.auth.as_ref().and_then(|a| a.admins.as_deref())
    }
}

impl InventoryConfig {
    /// Seeds an in-memory inventory, parents first.
    pub fn load(&self) -> Result<InMemoryInventory> {
        let inventory = InMemoryInventory::new();
        let seed_error = |e: crate::domain::ports::StoreError| GuardError::ConfigError {
            message: format!("invalid inventory: {}", e),
        };

        for cluster in &self.clusters {
            inventory.insert_cluster(cluster.clone()).map_err(seed_error)?;
        }
        for environment in &self.environments {
            inventory
                .insert_environment(environment.clone())
                .map_err(seed_error)?;
        }
        for pipeline in &self.pipelines {
            inventory.insert_pipeline(pipeline.clone()).map_err(seed_error)?;
        }
        for team in &self.teams {
            inventory.insert_team(team.clone()).map_err(seed_error)?;
        }
        for app in &self.apps {
            inventory.insert_app(app.clone()).map_err(seed_error)?;
        }

        Ok(inventory)
    }
}

impl From<InventorySnapshot> for InventoryConfig {
    fn from(snapshot: InventorySnapshot) -> Self {
        Self {
            clusters: snapshot.clusters,
            environments: snapshot.environments,
            pipelines: snapshot.pipelines,
            teams: snapshot.teams,
            apps: snapshot.apps,
        }
    }
}

impl Validate for InventoryConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_unique_ids(
            "inventory.clusters",
            self.clusters.iter().map(|c| c.id.0),
        )?;
        validation::validate_unique_ids(
            "inventory.environments",
            self.environments.iter().map(|e| e.id.0),
        )?;
        validation::validate_unique_ids(
            "inventory.pipelines",
            self.pipelines.iter().map(|p| p.id.0),
        )?;
        validation::validate_unique_ids("inventory.teams", self.teams.iter().map(|t| t.id.0))?;
        validation::validate_unique_ids("inventory.apps", self.apps.iter().map(|a| a.id.0))?;

        for cluster in &self.clusters {
            validation::validate_non_empty_string("inventory.clusters.name", &cluster.name)?;
        }
        for environment in &self.environments {
            validation::validate_non_empty_string(
                "inventory.environments.name",
                &environment.name,
            )?;
            if !environment.active {
                continue;
            }
            validation::validate_reference(
                "inventory.environments.cluster_id",
                environment.cluster_id.0,
                self.clusters.iter().map(|c| c.id.0),
            )?;
        }
        for pipeline in self.pipelines.iter().filter(|p| p.active) {
            validation::validate_reference(
                "inventory.pipelines.environment_id",
                pipeline.environment_id.0,
                self.environments.iter().map(|e| e.id.0),
            )?;
        }
        for team in &self.teams {
            validation::validate_non_empty_string("inventory.teams.name", &team.name)?;
        }
        for app in self.apps.iter().filter(|a| a.active) {
            validation::validate_reference(
                "inventory.apps.team_id",
                app.team_id.0,
                self.teams.iter().map(|t| t.id.0),
            )?;
        }

        Ok(())
    }
}

impl Validate for GuardConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
