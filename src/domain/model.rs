use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(ClusterId);
id_type!(EnvironmentId);
id_type!(PipelineId);
id_type!(TeamId);
id_type!(AppId);
id_type!(
    /// 操作者 ID，只用於稽核紀錄
    ActorId
);

impl ActorId {
    /// 0 代表未登入的使用者
    pub fn is_authenticated(&self) -> bool {
        self.0 > 0
    }
}

/// 受保護的父資源種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Cluster,
    Environment,
    Team,
}

impl ResourceKind {
    /// Plural label of the child kind that blocks deletion.
    pub fn child_label(&self) -> &'static str {
        match self {
            ResourceKind::Cluster => "environments",
            ResourceKind::Environment => "pipelines",
            ResourceKind::Team => "apps",
        }
    }

    pub fn blocked_message(&self) -> &'static str {
        match self {
            ResourceKind::Cluster => {
                "Please delete all related environments before deleting this cluster"
            }
            ResourceKind::Environment => {
                "Please delete all related pipelines before deleting this environment"
            }
            ResourceKind::Team => "Please delete all apps in this project before deleting this project",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Cluster => "cluster",
            ResourceKind::Environment => "environment",
            ResourceKind::Team => "team",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parent resource the guard knows how to protect.
pub trait Resource: fmt::Debug + Send + Sync {
    const KIND: ResourceKind;

    fn parent_ref(&self) -> ParentRef;
    fn name(&self) -> &str;
}

/// Identifier of a parent whose children are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ParentRef {
    Cluster(ClusterId),
    Environment(EnvironmentId),
    Team(TeamId),
}

impl ParentRef {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ParentRef::Cluster(_) => ResourceKind::Cluster,
            ParentRef::Environment(_) => ResourceKind::Environment,
            ParentRef::Team(_) => ResourceKind::Team,
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::Cluster(id) => write!(f, "cluster#{}", id),
            ParentRef::Environment(id) => write!(f, "environment#{}", id),
            ParentRef::Team(id) => write!(f, "team#{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: EnvironmentId,
    pub name: String,
    pub cluster_id: ClusterId,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: PipelineId,
    pub environment_id: EnvironmentId,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub id: AppId,
    pub name: String,
    pub team_id: TeamId,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Resource for Cluster {
    const KIND: ResourceKind = ResourceKind::Cluster;

    fn parent_ref(&self) -> ParentRef {
        ParentRef::Cluster(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Resource for Environment {
    const KIND: ResourceKind = ResourceKind::Environment;

    fn parent_ref(&self) -> ParentRef {
        ParentRef::Environment(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Resource for Team {
    const KIND: ResourceKind = ResourceKind::Team;

    fn parent_ref(&self) -> ParentRef {
        ParentRef::Team(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 子資源查詢結果：明確區分「沒有資料」與「查到資料」
///
/// Only `NotFound` means the parent is safe to delete. A `Found` carrying an
/// empty vector is still treated as "children may exist".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildLookup<T> {
    NotFound,
    Found(Vec<T>),
}

impl<T> ChildLookup<T> {
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            ChildLookup::NotFound
        } else {
            ChildLookup::Found(rows)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ChildLookup::NotFound)
    }

    pub fn len(&self) -> usize {
        match self {
            ChildLookup::NotFound => 0,
            ChildLookup::Found(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 稽核欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuditStamp {
    pub updated_by: ActorId,
    pub updated_on: DateTime<Utc>,
}

impl AuditStamp {
    pub fn now(actor: ActorId) -> Self {
        Self {
            updated_by: actor,
            updated_on: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_messages_name_the_precondition() {
        assert!(ResourceKind::Cluster
            .blocked_message()
            .contains("before deleting this cluster"));
        assert!(ResourceKind::Environment
            .blocked_message()
            .contains("related pipelines"));
        assert!(ResourceKind::Team.blocked_message().contains("apps"));
    }

    #[test]
    fn test_child_lookup_from_rows() {
        let empty: ChildLookup<i32> = ChildLookup::from_rows(Vec::new());
        assert!(empty.is_not_found());

        let found = ChildLookup::from_rows(vec![1, 2]);
        assert_eq!(found.len(), 2);
        assert!(!found.is_not_found());

        // 空的 Found 仍然不是 NotFound
        let ambiguous: ChildLookup<i32> = ChildLookup::Found(Vec::new());
        assert!(!ambiguous.is_not_found());
        assert!(ambiguous.is_empty());
    }

    #[test]
    fn test_parent_ref_kind_and_display() {
        let env = Environment {
            id: EnvironmentId(7),
            name: "staging".to_string(),
            cluster_id: ClusterId(1),
            active: true,
        };
        assert_eq!(env.parent_ref().kind(), ResourceKind::Environment);
        assert_eq!(env.parent_ref().to_string(), "environment#7");
        assert_eq!(Environment::KIND, ResourceKind::Environment);
    }

    #[test]
    fn test_actor_authentication() {
        assert!(!ActorId(0).is_authenticated());
        assert!(ActorId(2).is_authenticated());
    }
}
