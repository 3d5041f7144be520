use crate::domain::model::{ActorId, ResourceKind};
use crate::domain::ports::Authorizer;
use std::collections::HashSet;

/// Authorizer backed by a fixed list of administrator ids.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorizer {
    admins: Option<HashSet<ActorId>>,
}

impl StaticAuthorizer {
    /// 不限制任何已登入的使用者
    pub fn allow_all() -> Self {
        Self { admins: None }
    }

    pub fn admins(ids: impl IntoIterator<Item = ActorId>) -> Self {
        Self {
            admins: Some(ids.into_iter().collect()),
        }
    }
}

impl Authorizer for StaticAuthorizer {
    fn is_allowed(&self, actor: ActorId, _kind: ResourceKind, _name: &str) -> bool {
        match &self.admins {
            None => true,
            Some(admins) => admins.contains(&actor),
        }
    }
}
