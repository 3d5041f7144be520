use crate::domain::model::ResourceKind;
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Cluster,
    Environment,
    Team,
}

impl From<KindArg> for ResourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Cluster => ResourceKind::Cluster,
            KindArg::Environment => ResourceKind::Environment,
            KindArg::Team => ResourceKind::Team,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "delete-guard")]
#[command(about = "Delete a cluster, environment or team only when nothing depends on it")]
pub struct CliConfig {
    /// Path to TOML configuration file (policy and inventory)
    #[arg(short, long, default_value = "delete-guard.toml")]
    pub config: String,

    /// Acting user id recorded for audit
    #[arg(long)]
    pub actor: Option<i32>,

    /// Kind of resource to delete
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Name of the resource to delete
    pub name: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}
