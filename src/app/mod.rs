pub mod bootstrap;
pub mod delete_handler;

pub use bootstrap::{build_handler, delete_from_config_file, render_report, resolve_command};
pub use delete_handler::{DeleteCommand, DeleteHandler};
