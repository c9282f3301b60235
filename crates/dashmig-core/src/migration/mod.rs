//! Migration of cards and dashboards against a remote installation

mod remote;
mod session;
mod visitor;

pub use remote::{MetabaseClient, RemoteEntities, SESSION_HEADER};
pub use session::MigrationSession;
pub use visitor::MigrationVisitor;
