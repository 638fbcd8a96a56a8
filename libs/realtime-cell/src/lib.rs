pub mod handlers;
pub mod models;
pub mod router;
pub mod snapshots;

pub use models::*;
pub use router::realtime_routes;
pub use snapshots::snapshot_stream;
