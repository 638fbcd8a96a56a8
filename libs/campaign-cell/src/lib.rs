pub mod audience;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use audience::{AudienceSelection, SelectAllState, TargetType};
pub use models::*;
pub use router::campaign_routes;
pub use services::CampaignService;
