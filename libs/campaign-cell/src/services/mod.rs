pub mod campaign;

pub use campaign::CampaignService;
