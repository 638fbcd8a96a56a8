pub mod change_feed;
pub mod collections;
pub mod documents;
pub mod supabase;

pub use change_feed::ChangeFeed;
pub use collections::Collection;
pub use supabase::SupabaseClient;
