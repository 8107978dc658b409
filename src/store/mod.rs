pub mod memory;
pub mod postgrest;
pub mod traits;
pub mod types;

pub use memory::MemoryStore;
pub use postgrest::{PostgrestOptions, PostgrestStore};
pub use traits::ListingStore;
pub use types::{Condition, ListingPage, ListingQuery, LIVE_ROW_CAP, SNAPSHOT_ROW_CAP};
