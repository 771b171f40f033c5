pub mod memory;
pub mod postgrest;
pub mod store;
pub mod supabase;

pub use memory::InMemoryEntityStore;
pub use postgrest::SupabaseEntityStore;
pub use store::{EntityStore, SharedStore, StoreError, StoreResult};
