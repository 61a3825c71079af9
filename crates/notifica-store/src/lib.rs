pub mod memory;
pub mod pg;

pub use memory::InMemoryEntityStore;
pub use pg::PgEntityStore;
