pub mod db;
pub mod records;
pub mod schema;
pub mod store;
pub mod teams;

pub use store::SqliteTestStore;
