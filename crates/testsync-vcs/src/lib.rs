//! Local git host: serves branch trees and sha-guarded deletes from
//! repositories on disk, addressed through the integration registry.

pub mod delete;
pub mod registry;
pub mod repo;
pub mod tree;

pub use delete::GitFileDeleter;
pub use registry::IntegrationRegistry;
pub use tree::{GitTreeReader, TreeOptions};
