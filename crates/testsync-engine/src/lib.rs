//! Keeps a team's stored tests consistent with the test files of a Git branch.
//!
//! The flow for a sync is: select the single integration shared by the
//! participating teams, read the branch tree, classify tests into
//! create/keep/delete sets, materialize the creates or deletes through the
//! injected collaborators, then merge and sort the result.

pub mod batch;
pub mod collaborators;
pub mod diff;
pub mod materialize;
pub mod merge;
pub mod reconcile;
pub mod selector;

pub use collaborators::{FileDeleter, RemoteTreeReader, TestCreator};
pub use diff::ReconcileBatch;
pub use materialize::Materializer;
pub use reconcile::{PruneRequest, ReconcileOptions, Reconciler, SyncRequest};
pub use selector::select_integration;
