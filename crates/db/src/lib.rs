pub mod mapper;
pub mod models;
pub mod rows;
pub mod store;
pub mod types;

pub use store::{StoreError, WorkspaceStore};
