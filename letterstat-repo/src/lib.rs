//! letterstat repository access
//!
//! Reads directory listings and file content from the hosting service and walks the tree to find
//! the files worth analyzing

pub mod api;
pub mod filter;
pub mod walker;

pub use api::{ApiClientConfig, GitHubContentsClient};
pub use filter::*;
pub use walker::*;
