//! Chain state for the Fermat node.
//!
//! Keeps the best header chain in memory behind a read-write lock and
//! connects new blocks through consensus validation.

mod chain;
mod error;

pub use chain::{BlockConnector, HeaderChain};
pub use error::{StateError, StateResult};
