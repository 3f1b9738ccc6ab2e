//! corpusqa-core
//!
//! Configuration, error taxonomy, domain types and collaborator traits shared
//! by the chunking, vectorizing, indexing and answering crates.

pub mod config;
pub mod corpus;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
