//! Scope: Per-Document Vocabulary
//!
//! Decides which entries apply to a document (its own, plus shared ones it
//! has not shadowed or excluded) and stores documents and entries for the host.

pub mod library;
pub mod resolver;

pub use library::*;
pub use resolver::*;
