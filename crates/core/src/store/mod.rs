//! Store abstraction.
//!
//! The shared key-value/sorted-set store is the only mutable state the
//! three processes coordinate through, so it is modeled as an injected
//! [`Store`] trait with exactly the operation set the cache protocol
//! consumes. Nothing caches store reads across calls; correctness never
//! depends on process lifetime.

mod error;
pub mod keys;
mod patterns;
mod traits;

pub use error::{Result, StoreError};
pub use patterns::pattern_matches;
pub use traits::Store;
