//! Re-exports of performance-oriented collection types.
//!
//! Downstream crates take these from here instead of depending on
//! `rustc-hash` directly.

pub use rustc_hash::{FxHashMap, FxHashSet};
