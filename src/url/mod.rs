//! URL handling for vitrina
//!
//! This module provides canonicalization of product links (the snapshot's
//! dedup key doubles as the fetch URL), absolute resolution of relative
//! references, and slug-to-label humanization for category discovery.

mod normalize;
mod slug;

pub use normalize::{absolutize, canonicalize};
pub use slug::humanize_slug;
