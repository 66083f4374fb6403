//! Foreground blob selection.
//!
//! Traces the outer contours of the binary mask and keeps the single
//! largest region, provided its contour area clears the configured floor.

mod components;
mod selector;

pub use components::{find_components, CandidateRegion};
pub use selector::BlobSelector;
