/// State management module
///
/// This module handles all application state, including:
/// - Backend payload structures (data.rs)
/// - Filter values and their invariants (filter.rs)
/// - Fetch sequencing, page clamping and load status (gallery.rs)

pub mod data;
pub mod filter;
pub mod gallery;
