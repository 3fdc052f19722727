//! `sd_gallery` is a native viewer for generated-image collections.
//!
//! It talks to an image-index backend over REST, shows a filterable,
//! paginated thumbnail grid and a full-screen detail carousel.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod state;
pub mod ui;
