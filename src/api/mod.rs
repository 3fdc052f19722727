/// Gallery backend module
///
/// This module handles:
/// - Building image-listing requests from filter state
/// - Talking to the REST backend
/// - Downloading, downscaling and caching thumbnails

pub mod client;
pub mod error;
pub mod query;
pub mod thumbnail;

pub use client::GalleryClient;
pub use error::ApiError;
pub use query::{build_request, ImagesRequest};
