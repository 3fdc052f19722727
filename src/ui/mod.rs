/// UI building blocks
///
/// - Filter toolbar (toolbar.rs)
/// - Thumbnail grid (grid.rs)
/// - Page selector (pagination.rs)
/// - Full-screen detail carousel (detail.rs)

pub mod detail;
pub mod grid;
pub mod pagination;
pub mod toolbar;
