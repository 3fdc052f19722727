/// Filter state driving the gallery query
///
/// Every setter reports whether the value actually changed so the
/// caller only re-fetches when something the request depends on moved.
use chrono::NaiveDate;
use serde::Serialize;

/// Coarse image-dimension bucket used as a filter facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    #[default]
    All,
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub const ALL: [SizeClass; 4] = [
        SizeClass::All,
        SizeClass::Small,
        SizeClass::Medium,
        SizeClass::Large,
    ];

    /// Lenient parse: anything but an exact bucket name means "all sizes"
    pub fn parse(value: &str) -> Self {
        match value {
            "small" => SizeClass::Small,
            "medium" => SizeClass::Medium,
            "large" => SizeClass::Large,
            _ => SizeClass::All,
        }
    }

    /// Value sent as the `size` query parameter, `None` for all sizes
    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            SizeClass::All => None,
            SizeClass::Small => Some("small"),
            SizeClass::Medium => Some("medium"),
            SizeClass::Large => Some("large"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizeClass::All => "All",
            SizeClass::Small => "Small",
            SizeClass::Medium => "Medium",
            SizeClass::Large => "Large",
        }
    }
}

/// Sort order by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Only an explicit "asc" selects ascending order
    pub fn parse(value: &str) -> Self {
        if value == "asc" {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Asc => "Oldest",
            SortOrder::Desc => "Newest",
        }
    }
}

/// Thumbnail density, in layout units out of a 12-unit row (1-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbSize(u8);

/// Width of a grid row in layout units
pub const GRID_UNITS: u8 = 12;

/// Rows of thumbnails requested per page
const ROWS_PER_PAGE: u32 = 5;

impl ThumbSize {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    /// Out-of-range values are clamped into 1-4
    pub fn new(units: u8) -> Self {
        ThumbSize(units.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Number of thumbnails per grid row
    pub fn columns(&self) -> usize {
        usize::from(GRID_UNITS / self.0)
    }

    /// Page size sent to the backend.
    ///
    /// Smaller thumbnails ask for more items so a page always fills the
    /// same number of rows: `(12 / size) * 5`.
    pub fn page_limit(&self) -> u32 {
        u32::from(GRID_UNITS / self.0) * ROWS_PER_PAGE
    }
}

impl Default for ThumbSize {
    fn default() -> Self {
        ThumbSize(2)
    }
}

/// Current values of all gallery filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    query: String,
    /// 1-based, never zero
    page: u32,
    size: SizeClass,
    order: SortOrder,
    date: Option<NaiveDate>,
    checkpoint: Option<String>,
    thumb_size: ThumbSize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            size: SizeClass::All,
            order: SortOrder::Desc,
            date: None,
            checkpoint: None,
            thumb_size: ThumbSize::default(),
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thumb_size(mut self, units: u8) -> Self {
        self.thumb_size = ThumbSize::new(units);
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> SizeClass {
        self.size
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn checkpoint(&self) -> Option<&str> {
        self.checkpoint.as_deref()
    }

    pub fn thumb_size(&self) -> ThumbSize {
        self.thumb_size
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        replace(&mut self.query, query.into())
    }

    /// Page 0 is coerced to 1
    pub fn set_page(&mut self, page: u32) -> bool {
        replace(&mut self.page, page.max(1))
    }

    pub fn set_size(&mut self, size: SizeClass) -> bool {
        replace(&mut self.size, size)
    }

    pub fn set_order(&mut self, order: SortOrder) -> bool {
        replace(&mut self.order, order)
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) -> bool {
        replace(&mut self.date, date)
    }

    /// An empty name clears the checkpoint filter
    pub fn set_checkpoint(&mut self, checkpoint: Option<String>) -> bool {
        let checkpoint = checkpoint.filter(|name| !name.is_empty());
        replace(&mut self.checkpoint, checkpoint)
    }

    pub fn set_thumb_size(&mut self, units: u8) -> bool {
        replace(&mut self.thumb_size, ThumbSize::new(units))
    }

    /// Pull the page back inside `1..=total_pages`.
    ///
    /// A total of zero leaves the page alone so it never drops below 1.
    pub fn clamp_page(&mut self, total_pages: u32) -> bool {
        if total_pages >= 1 && self.page > total_pages {
            self.page = total_pages;
            true
        } else {
            false
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let filter = FilterState::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.order(), SortOrder::Desc);
        assert_eq!(filter.size(), SizeClass::All);
        assert_eq!(filter.thumb_size().get(), 2);
        assert!(filter.query().is_empty());
        assert!(filter.date().is_none());
        assert!(filter.checkpoint().is_none());
    }

    #[test]
    fn test_size_parse_is_strict() {
        assert_eq!(SizeClass::parse("small"), SizeClass::Small);
        assert_eq!(SizeClass::parse("medium"), SizeClass::Medium);
        assert_eq!(SizeClass::parse("large"), SizeClass::Large);
        for other in ["", "Small", "huge", " small"] {
            assert_eq!(SizeClass::parse(other), SizeClass::All);
            assert_eq!(SizeClass::parse(other).as_param(), None);
        }
    }

    #[test]
    fn test_order_parse_defaults_to_desc() {
        assert_eq!(SortOrder::parse("asc"), SortOrder::Asc);
        for other in ["desc", "", "ASC", "random"] {
            assert_eq!(SortOrder::parse(other).as_str(), "desc");
        }
    }

    #[test]
    fn test_thumb_size_limits() {
        assert_eq!(ThumbSize::new(1).page_limit(), 60);
        assert_eq!(ThumbSize::new(2).page_limit(), 30);
        assert_eq!(ThumbSize::new(3).page_limit(), 20);
        assert_eq!(ThumbSize::new(4).page_limit(), 15);
        assert_eq!(ThumbSize::new(3).columns(), 4);
    }

    #[test]
    fn test_thumb_size_clamped() {
        assert_eq!(ThumbSize::new(0).get(), 1);
        assert_eq!(ThumbSize::new(9).get(), 4);
    }

    #[test]
    fn test_setters_report_changes() {
        let mut filter = FilterState::default();

        assert!(!filter.set_order(SortOrder::Desc));
        assert!(filter.set_order(SortOrder::Asc));
        assert!(!filter.set_query(""));
        assert!(filter.set_query("castle"));
        assert!(!filter.set_page(1));
        assert!(!filter.set_page(0));
        assert!(filter.set_page(4));
    }

    #[test]
    fn test_empty_checkpoint_clears_filter() {
        let mut filter = FilterState::default();

        assert!(filter.set_checkpoint(Some("sd-xl".to_string())));
        assert_eq!(filter.checkpoint(), Some("sd-xl"));
        assert!(filter.set_checkpoint(Some(String::new())));
        assert_eq!(filter.checkpoint(), None);
        assert!(!filter.set_checkpoint(None));
    }

    #[test]
    fn test_clamp_page() {
        let mut filter = FilterState::default();
        filter.set_page(5);

        assert!(filter.clamp_page(3));
        assert_eq!(filter.page(), 3);
        assert!(!filter.clamp_page(3));
        assert!(!filter.clamp_page(0));
        assert_eq!(filter.page(), 3);
    }
}
