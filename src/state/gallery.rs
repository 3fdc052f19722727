/// Gallery fetch coordination
///
/// Owns the filter state and the currently displayed page, decides
/// when a new request is needed and reconciles responses with the
/// filters. All methods run on the UI thread; network I/O is issued by
/// the caller from the returned `PendingFetch`.
use chrono::{Local, NaiveDate, TimeZone};
use std::fmt::Display;
use tracing::{debug, error, info};

use super::data::{ImageInfo, ImageList, Metadata};
use super::filter::{FilterState, SizeClass, SortOrder};
use crate::api::query::{build_request, ImagesRequest};

/// One user edit of the filter controls
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    Query(String),
    Page(u32),
    Size(SizeClass),
    Order(SortOrder),
    Date(Option<NaiveDate>),
    Checkpoint(Option<String>),
    ThumbSize(u8),
}

/// A request that must be sent, tagged with its sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub seq: u64,
    pub request: ImagesRequest,
}

/// What the user should be told about the current page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Result of applying a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A newer request was issued since; nothing changed
    Stale,
    /// The request failed; list and metadata are untouched
    Failed,
    Updated {
        images_replaced: bool,
        /// Corrective fetch after the page was clamped
        refetch: Option<PendingFetch>,
    },
}

#[derive(Debug, Default)]
pub struct Gallery {
    filter: FilterState,
    images: Vec<ImageInfo>,
    metadata: Option<Metadata>,
    checkpoints: Vec<String>,
    /// Sequence number of the latest issued request
    issued: u64,
    status: LoadStatus,
}

impl Gallery {
    pub fn new(filter: FilterState) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn images(&self) -> &[ImageInfo] {
        &self.images
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Page count for the pagination control, 0 when unknown
    pub fn total_pages(&self) -> u32 {
        self.metadata
            .and_then(|meta| meta.total_pages)
            .unwrap_or(0)
    }

    pub fn checkpoints(&self) -> &[String] {
        &self.checkpoints
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Issue a request for the current filters in the local time zone
    pub fn refresh(&mut self) -> PendingFetch {
        self.refresh_in(&Local)
    }

    pub fn refresh_in<Tz: TimeZone>(&mut self, tz: &Tz) -> PendingFetch {
        self.issued += 1;
        self.status = LoadStatus::Loading;

        let request = build_request(&self.filter, tz);
        debug!("Issuing image request #{}: {:?}", self.issued, request);
        PendingFetch {
            seq: self.issued,
            request,
        }
    }

    /// Apply a filter edit; returns a fetch only when a value changed
    pub fn update_filter(&mut self, change: FilterChange) -> Option<PendingFetch> {
        let changed = match change {
            FilterChange::Query(query) => self.filter.set_query(query),
            FilterChange::Page(page) => self.filter.set_page(page),
            FilterChange::Size(size) => self.filter.set_size(size),
            FilterChange::Order(order) => self.filter.set_order(order),
            FilterChange::Date(date) => self.filter.set_date(date),
            FilterChange::Checkpoint(name) => self.filter.set_checkpoint(name),
            FilterChange::ThumbSize(units) => self.filter.set_thumb_size(units),
        };

        changed.then(|| self.refresh())
    }

    /// Reconcile a response with the current state.
    ///
    /// Items replace the list wholesale; a response without items keeps the
    /// displayed list. Metadata is always replaced. If the page now lies past
    /// the last page it is clamped and one corrective fetch is returned.
    pub fn apply_response<E: Display>(
        &mut self,
        seq: u64,
        result: Result<ImageList, E>,
    ) -> FetchOutcome {
        if seq != self.issued {
            debug!("Discarding stale response #{} (latest is #{})", seq, self.issued);
            return FetchOutcome::Stale;
        }

        let list = match result {
            Ok(list) => list,
            Err(e) => {
                error!("Failed to fetch images: {}", e);
                self.status = LoadStatus::Failed(e.to_string());
                return FetchOutcome::Failed;
            }
        };

        let images_replaced = match list.items {
            Some(items) => {
                self.images = items;
                true
            }
            None => false,
        };
        self.metadata = list.metadata;
        self.status = LoadStatus::Ready;
        info!(
            "Loaded {} images (page {} of {})",
            self.images.len(),
            self.filter.page(),
            self.total_pages()
        );

        let refetch = match self.metadata.and_then(|meta| meta.total_pages) {
            Some(total) if self.filter.clamp_page(total) => {
                debug!("Page clamped to {}", total);
                Some(self.refresh())
            }
            _ => None,
        };

        FetchOutcome::Updated {
            images_replaced,
            refetch,
        }
    }

    /// Store the checkpoint names fetched at startup
    pub fn set_checkpoints(&mut self, names: Vec<String>) {
        debug!("Loaded {} checkpoints", names.len());
        self.checkpoints = names;
    }

    /// Human-readable summary shown under the toolbar
    pub fn status_line(&self) -> String {
        match &self.status {
            LoadStatus::Idle => String::new(),
            LoadStatus::Loading => "Loading...".to_string(),
            LoadStatus::Failed(message) => format!("Failed to load images: {}", message),
            LoadStatus::Ready if self.images.is_empty() => {
                "No images match the current filters".to_string()
            }
            LoadStatus::Ready => match self.metadata.and_then(|meta| meta.total_items) {
                Some(total) => format!("{} images", total),
                None => format!("{} images on this page", self.images.len()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str) -> ImageInfo {
        serde_json::from_value(serde_json::json!({ "id": id })).unwrap()
    }

    fn page_of(count: usize, total_pages: u32) -> ImageList {
        ImageList {
            items: Some((0..count).map(|i| image(&format!("{i}.png"))).collect()),
            metadata: Some(Metadata {
                total_pages: Some(total_pages),
                total_items: None,
                current_page: None,
            }),
        }
    }

    fn ok(list: ImageList) -> Result<ImageList, String> {
        Ok(list)
    }

    #[test]
    fn test_default_fetch_end_to_end() {
        let mut gallery = Gallery::new(FilterState::default());

        let fetch = gallery.refresh();
        assert_eq!(fetch.request.page, 0);
        assert_eq!(fetch.request.order, SortOrder::Desc);
        assert_eq!(fetch.request.limit, 30);
        assert_eq!(fetch.request.query, None);
        assert_eq!(gallery.status(), &LoadStatus::Loading);

        let outcome = gallery.apply_response(fetch.seq, ok(page_of(12, 5)));
        assert_eq!(
            outcome,
            FetchOutcome::Updated {
                images_replaced: true,
                refetch: None
            }
        );
        assert_eq!(gallery.images().len(), 12);
        assert_eq!(gallery.total_pages(), 5);
        assert_eq!(gallery.status_line(), "12 images on this page");
    }

    #[test]
    fn test_unchanged_filter_does_not_fetch() {
        let mut gallery = Gallery::new(FilterState::default());

        assert!(gallery.update_filter(FilterChange::Order(SortOrder::Desc)).is_none());
        assert!(gallery.update_filter(FilterChange::Checkpoint(None)).is_none());
        assert!(gallery.update_filter(FilterChange::ThumbSize(2)).is_none());
        assert!(gallery.update_filter(FilterChange::Order(SortOrder::Asc)).is_some());
    }

    #[test]
    fn test_every_filter_field_triggers_fetch() {
        let mut gallery = Gallery::new(FilterState::default());
        let changes = vec![
            FilterChange::Query("owl".to_string()),
            FilterChange::Page(2),
            FilterChange::Size(SizeClass::Small),
            FilterChange::Order(SortOrder::Asc),
            FilterChange::Date(NaiveDate::from_ymd_opt(2023, 1, 1)),
            FilterChange::Checkpoint(Some("sd-xl".to_string())),
            FilterChange::ThumbSize(4),
        ];

        let mut last_seq = 0;
        for change in changes {
            let fetch = gallery.update_filter(change).expect("change should fetch");
            assert!(fetch.seq > last_seq);
            last_seq = fetch.seq;
        }
    }

    #[test]
    fn test_page_clamped_with_single_refetch() {
        let mut gallery = Gallery::new(FilterState::default());
        let first = gallery.update_filter(FilterChange::Page(5)).unwrap();
        assert_eq!(first.request.page, 4);

        let outcome = gallery.apply_response(first.seq, ok(page_of(0, 3)));
        let refetch = match outcome {
            FetchOutcome::Updated {
                refetch: Some(refetch),
                ..
            } => refetch,
            other => panic!("expected a corrective fetch, got {other:?}"),
        };
        assert_eq!(gallery.filter().page(), 3);
        assert_eq!(refetch.request.page, 2);

        let outcome = gallery.apply_response(refetch.seq, ok(page_of(7, 3)));
        assert_eq!(
            outcome,
            FetchOutcome::Updated {
                images_replaced: true,
                refetch: None
            }
        );
        assert_eq!(gallery.filter().page(), 3);
        assert_eq!(gallery.images().len(), 7);
    }

    #[test]
    fn test_zero_total_pages_keeps_page() {
        let mut gallery = Gallery::new(FilterState::default());
        let fetch = gallery.update_filter(FilterChange::Page(2)).unwrap();

        let outcome = gallery.apply_response(fetch.seq, ok(page_of(0, 0)));
        assert!(matches!(outcome, FetchOutcome::Updated { refetch: None, .. }));
        assert_eq!(gallery.filter().page(), 2);
        assert_eq!(gallery.status_line(), "No images match the current filters");
    }

    #[test]
    fn test_missing_items_keep_list() {
        let mut gallery = Gallery::new(FilterState::default());
        let fetch = gallery.refresh();
        gallery.apply_response(fetch.seq, ok(page_of(4, 2)));

        let fetch = gallery.update_filter(FilterChange::Query("fog".to_string())).unwrap();
        let outcome = gallery.apply_response(fetch.seq, ok(ImageList::default()));

        assert_eq!(
            outcome,
            FetchOutcome::Updated {
                images_replaced: false,
                refetch: None
            }
        );
        assert_eq!(gallery.images().len(), 4);
        assert!(gallery.metadata().is_none());
        assert_eq!(gallery.total_pages(), 0);
    }

    #[test]
    fn test_failure_leaves_state_untouched() {
        let mut gallery = Gallery::new(FilterState::default());
        let fetch = gallery.refresh();
        gallery.apply_response(fetch.seq, ok(page_of(6, 2)));

        let fetch = gallery.update_filter(FilterChange::Size(SizeClass::Large)).unwrap();
        let outcome = gallery.apply_response(fetch.seq, Err::<ImageList, _>("connection refused"));

        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(gallery.images().len(), 6);
        assert_eq!(gallery.total_pages(), 2);
        assert_eq!(gallery.status_line(), "Failed to load images: connection refused");
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut gallery = Gallery::new(FilterState::default());
        let slow = gallery.update_filter(FilterChange::Query("cat".to_string())).unwrap();
        let fast = gallery.update_filter(FilterChange::Query("dog".to_string())).unwrap();

        assert_eq!(
            gallery.apply_response(fast.seq, ok(page_of(2, 1))),
            FetchOutcome::Updated {
                images_replaced: true,
                refetch: None
            }
        );
        assert_eq!(gallery.apply_response(slow.seq, ok(page_of(9, 9))), FetchOutcome::Stale);
        assert_eq!(gallery.images().len(), 2);
        assert_eq!(gallery.total_pages(), 1);
    }

    #[test]
    fn test_filter_change_keeps_page() {
        let mut gallery = Gallery::new(FilterState::default());
        gallery.update_filter(FilterChange::Page(4));

        let fetch = gallery.update_filter(FilterChange::Checkpoint(Some("sd-xl".into()))).unwrap();
        assert_eq!(fetch.request.page, 3);
        assert_eq!(fetch.request.checkpoint.as_deref(), Some("sd-xl"));
    }

    #[test]
    fn test_status_uses_total_items() {
        let mut gallery = Gallery::new(FilterState::default());
        let fetch = gallery.refresh();
        let mut list = page_of(3, 1);
        if let Some(meta) = list.metadata.as_mut() {
            meta.total_items = Some(3);
        }
        gallery.apply_response(fetch.seq, ok(list));

        assert_eq!(gallery.status_line(), "3 images");
    }

    #[test]
    fn test_checkpoints_stored() {
        let mut gallery = Gallery::new(FilterState::default());
        gallery.set_checkpoints(vec!["a".into(), "b".into()]);
        assert_eq!(gallery.checkpoints(), ["a".to_string(), "b".to_string()]);
    }
}
