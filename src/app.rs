use chrono::NaiveDate;
use iced::keyboard::{self, key::Named, Key};
use iced::widget::image::Handle;
use iced::widget::{column, container, scrollable, text};
use iced::{Element, Length, Subscription, Task, Theme};
use iced_aw::date_picker::Date;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::api::thumbnail::{self, Thumbnail, ThumbnailCache};
use crate::api::{ApiError, GalleryClient};
use crate::state::data::ImageList;
use crate::state::filter::{FilterState, SizeClass, SortOrder};
use crate::state::gallery::{FetchOutcome, FilterChange, Gallery, PendingFetch};
use crate::ui::detail::{self, DetailViewer, Picture};
use crate::ui::toolbar::{self, CheckpointChoice};
use crate::ui::{grid, pagination};

/// Everything the application needs at startup
#[derive(Debug, Clone)]
pub struct Flags {
    pub client: GalleryClient,
    pub thumbnail_cache: Option<ThumbnailCache>,
    pub thumb_size: u8,
}

/// Main application state
pub struct App {
    client: GalleryClient,
    thumbnail_cache: Option<ThumbnailCache>,
    gallery: Gallery,
    /// Search box contents; only applied on Enter
    search_draft: String,
    show_date_picker: bool,
    /// Checkpoint list failures are reported separately from the image status
    notice: Option<String>,
    thumbnails: HashMap<String, Handle>,
    /// Ids with a thumbnail load in flight
    pending_thumbnails: HashSet<String>,
    full_images: HashMap<String, Handle>,
    /// Ids whose full-size download failed
    failed_images: HashSet<String>,
    detail: Option<DetailViewer>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    SearchChanged(String),
    SearchSubmitted,
    PageSelected(u32),
    SizeSelected(SizeClass),
    OrderSelected(SortOrder),
    CheckpointSelected(CheckpointChoice),
    ThumbSizeChanged(u8),
    ToggleDatePicker,
    CancelDatePicker,
    DateSubmitted(Date),
    ClearDate,
    ImagesLoaded {
        seq: u64,
        result: Result<ImageList, Arc<ApiError>>,
    },
    CheckpointsLoaded(Result<Vec<String>, Arc<ApiError>>),
    ThumbnailLoaded {
        id: String,
        result: Result<Thumbnail, Arc<ApiError>>,
    },
    FullImageLoaded {
        id: String,
        result: Result<Vec<u8>, Arc<ApiError>>,
    },
    OpenDetail(usize),
    CloseDetail,
    NextSlide,
    PreviousSlide,
}

impl App {
    /// Create the application and start the initial image and checkpoint fetches
    pub fn new(flags: Flags) -> (Self, Task<Message>) {
        let mut gallery = Gallery::new(FilterState::new().with_thumb_size(flags.thumb_size));
        let first = gallery.refresh();

        info!("🖼️  Gallery client for {}", flags.client.base_url());

        let mut app = App {
            client: flags.client,
            thumbnail_cache: flags.thumbnail_cache,
            gallery,
            search_draft: String::new(),
            show_date_picker: false,
            notice: None,
            thumbnails: HashMap::new(),
            pending_thumbnails: HashSet::new(),
            full_images: HashMap::new(),
            failed_images: HashSet::new(),
            detail: None,
        };

        let client = app.client.clone();
        let checkpoints = Task::perform(
            async move { client.list_checkpoints().await.map_err(Arc::new) },
            Message::CheckpointsLoaded,
        );
        let images = app.fetch(first);
        (app, Task::batch([images, checkpoints]))
    }

    /// Handle application messages and update state
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SearchChanged(draft) => {
                self.search_draft = draft;
                Task::none()
            }
            Message::SearchSubmitted => self.change(FilterChange::Query(self.search_draft.clone())),
            Message::PageSelected(page) => self.change(FilterChange::Page(page)),
            Message::SizeSelected(size) => self.change(FilterChange::Size(size)),
            Message::OrderSelected(order) => self.change(FilterChange::Order(order)),
            Message::CheckpointSelected(choice) => {
                self.change(FilterChange::Checkpoint(choice.into_filter()))
            }
            Message::ThumbSizeChanged(units) => self.change(FilterChange::ThumbSize(units)),
            Message::ToggleDatePicker => {
                self.show_date_picker = !self.show_date_picker;
                Task::none()
            }
            Message::CancelDatePicker => {
                self.show_date_picker = false;
                Task::none()
            }
            Message::DateSubmitted(date) => {
                self.show_date_picker = false;
                match NaiveDate::from_ymd_opt(date.year, date.month, date.day) {
                    Some(date) => self.change(FilterChange::Date(Some(date))),
                    None => Task::none(),
                }
            }
            Message::ClearDate => self.change(FilterChange::Date(None)),
            Message::ImagesLoaded { seq, result } => {
                let result = result.map_err(|e| describe_error(&e));
                match self.gallery.apply_response(seq, result) {
                    FetchOutcome::Updated {
                        images_replaced,
                        refetch,
                    } => {
                        let mut tasks = Vec::new();
                        if images_replaced {
                            tasks.push(self.on_images_replaced());
                        }
                        if let Some(refetch) = refetch {
                            tasks.push(self.fetch(refetch));
                        }
                        Task::batch(tasks)
                    }
                    FetchOutcome::Stale | FetchOutcome::Failed => Task::none(),
                }
            }
            Message::CheckpointsLoaded(result) => {
                match result {
                    Ok(names) => self.gallery.set_checkpoints(names),
                    Err(e) => {
                        error!("Failed to fetch checkpoints: {}", e);
                        self.notice =
                            Some(format!("Failed to load checkpoints: {}", describe_error(&e)));
                    }
                }
                Task::none()
            }
            Message::ThumbnailLoaded { id, result } => {
                self.pending_thumbnails.remove(&id);
                match result {
                    Ok(thumb) if self.on_current_page(&id) => {
                        let handle = Handle::from_rgba(thumb.width, thumb.height, thumb.pixels);
                        self.thumbnails.insert(id, handle);
                    }
                    Ok(_) => debug!("Dropping thumbnail for {} (no longer displayed)", id),
                    Err(e) => error!("Failed to load thumbnail for {}: {}", id, e),
                }
                Task::none()
            }
            Message::FullImageLoaded { id, result } => {
                match result {
                    Ok(bytes) if self.on_current_page(&id) => {
                        self.full_images.insert(id, Handle::from_bytes(bytes));
                    }
                    Err(e) if self.on_current_page(&id) => {
                        error!("Failed to load image {}: {}", id, e);
                        self.failed_images.insert(id);
                    }
                    Ok(_) | Err(_) => debug!("Dropping image {} (no longer displayed)", id),
                }
                Task::none()
            }
            Message::OpenDetail(index) => {
                self.detail = DetailViewer::open(index, self.gallery.images());
                self.load_current_slide()
            }
            Message::CloseDetail => {
                self.detail = None;
                Task::none()
            }
            Message::NextSlide => {
                let images = self.gallery.images();
                let moved = self.detail.as_mut().is_some_and(|viewer| viewer.next(images));
                if moved {
                    self.load_current_slide()
                } else {
                    Task::none()
                }
            }
            Message::PreviousSlide => {
                let images = self.gallery.images();
                let moved = self.detail.as_mut().is_some_and(|viewer| viewer.previous(images));
                if moved {
                    self.load_current_slide()
                } else {
                    Task::none()
                }
            }
        }
    }

    /// Build the user interface
    pub fn view(&self) -> Element<'_, Message> {
        if let Some(viewer) = &self.detail {
            let picture = match self.full_images.get(viewer.id()) {
                Some(handle) => Picture::Ready(handle),
                None if self.failed_images.contains(viewer.id()) => Picture::Failed,
                None => Picture::Loading,
            };
            return detail::view(viewer, self.gallery.images(), picture);
        }

        let filter = self.gallery.filter();
        let toolbar = toolbar::view(
            filter,
            &self.search_draft,
            self.gallery.checkpoints(),
            self.show_date_picker,
        );

        let mut status = column![text(self.gallery.status_line()).size(14)].spacing(2);
        if let Some(notice) = &self.notice {
            status = status.push(text(notice).size(14));
        }

        let grid = scrollable(grid::view(
            self.gallery.images(),
            filter.thumb_size(),
            &self.thumbnails,
        ))
        .height(Length::Fill);

        let footer = container(pagination::view(filter.page(), self.gallery.total_pages()))
            .center_x(Length::Fill);

        column![toolbar, status, grid, footer]
            .spacing(12)
            .padding(16)
            .into()
    }

    /// Arrow keys and Escape drive the detail carousel
    pub fn subscription(&self) -> Subscription<Message> {
        if self.detail.is_none() {
            return Subscription::none();
        }

        keyboard::on_key_press(|key, _modifiers| match key.as_ref() {
            Key::Named(Named::ArrowLeft) => Some(Message::PreviousSlide),
            Key::Named(Named::ArrowRight) => Some(Message::NextSlide),
            Key::Named(Named::Escape) => Some(Message::CloseDetail),
            _ => None,
        })
    }

    /// Set the application theme
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn change(&mut self, change: FilterChange) -> Task<Message> {
        debug!("Filter change: {:?}", change);
        match self.gallery.update_filter(change) {
            Some(pending) => self.fetch(pending),
            None => Task::none(),
        }
    }

    /// Launch the request; the response is tagged with its sequence number
    fn fetch(&self, pending: PendingFetch) -> Task<Message> {
        let client = self.client.clone();
        let PendingFetch { seq, request } = pending;
        Task::perform(
            async move { client.list_images(&request).await.map_err(Arc::new) },
            move |result| Message::ImagesLoaded { seq, result },
        )
    }

    fn on_current_page(&self, id: &str) -> bool {
        self.gallery.images().iter().any(|image| image.id == id)
    }

    /// Drop cached handles for images that left the page and start
    /// thumbnail loads for the new ones
    fn on_images_replaced(&mut self) -> Task<Message> {
        let images = self.gallery.images();
        let current: HashSet<&str> = images.iter().map(|image| image.id.as_str()).collect();
        self.thumbnails.retain(|id, _| current.contains(id.as_str()));
        self.full_images.retain(|id, _| current.contains(id.as_str()));
        self.failed_images.retain(|id| current.contains(id.as_str()));

        // The viewer stays on the image it shows, wherever it moved to
        if let Some(viewer) = &mut self.detail {
            if !viewer.follow(images) {
                debug!("Closing detail view, {} left the page", viewer.id());
                self.detail = None;
            }
        }

        let missing: Vec<String> = self
            .gallery
            .images()
            .iter()
            .filter(|image| {
                !self.thumbnails.contains_key(&image.id)
                    && !self.pending_thumbnails.contains(&image.id)
            })
            .map(|image| image.id.clone())
            .collect();

        let tasks: Vec<Task<Message>> = missing
            .into_iter()
            .map(|id| {
                self.pending_thumbnails.insert(id.clone());
                let cache = self.thumbnail_cache.clone();
                Task::perform(
                    thumbnail::load_thumbnail(self.client.clone(), cache, id.clone()),
                    move |result| Message::ThumbnailLoaded {
                        id: id.clone(),
                        result: result.map_err(Arc::new),
                    },
                )
            })
            .collect();
        Task::batch(tasks)
    }

    /// Download the full image for the open slide unless already loaded.
    /// A previous failure is retried.
    fn load_current_slide(&mut self) -> Task<Message> {
        let Some(viewer) = &self.detail else {
            return Task::none();
        };
        if self.full_images.contains_key(viewer.id()) {
            return Task::none();
        }

        let id = viewer.id().to_string();
        self.failed_images.remove(&id);
        let client = self.client.clone();
        Task::perform(
            {
                let id = id.clone();
                async move { client.fetch_image(&id).await.map_err(Arc::new) }
            },
            move |result| Message::FullImageLoaded { id: id.clone(), result },
        )
    }
}

/// Unreachable servers get a clearer message than other failures
fn describe_error(err: &ApiError) -> String {
    if err.is_network() {
        format!("server unreachable ({})", err)
    } else {
        err.to_string()
    }
}
