use iced::keyboard::{self, key::Named, Key};
use iced::widget::{button, column, container, row, scrollable, text, Space};
use iced::{Alignment, Element, Length, Size, Subscription, Task, Theme};

mod config;
mod contact;
mod logging;
mod media;
mod state;
mod ui;

use config::AppConfig;
use contact::relay::RelayClient;
use media::cache::ImageCache;
use media::loader::{self, ImageError, LoadedImage};
use media::playback::DecoderPlayer;
use state::catalog::{self, Catalog, CatalogSource, LoadOutcome, MediaBase};
use state::data::Category;
use ui::comic::ComicReader;
use ui::contact::ContactPage;
use ui::gallery::{self, Gallery};
use ui::lightbox::Lightbox;
use ui::video::VideoModal;
use ui::{comic, lightbox, video};

/// Top-level pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Gallery,
    Contact,
}

/// The loaded catalog and the gallery built over it
#[derive(Debug)]
struct Library {
    catalog: Catalog,
    gallery: Gallery,
}

/// Main application state
struct PortfolioGallery {
    config: AppConfig,
    media_base: MediaBase,
    relay: RelayClient,
    page: Page,
    /// None until the startup catalog load finishes
    library: Option<Library>,
    /// Status message to display to the user
    status: Option<String>,
    images: ImageCache,
    lightbox: Lightbox,
    comic: ComicReader,
    video: VideoModal,
    contact: ContactPage,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    CatalogLoaded(LoadOutcome),
    ImageLoaded(String, Result<LoadedImage, ImageError>),
    ShowPage(Page),
    KeyPressed(Key),
    Gallery(gallery::Message),
    Lightbox(lightbox::Message),
    Comic(comic::Message),
    Video(video::Message),
    Contact(ui::contact::Message),
}

impl PortfolioGallery {
    /// Create the application and start the one-time catalog load
    fn new() -> (Self, Task<Message>) {
        let config = config::load();
        let source = CatalogSource::parse(&config.catalog);
        tracing::info!(?source, "loading catalog");

        let app = PortfolioGallery {
            media_base: source.base(),
            relay: RelayClient::new(config.relay_endpoint.clone()),
            page: Page::Gallery,
            library: None,
            status: None,
            images: ImageCache::new(),
            lightbox: Lightbox::default(),
            comic: ComicReader::default(),
            video: VideoModal::default(),
            contact: ContactPage::default(),
            config,
        };

        let load = Task::perform(
            catalog::load_or_fallback(source, app.config.fallback_categories.clone()),
            Message::CatalogLoaded,
        );
        (app, load)
    }

    fn overlay_open(&self) -> bool {
        self.lightbox.is_open() || self.comic.is_open() || self.video.is_visible()
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::CatalogLoaded(outcome) => {
                if let Some(error) = &outcome.diagnostic {
                    self.status = Some(format!("Could not load the artwork catalog: {}", error));
                }

                let catalog = outcome.catalog;
                let category = initial_category(&catalog, &self.config.initial_category);
                let (gallery, action) = Gallery::new(
                    &catalog,
                    category,
                    &self.config.initial_period,
                    self.media_base.clone(),
                    Box::new(DecoderPlayer::looping()),
                );
                self.library = Some(Library { catalog, gallery });
                self.gallery_action(action)
            }
            Message::ImageLoaded(source, result) => {
                self.images.complete(source, result);
                Task::none()
            }
            Message::ShowPage(page) => {
                self.page = page;
                Task::none()
            }
            Message::KeyPressed(key) => self.key_pressed(key),
            Message::Gallery(message) => {
                let Some(library) = self.library.as_mut() else {
                    return Task::none();
                };
                let action = library.gallery.update(message, &library.catalog);
                self.gallery_action(action)
            }
            Message::Lightbox(message) => {
                let len = self.items_len();
                let was_open = self.lightbox.is_open();
                let task = self
                    .lightbox
                    .update(message, len, self.config.transition())
                    .map(Message::Lightbox);

                let prefetch = self.lightbox_images();
                Task::batch([task, prefetch, self.restore_scroll(was_open)])
            }
            Message::Comic(message) => {
                let was_open = self.comic.is_open();
                let task = self.comic.update(message).map(Message::Comic);
                Task::batch([task, self.restore_scroll(was_open)])
            }
            Message::Video(message) => {
                let was_open = self.video.is_visible();
                self.video.update(message);
                self.restore_scroll(was_open)
            }
            Message::Contact(message) => self
                .contact
                .update(message, &self.config, &self.relay)
                .map(Message::Contact),
        }
    }

    /// Keyboard handling; the subscription only exists while an overlay is open
    fn key_pressed(&mut self, key: Key) -> Task<Message> {
        match key {
            Key::Named(Named::Escape) if self.lightbox.is_open() => {
                self.update(Message::Lightbox(lightbox::Message::Close))
            }
            Key::Named(Named::ArrowLeft) if self.lightbox.is_open() => {
                self.update(Message::Lightbox(lightbox::Message::Previous))
            }
            Key::Named(Named::ArrowRight) if self.lightbox.is_open() => {
                self.update(Message::Lightbox(lightbox::Message::Next))
            }
            Key::Named(Named::Escape) if self.comic.is_open() => {
                self.update(Message::Comic(comic::Message::Close))
            }
            Key::Named(Named::Escape) if self.video.is_visible() => {
                self.update(Message::Video(video::Message::Close))
            }
            _ => Task::none(),
        }
    }

    fn gallery_action(&mut self, action: gallery::Action) -> Task<Message> {
        let Some(library) = self.library.as_ref() else {
            return Task::none();
        };

        match action {
            gallery::Action::None => Task::none(),
            gallery::Action::Settle(generation) => ui::after(
                self.config.transition(),
                Message::Gallery(gallery::Message::Settled(generation)),
            ),
            gallery::Action::Rebuilt => {
                let sources = library.gallery.cover_sources();
                self.fetch_images(sources)
            }
            gallery::Action::OpenLightbox(index) => {
                let len = library.gallery.items().len();
                let task = self.lightbox.open(index, len).map(Message::Lightbox);
                Task::batch([task, self.lightbox_images()])
            }
            gallery::Action::OpenComic(index) => {
                let Some(item) = library.gallery.items().get(index).cloned() else {
                    return Task::none();
                };
                let pages = item.images.iter().map(|page| page.url.clone()).collect();
                let task = self.comic.open(item).map(Message::Comic);
                Task::batch([task, self.fetch_images(pages)])
            }
            gallery::Action::OpenVideo(index) => {
                let Some(item) = library.gallery.items().get(index).cloned() else {
                    return Task::none();
                };
                let Some(video_file) = item.video_file() else {
                    return Task::none();
                };
                let source = self.media_base.resolve(video_file);
                self.video.open(item, source);
                Task::none()
            }
        }
    }

    /// Images of the artwork shown in the lightbox
    fn lightbox_images(&mut self) -> Task<Message> {
        let sources = match (self.library.as_ref(), self.lightbox.index()) {
            (Some(library), Some(index)) => library
                .gallery
                .items()
                .get(index)
                .map(|item| item.images.iter().map(|image| image.url.clone()).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        self.fetch_images(sources)
    }

    /// Start fetching every source not yet requested this session
    fn fetch_images(&mut self, sources: Vec<String>) -> Task<Message> {
        let tasks: Vec<Task<Message>> = sources
            .into_iter()
            .filter(|source| self.images.request(source))
            .map(|source| {
                let location = self.media_base.resolve(&source);
                Task::perform(loader::fetch_image(location), move |result| {
                    Message::ImageLoaded(source.clone(), result)
                })
            })
            .collect();
        Task::batch(tasks)
    }

    /// Put the gallery back where it was once the last overlay closes
    fn restore_scroll(&self, was_open: bool) -> Task<Message> {
        if !was_open || self.overlay_open() {
            return Task::none();
        }
        match &self.library {
            Some(library) => scrollable::scroll_to(gallery::scroll_id(), library.gallery.offset()),
            None => Task::none(),
        }
    }

    fn items_len(&self) -> usize {
        self.library
            .as_ref()
            .map(|library| library.gallery.items().len())
            .unwrap_or(0)
    }

    fn subscription(&self) -> Subscription<Message> {
        let keys = if self.overlay_open() {
            keyboard::on_key_press(|key, _modifiers| Some(Message::KeyPressed(key)))
        } else {
            Subscription::none()
        };

        let previews = match &self.library {
            Some(library) => library.gallery.subscription().map(Message::Gallery),
            None => Subscription::none(),
        };

        Subscription::batch([
            keys,
            previews,
            self.comic.subscription().map(Message::Comic),
            self.video.subscription().map(Message::Video),
        ])
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        // While an overlay is open the page itself is not rendered, which
        // suspends its scrolling; `restore_scroll` puts it back on close.
        if let Some(overlay) = self.overlay_view() {
            return overlay;
        }

        let tabs = row![
            text("Portfolio").size(28),
            Space::with_width(Length::Fill),
            tab("Gallery", Page::Gallery, self.page),
            tab("Contact", Page::Contact, self.page),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let mut header = column![tabs].spacing(16).padding([20, 24]);
        if let Some(status) = &self.status {
            header = header.push(text(status.as_str()).size(14).style(text::danger));
        }

        let body: Element<Message> = match (self.page, &self.library) {
            (Page::Contact, _) => self.contact.view().map(Message::Contact),
            (Page::Gallery, None) => container(text("Loading artwork...").size(18))
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
            (Page::Gallery, Some(library)) => {
                header = header.push(library.gallery.filters(&library.catalog).map(Message::Gallery));
                library.gallery.view(&self.images).map(Message::Gallery)
            }
        };

        column![header, body]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn overlay_view(&self) -> Option<Element<Message>> {
        if self.lightbox.is_open() {
            let items = self
                .library
                .as_ref()
                .map(|library| library.gallery.items())
                .unwrap_or(&[]);
            return Some(self.lightbox.view(items, &self.images).map(Message::Lightbox));
        }
        if self.comic.is_open() {
            return Some(self.comic.view(&self.images).map(Message::Comic));
        }
        if self.video.is_visible() {
            return Some(self.video.view(&self.images).map(Message::Video));
        }
        None
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn tab<'a>(label: &'a str, page: Page, current: Page) -> Element<'a, Message> {
    button(text(label))
        .on_press(Message::ShowPage(page))
        .style(if page == current { button::primary } else { button::text })
        .padding([6, 16])
        .into()
}

/// The configured start category if the catalog has it, else the catalog's first
fn initial_category(catalog: &Catalog, configured: &str) -> Category {
    let configured = Category::new(configured);
    if catalog.contains(&configured) {
        return configured;
    }
    catalog.categories().next().cloned().unwrap_or(configured)
}

fn main() -> iced::Result {
    logging::init_logging();

    iced::application(
        "Portfolio",
        PortfolioGallery::update,
        PortfolioGallery::view,
    )
    .subscription(PortfolioGallery::subscription)
    .theme(PortfolioGallery::theme)
    .window_size(Size::new(1280.0, 860.0))
    .centered()
    .run_with(PortfolioGallery::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_category_prefers_config() {
        let catalog = Catalog::from_json(r#"{"comics": [], "illustrations": []}"#).unwrap();
        assert_eq!(initial_category(&catalog, "illustrations").as_str(), "illustrations");
        assert_eq!(initial_category(&catalog, "manga").as_str(), "comics");
    }

    #[test]
    fn test_initial_category_with_empty_catalog() {
        let catalog = Catalog::default();
        assert_eq!(initial_category(&catalog, "illustrations").as_str(), "illustrations");
    }
}
