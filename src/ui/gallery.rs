/// Gallery grid: category selector, period buttons and artwork tiles
use iced::widget::scrollable::AbsoluteOffset;
use iced::widget::{button, column, container, image, mouse_area, row, scrollable, text, Space};
use iced::{mouse, Alignment, Element, Length, Subscription};
use iced_aw::Wrap;

use crate::media::cache::{ImageCache, ImageEntry};
use crate::media::orientation::Orientation;
use crate::media::playback::{PlaybackEvent, Player};
use crate::state::catalog::{Catalog, MediaBase};
use crate::state::data::{Artwork, ArtworkKind, Category};
use crate::state::filter::ViewState;

const TILE_WIDTH: f32 = 260.0;
const TILE_HEIGHT: f32 = 320.0;
const TILE_GAP: f32 = 16.0;
/// Space under the image for title and description
const TILE_INFO_HEIGHT: f32 = 72.0;
const SNIPPET_CHARS: usize = 80;

pub fn scroll_id() -> scrollable::Id {
    scrollable::Id::new("gallery-scroll")
}

/// Hover preview state of a video tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preview {
    #[default]
    Poster,
    /// Looping, muted preview clip while the pointer is over the tile
    Looping,
}

/// One grid cell. Holds the view-list index of its artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub preview: Preview,
}

/// Build tiles for the view list; nothing is constructed for an empty list
pub fn build_tiles(items: &[Artwork]) -> Vec<Tile> {
    (0..items.len())
        .map(|index| Tile {
            index,
            preview: Preview::Poster,
        })
        .collect()
}

/// Which viewer a click on a tile opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Filters changed; settle after the loading transition
    Settle(u64),
    /// Tiles were rebuilt; their cover images should be fetched
    Rebuilt,
    OpenLightbox(usize),
    OpenComic(usize),
    OpenVideo(usize),
}

/// Dispatch a tile click by artwork kind
pub fn dispatch(item: &Artwork, index: usize) -> Action {
    match item.kind {
        ArtworkKind::Comic => Action::OpenComic(index),
        ArtworkKind::Video { .. } => Action::OpenVideo(index),
        ArtworkKind::Image => Action::OpenLightbox(index),
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    SelectCategory(Category),
    SelectPeriod(String),
    /// Loading transition finished for the given generation
    Settled(u64),
    TileClicked(usize),
    HoverStart(usize),
    HoverEnd(usize),
    Scrolled(AbsoluteOffset),
    Preview(PlaybackEvent),
}

#[derive(Debug)]
pub struct Gallery {
    view: ViewState,
    periods: Vec<String>,
    tiles: Vec<Tile>,
    loading: bool,
    generation: u64,
    offset: AbsoluteOffset,
    media: MediaBase,
    /// Shared by all video tiles; holds the clip of `previewing`
    preview: Box<dyn Player>,
    previewing: Option<usize>,
}

impl Gallery {
    /// Create the gallery in its loading state; the caller schedules the first settle
    pub fn new(
        catalog: &Catalog,
        category: Category,
        period: &str,
        media: MediaBase,
        preview: Box<dyn Player>,
    ) -> (Self, Action) {
        let gallery = Self {
            view: ViewState::new(catalog, category, period),
            periods: catalog.periods(period),
            tiles: Vec::new(),
            loading: true,
            generation: 0,
            offset: AbsoluteOffset::default(),
            media,
            preview,
            previewing: None,
        };
        (gallery, Action::Settle(0))
    }

    pub fn items(&self) -> &[Artwork] {
        self.view.items()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last observed scroll position of the grid
    pub fn offset(&self) -> AbsoluteOffset {
        self.offset
    }

    pub fn update(&mut self, message: Message, catalog: &Catalog) -> Action {
        match message {
            Message::SelectCategory(category) => {
                if &category == self.view.category() {
                    return Action::None;
                }
                self.view.select_category(catalog, category);
                self.begin_transition()
            }
            Message::SelectPeriod(period) => {
                if period == self.view.period() {
                    return Action::None;
                }
                self.view.select_period(catalog, period);
                self.begin_transition()
            }
            Message::Settled(generation) => {
                if generation != self.generation {
                    return Action::None;
                }
                // Full rebuild, no diffing against the previous tiles
                self.tiles = build_tiles(self.view.items());
                self.loading = false;
                Action::Rebuilt
            }
            Message::TileClicked(index) => match self.view.items().get(index) {
                Some(item) => dispatch(item, index),
                None => Action::None,
            },
            Message::HoverStart(index) => {
                self.start_preview(index);
                Action::None
            }
            Message::HoverEnd(index) => {
                self.stop_preview(index);
                Action::None
            }
            Message::Scrolled(offset) => {
                self.offset = offset;
                Action::None
            }
            Message::Preview(event) => {
                self.preview.on_event(event);
                Action::None
            }
        }
    }

    /// Frames of the hovered video tile
    pub fn subscription(&self) -> Subscription<Message> {
        self.preview.subscription().map(Message::Preview)
    }

    fn start_preview(&mut self, index: usize) {
        let Some(video_file) = self.view.items().get(index).and_then(|item| item.video_file())
        else {
            return;
        };
        let Some(tile) = self.tiles.iter_mut().find(|tile| tile.index == index) else {
            return;
        };

        if self.previewing != Some(index) {
            self.preview.load(self.media.resolve(video_file));
            self.previewing = Some(index);
        }
        tile.preview = Preview::Looping;
        self.preview.play();
    }

    /// Pause and rewind so the next hover starts the clip from the beginning
    fn stop_preview(&mut self, index: usize) {
        let Some(tile) = self.tiles.iter_mut().find(|tile| tile.index == index) else {
            return;
        };
        if tile.preview != Preview::Looping {
            return;
        }
        tile.preview = Preview::Poster;
        self.preview.pause();
        self.preview.rewind();
    }

    fn begin_transition(&mut self) -> Action {
        if self.previewing.take().is_some() {
            self.preview.unload();
        }
        self.tiles.clear();
        self.loading = true;
        self.generation += 1;
        self.offset = AbsoluteOffset::default();
        Action::Settle(self.generation)
    }

    /// Latest preview frame for `tile`, if its clip is the one playing
    fn preview_frame(&self, tile: &Tile) -> Option<&image::Handle> {
        if tile.preview != Preview::Looping || self.previewing != Some(tile.index) {
            return None;
        }
        self.preview.frame()
    }

    /// Cover sources of the current tiles
    pub fn cover_sources(&self) -> Vec<String> {
        self.tiles
            .iter()
            .filter_map(|tile| self.view.items().get(tile.index))
            .filter_map(|item| item.cover().map(str::to_string))
            .collect()
    }

    /// Category selector and period buttons
    pub fn filters<'a>(&'a self, catalog: &'a Catalog) -> Element<'a, Message> {
        let categories = catalog.categories().fold(row![].spacing(8), |row, category| {
            let active = category == self.view.category();
            row.push(
                button(text(category.label()).size(14))
                    .on_press(Message::SelectCategory(category.clone()))
                    .style(if active { button::primary } else { button::secondary })
                    .padding([6, 14]),
            )
        });

        let periods = self.periods.iter().fold(row![].spacing(6), |row, period| {
            let active = period == self.view.period();
            row.push(
                button(text(period.as_str()).size(13))
                    .on_press(Message::SelectPeriod(period.clone()))
                    .style(if active { button::primary } else { button::text })
                    .padding([4, 10]),
            )
        });

        column![categories.wrap(), periods.wrap()]
            .spacing(12)
            .into()
    }

    pub fn view<'a>(&'a self, images: &'a ImageCache) -> Element<'a, Message> {
        let body: Element<'a, Message> = if self.loading {
            container(text("Loading...").size(16))
                .padding(48)
                .center_x(Length::Fill)
                .into()
        } else if self.tiles.is_empty() {
            empty_state()
        } else {
            let tiles = self
                .tiles
                .iter()
                .filter_map(|tile| {
                    self.view
                        .items()
                        .get(tile.index)
                        .map(|item| tile_view(tile, item, images, self.preview_frame(tile)))
                })
                .collect();

            Wrap::with_elements(tiles)
                .spacing(TILE_GAP)
                .line_spacing(TILE_GAP)
                .into()
        };

        scrollable(container(body).padding(24).width(Length::Fill))
            .id(scroll_id())
            .on_scroll(|viewport| Message::Scrolled(viewport.absolute_offset()))
            .height(Length::Fill)
            .into()
    }
}

fn empty_state<'a>() -> Element<'a, Message> {
    container(
        column![
            text("No items found for this period").size(20),
            text("Add artwork to the catalog to see it here!").size(14),
        ]
        .spacing(16)
        .align_x(Alignment::Center),
    )
    .padding(64)
    .center_x(Length::Fill)
    .into()
}

/// Pixel size of a tile spanning (columns, rows) grid cells
pub fn tile_size(orientation: Orientation) -> (f32, f32) {
    let (columns, rows) = orientation.span();
    let width = TILE_WIDTH * columns as f32 + TILE_GAP * (columns as f32 - 1.0);
    let height = TILE_HEIGHT * rows as f32 + TILE_GAP * (rows as f32 - 1.0);
    (width, height)
}

fn snippet(description: &str) -> String {
    if description.chars().count() <= SNIPPET_CHARS {
        return description.to_string();
    }
    let cut: String = description.chars().take(SNIPPET_CHARS).collect();
    format!("{}…", cut.trim_end())
}

fn tile_view<'a>(
    tile: &Tile,
    item: &'a Artwork,
    images: &'a ImageCache,
    preview: Option<&'a image::Handle>,
) -> Element<'a, Message> {
    let source = item.cover();
    // Dimensions already in the cache are applied straight away
    let orientation = source
        .map(|source| images.orientation(source))
        .unwrap_or_default();
    let (width, height) = tile_size(orientation);
    let image_height = height - TILE_INFO_HEIGHT;

    let picture: Element<'a, Message> = match (preview, source.map(|source| images.get(source))) {
        (Some(frame), _) => image(frame.clone())
            .width(Length::Fill)
            .height(image_height)
            .content_fit(iced::ContentFit::Cover)
            .into(),
        (None, None) => placeholder("No image", image_height),
        (None, Some(Some(ImageEntry::Ready(loaded)))) => image(loaded.handle.clone())
            .width(Length::Fill)
            .height(image_height)
            .content_fit(iced::ContentFit::Cover)
            .into(),
        (None, Some(Some(ImageEntry::Failed(_)))) => placeholder("Image unavailable", image_height),
        (None, Some(_)) => placeholder("", image_height),
    };

    let badge: Element<'a, Message> = if item.video_file().is_some() {
        text("Timelapse").size(12).into()
    } else if item.is_comic() {
        text(format!("{} pages", item.images.len())).size(12).into()
    } else {
        Space::with_height(0).into()
    };

    let info = column![
        row![text(item.title.as_str()).size(16), Space::with_width(Length::Fill), badge]
            .align_y(Alignment::Center),
        text(snippet(&item.description)).size(13),
    ]
    .spacing(4)
    .height(TILE_INFO_HEIGHT);

    let card = container(column![picture, info].spacing(8))
        .width(width)
        .height(height)
        .padding(6)
        .style(container::rounded_box);

    let area = mouse_area(card)
        .on_press(Message::TileClicked(tile.index))
        .interaction(mouse::Interaction::Pointer);

    if item.video_file().is_some() {
        area.on_enter(Message::HoverStart(tile.index))
            .on_exit(Message::HoverEnd(tile.index))
            .into()
    } else {
        area.into()
    }
}

fn placeholder<'a>(label: &'a str, height: f32) -> Element<'a, Message> {
    container(text(label).size(12))
        .width(Length::Fill)
        .height(height)
        .center_x(Length::Fill)
        .center_y(height)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::playback::recording::RecordingPlayer;
    use crate::state::catalog::CatalogSource;
    use std::path::PathBuf;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{
                "illustrations": [
                    {"title": "Still", "description": "", "year": "2025", "date": "2025-02-01", "mainImage": "still.jpg"},
                    {"title": "Pages", "description": "", "year": "2025", "date": "2025-01-01", "isComic": true,
                     "images": [{"url": "p1.jpg", "label": "1"}]},
                    {"title": "Paint", "description": "", "year": "2025", "isVideo": true,
                     "videoFile": "paint.mp4", "mainImage": "paint.jpg"}
                ],
                "animation": []
            }"#,
        )
        .unwrap()
    }

    fn settled_with(catalog: &Catalog, player: RecordingPlayer) -> Gallery {
        let (mut gallery, action) = Gallery::new(
            catalog,
            Category::new("illustrations"),
            "2025",
            CatalogSource::parse("site/data/artworks.json").base(),
            Box::new(player),
        );
        assert_eq!(action, Action::Settle(0));
        assert_eq!(gallery.update(Message::Settled(0), catalog), Action::Rebuilt);
        gallery
    }

    fn settled(catalog: &Catalog) -> Gallery {
        settled_with(catalog, RecordingPlayer::default())
    }

    #[test]
    fn test_dispatch_by_kind() {
        let catalog = catalog();
        let mut gallery = settled(&catalog);

        assert_eq!(gallery.update(Message::TileClicked(0), &catalog), Action::OpenLightbox(0));
        assert_eq!(gallery.update(Message::TileClicked(1), &catalog), Action::OpenComic(1));
        assert_eq!(gallery.update(Message::TileClicked(2), &catalog), Action::OpenVideo(2));
        assert_eq!(gallery.update(Message::TileClicked(9), &catalog), Action::None);
    }

    #[test]
    fn test_filter_change_rebuilds_after_transition() {
        let catalog = catalog();
        let mut gallery = settled(&catalog);
        assert_eq!(gallery.tiles().len(), 3);

        let action = gallery.update(Message::SelectPeriod("2024".into()), &catalog);
        assert_eq!(action, Action::Settle(1));
        assert!(gallery.is_loading());
        assert!(gallery.tiles().is_empty());

        // A stale settle from an earlier change does nothing
        assert_eq!(gallery.update(Message::Settled(0), &catalog), Action::None);
        assert!(gallery.is_loading());

        assert_eq!(gallery.update(Message::Settled(1), &catalog), Action::Rebuilt);
        assert!(!gallery.is_loading());
    }

    #[test]
    fn test_empty_view_list_builds_no_tiles() {
        let catalog = catalog();
        let mut gallery = settled(&catalog);

        let Action::Settle(generation) =
            gallery.update(Message::SelectCategory(Category::new("animation")), &catalog)
        else {
            panic!("category change should start a transition");
        };
        gallery.update(Message::Settled(generation), &catalog);

        assert!(gallery.items().is_empty());
        assert!(gallery.tiles().is_empty());
        assert!(gallery.cover_sources().is_empty());
    }

    #[test]
    fn test_hover_plays_preview_clip() {
        let catalog = catalog();
        let player = RecordingPlayer::default();
        let mut gallery = settled_with(&catalog, player.clone());

        gallery.update(Message::HoverStart(2), &catalog);
        assert_eq!(gallery.tiles()[2].preview, Preview::Looping);

        let source = CatalogSource::File(PathBuf::from("site/data/paint.mp4"));
        assert_eq!(
            player.calls(),
            vec![format!("load {:?}", source), "play".to_string()]
        );
    }

    #[test]
    fn test_hover_end_pauses_and_rewinds() {
        let catalog = catalog();
        let player = RecordingPlayer::default();
        let mut gallery = settled_with(&catalog, player.clone());

        gallery.update(Message::HoverStart(2), &catalog);
        gallery.update(Message::HoverEnd(2), &catalog);
        assert_eq!(gallery.tiles()[2].preview, Preview::Poster);
        assert_eq!(player.calls()[2..], ["pause".to_string(), "rewind".to_string()]);

        // Hovering the same tile again replays the loaded clip without reloading
        gallery.update(Message::HoverStart(2), &catalog);
        let loads = player.calls().iter().filter(|call| call.starts_with("load")).count();
        assert_eq!(loads, 1);
        assert_eq!(player.calls().last().map(String::as_str), Some("play"));
    }

    #[test]
    fn test_hover_ignored_for_still_images() {
        let catalog = catalog();
        let player = RecordingPlayer::default();
        let mut gallery = settled_with(&catalog, player.clone());

        gallery.update(Message::HoverStart(0), &catalog);
        gallery.update(Message::HoverEnd(0), &catalog);
        assert_eq!(gallery.tiles()[0].preview, Preview::Poster);
        assert!(player.calls().is_empty());
    }

    #[test]
    fn test_filter_change_unloads_preview() {
        let catalog = catalog();
        let player = RecordingPlayer::default();
        let mut gallery = settled_with(&catalog, player.clone());

        gallery.update(Message::HoverStart(2), &catalog);
        gallery.update(Message::SelectCategory(Category::new("animation")), &catalog);
        assert_eq!(player.calls().last().map(String::as_str), Some("unload"));
    }

    #[test]
    fn test_comic_tile_uses_main_image_cover() {
        let catalog = Catalog::from_json(
            r#"{"comics": [{"title": "Short", "year": "2025", "isComic": true,
                "mainImage": "cover.jpg", "images": [{"url": "p1.jpg", "label": "1"}]}]}"#,
        )
        .unwrap();
        let (mut gallery, _) = Gallery::new(
            &catalog,
            Category::new("comics"),
            "2025",
            MediaBase::default(),
            Box::new(RecordingPlayer::default()),
        );
        gallery.update(Message::Settled(0), &catalog);
        assert_eq!(gallery.cover_sources(), vec!["cover.jpg".to_string()]);
    }

    #[test]
    fn test_reselecting_same_filter_is_noop() {
        let catalog = catalog();
        let mut gallery = settled(&catalog);
        assert_eq!(
            gallery.update(Message::SelectPeriod("2025".into()), &catalog),
            Action::None
        );
        assert_eq!(gallery.tiles().len(), 3);
    }

    #[test]
    fn test_tile_sizes_follow_span() {
        let (w1, h1) = tile_size(Orientation::Portrait);
        let (w3, _) = tile_size(Orientation::UltraWide);
        let (w2, h2) = tile_size(Orientation::LargeSquare);
        assert_eq!(w1, TILE_WIDTH);
        assert_eq!(w3, TILE_WIDTH * 3.0 + TILE_GAP * 2.0);
        assert_eq!(w2, TILE_WIDTH * 2.0 + TILE_GAP);
        assert_eq!(h2, h1 * 2.0 + TILE_GAP);
    }

    #[test]
    fn test_snippet_truncates_long_descriptions() {
        assert_eq!(snippet("short"), "short");
        let long = "word ".repeat(40);
        let cut = snippet(&long);
        assert!(cut.ends_with('…'));
        assert!(cut.chars().count() <= SNIPPET_CHARS + 1);
    }
}
