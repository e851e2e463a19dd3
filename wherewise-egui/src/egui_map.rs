use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use egui::{Color32, Sense, Ui};
use quick_cache::sync::Cache;
use wherewise::decoded_image::DecodedImage;
use wherewise::geo::{GeoRegion, Point2, Size};
use wherewise::screen::{LocationCard, Marker};
use wherewise::tile_fetcher::TileFetcher;
use wherewise::tile_schema::{TileIndex, TileSchema};
use wherewise::{MapView, Messenger};

const ZOOM_SPEED: f64 = 0.2;
const MAX_RESOLUTION: f64 = 156543.03392800014 / 8.0;
const MIN_RESOLUTION: f64 = MAX_RESOLUTION / 65536.0;

enum TileState {
    Loading,
    Loaded(DecodedImage),
    Rendered(egui::TextureHandle),
    Error,
}

/// Map widget state: the camera, the tile cache and the fetcher.
///
/// The widget shows the map region of the location card, fitted to the
/// widget rectangle, and lets the user pan and zoom from there. When a new
/// region arrives the camera snaps back to it.
pub struct EguiMapState {
    context: egui::Context,
    fetcher: Arc<TileFetcher>,
    tile_schema: TileSchema,
    tiles: Arc<Cache<TileIndex, Arc<TileState>>>,
    view: MapView,
    fitted_region: Option<GeoRegion>,
    requires_redraw: Arc<AtomicBool>,
}

impl EguiMapState {
    /// Creates the map state rendering tiles from the given fetcher.
    pub fn new(context: egui::Context, fetcher: TileFetcher) -> Self {
        Self {
            context,
            fetcher: Arc::new(fetcher),
            tile_schema: TileSchema::web(18),
            tiles: Arc::new(Cache::new(1000)),
            view: MapView::new(Point2::default(), MAX_RESOLUTION),
            fitted_region: None,
            requires_redraw: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a messenger that wakes this widget's egui context.
    pub fn messenger(&self) -> MapStateMessenger {
        MapStateMessenger {
            context: self.context.clone(),
            requires_redraw: self.requires_redraw.clone(),
        }
    }

    /// Marks the start of a UI frame.
    ///
    /// Clears the pending-redraw flag so that the next notification wakes
    /// the event loop again. Must be called once per frame, whether or not
    /// the map itself is rendered this frame.
    pub fn begin_frame(&self) {
        self.requires_redraw.swap(false, Ordering::Relaxed);
    }

    /// Renders the map for the given location card in a rectangle of the
    /// given size.
    pub fn render(&mut self, ui: &mut Ui, card: &LocationCard, size: egui::Vec2) {
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        let view_size = Size::new(rect.width() as f64, rect.height() as f64);
        if self.view.size() != view_size {
            self.view = self.view.with_size(view_size);
        }

        if !view_size.is_empty() && self.fitted_region != Some(card.map_region) {
            self.view = MapView::fit_region(&card.map_region, view_size);
            self.fitted_region = Some(card.map_region);
        }

        self.handle_navigation(ui, rect, &response);
        self.request_missing_tiles();
        self.draw(ui, rect, card);
        self.show_attribution(ui, rect);
    }

    fn handle_navigation(&mut self, ui: &Ui, rect: egui::Rect, response: &egui::Response) {
        if response.dragged() {
            let delta = response.drag_delta();
            if delta != egui::Vec2::ZERO {
                let from = Point2::new(0.0, 0.0);
                let to = Point2::new(delta.x as f64, delta.y as f64);
                self.view = self.view.translate_by_pixels(from, to);
            }
        }

        if response.hovered() {
            let scroll: f64 = ui.input(|input| {
                input
                    .events
                    .iter()
                    .map(|event| match event {
                        egui::Event::MouseWheel { delta, .. } => delta.y as f64,
                        _ => 0.0,
                    })
                    .sum()
            });

            if scroll.abs() >= 0.0001 {
                let base_point = response
                    .hover_pos()
                    .map(|pos| {
                        Point2::new((pos.x - rect.left()) as f64, (pos.y - rect.top()) as f64)
                    })
                    .unwrap_or_else(|| {
                        Point2::new(rect.width() as f64 / 2.0, rect.height() as f64 / 2.0)
                    });

                let zoom = (1.0 + ZOOM_SPEED).powf(-scroll);
                self.view = clamp_resolution(self.view.zoom(zoom, base_point));
            }
        }
    }

    fn request_missing_tiles(&self) {
        let Some(iter) = self.tile_schema.iter_tiles(&self.view) else {
            return;
        };

        for index in iter {
            if self.tiles.get(&index).is_some() {
                continue;
            }

            let fetcher = self.fetcher.clone();
            let tiles = self.tiles.clone();
            let messenger = self.messenger();
            wherewise::async_runtime::spawn(async move {
                load_tile(index, fetcher, tiles, messenger).await;
            });
        }
    }

    fn draw(&self, ui: &Ui, rect: egui::Rect, card: &LocationCard) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, egui::CornerRadius::ZERO, Color32::from_gray(230));

        if let Some(iter) = self.tile_schema.iter_tiles(&self.view) {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            for index in iter {
                let Some(state) = self.tiles.get(&index) else {
                    continue;
                };

                let texture = match &*state {
                    TileState::Rendered(texture) => texture.clone(),
                    TileState::Loaded(image) => self.upload_tile(index, image),
                    _ => continue,
                };

                let Some(tile_rect) = tile_screen_rect(&self.tile_schema, &self.view, index)
                else {
                    continue;
                };

                let screen_rect = tile_rect.translate(rect.left_top().to_vec2());
                painter.image(texture.id(), screen_rect, uv, Color32::WHITE);
            }
        }

        self.draw_marker(&painter, rect, &card.marker);
    }

    /// Moves a decoded tile into a GPU texture and caches the handle.
    fn upload_tile(&self, index: TileIndex, image: &DecodedImage) -> egui::TextureHandle {
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.bytes());
        let texture = self.context.load_texture(
            format!("tile-{}-{}-{}", index.z, index.x, index.y),
            color_image,
            egui::TextureOptions::LINEAR,
        );

        self.tiles
            .insert(index, Arc::new(TileState::Rendered(texture.clone())));
        texture
    }

    fn draw_marker(&self, painter: &egui::Painter, rect: egui::Rect, marker: &Marker) {
        let screen = self.view.geo_to_screen(marker.position);
        let pin = egui::pos2(rect.left() + screen.x as f32, rect.top() + screen.y as f32);

        if !rect.contains(pin) {
            return;
        }

        painter.circle_filled(pin, 7.0, Color32::from_rgb(219, 68, 55));
        painter.circle_stroke(pin, 7.0, egui::Stroke::new(2.0, Color32::WHITE));

        let galley = painter.layout_no_wrap(
            marker.title.clone(),
            egui::FontId::proportional(12.0),
            Color32::BLACK,
        );
        let text_pos = egui::pos2(pin.x - galley.size().x / 2.0, pin.y - galley.size().y - 12.0);
        let background = egui::Rect::from_min_size(text_pos, galley.size()).expand(3.0);
        painter.rect_filled(
            background,
            egui::CornerRadius::same(3),
            Color32::from_white_alpha(230),
        );
        painter.galley(text_pos, galley, Color32::BLACK);
    }

    fn show_attribution(&self, ui: &Ui, rect: egui::Rect) {
        let Some(attribution) = self.fetcher.attribution() else {
            return;
        };

        egui::Area::new(ui.id().with("map_attribution"))
            .fixed_pos(rect.right_bottom() - egui::vec2(4.0, 4.0))
            .pivot(egui::Align2::RIGHT_BOTTOM)
            .show(ui.ctx(), |ui| match attribution.url() {
                Some(url) => {
                    ui.hyperlink_to(attribution.text(), url);
                }
                None => {
                    ui.label(attribution.text());
                }
            });
    }
}

async fn load_tile(
    index: TileIndex,
    fetcher: Arc<TileFetcher>,
    tiles: Arc<Cache<TileIndex, Arc<TileState>>>,
    messenger: MapStateMessenger,
) {
    match tiles.get_value_or_guard_async(&index).await {
        Ok(_) => {}
        Err(guard) => {
            let _ = guard.insert(Arc::new(TileState::Loading));

            match fetcher.load(index).await {
                Ok(image) => {
                    tiles.insert(index, Arc::new(TileState::Loaded(image)));
                    messenger.request_redraw();
                }
                Err(error) => {
                    log::debug!("Failed to load tile {index:?}: {error}");
                    tiles.insert(index, Arc::new(TileState::Error));
                }
            }
        }
    }
}

fn clamp_resolution(view: MapView) -> MapView {
    if view.resolution() < MIN_RESOLUTION {
        view.with_resolution(MIN_RESOLUTION)
    } else if view.resolution() > MAX_RESOLUTION {
        view.with_resolution(MAX_RESOLUTION)
    } else {
        view
    }
}

fn tile_screen_rect(schema: &TileSchema, view: &MapView, index: TileIndex) -> Option<egui::Rect> {
    let bbox = schema.tile_bbox(index)?;
    let top_left = view.map_to_screen(Point2::new(bbox.x_min(), bbox.y_max()));
    let bottom_right = view.map_to_screen(Point2::new(bbox.x_max(), bbox.y_min()));

    Some(egui::Rect::from_min_max(
        egui::pos2(top_left.x as f32, top_left.y as f32),
        egui::pos2(bottom_right.x as f32, bottom_right.y as f32),
    ))
}

/// Wakes the egui event loop when the application state changes.
///
/// Repaint requests are coalesced: once a repaint is pending, further
/// requests only keep the flag raised until the next frame clears it.
#[derive(Debug, Clone)]
pub struct MapStateMessenger {
    pub(crate) context: egui::Context,
    pub(crate) requires_redraw: Arc<AtomicBool>,
}

impl Messenger for MapStateMessenger {
    fn request_redraw(&self) {
        log::trace!("Redraw requested");
        if !self.requires_redraw.swap(true, Ordering::Relaxed) {
            self.context.request_repaint();
        }
    }
}
