//! A plotting session: scene, arrows, background and the interaction controller.

use crate::config::PlotterConfig;
use crate::direction_arrow::DirectionArrows;
use crate::document::{BackgroundImage, DocumentResult, GeneralSettings, ManeuverDocument};
use crate::input::{KeyEvent, PointerEvent};
use crate::interaction::InteractionController;
use crate::scene::Scene;
use crate::storage::{BoxFuture, Storage, StorageResult};
use image::ImageReader;
use kurbo::Size;
use std::io::Cursor;

/// A background image with its decoded bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    image: BackgroundImage,
    bytes: Vec<u8>,
    pixel_size: Option<Size>,
}

impl Background {
    /// Decode the image payload and read its dimensions from the header.
    ///
    /// Formats the header reader does not know get no size; pass one with
    /// [`Background::with_pixel_size`].
    pub fn new(image: BackgroundImage) -> DocumentResult<Self> {
        let bytes = image.decode()?;
        let pixel_size = image_size(&bytes);
        Ok(Self {
            image,
            bytes,
            pixel_size,
        })
    }

    pub fn with_pixel_size(mut self, size: Size) -> Self {
        self.pixel_size = Some(size);
        self
    }

    pub fn image(&self) -> &BackgroundImage {
        &self.image
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn pixel_size(&self) -> Option<Size> {
        self.pixel_size
    }
}

fn image_size(bytes: &[u8]) -> Option<Size> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format().ok()?;
    match reader.into_dimensions() {
        Ok((width, height)) => Some(Size::new(f64::from(width), f64::from(height))),
        Err(e) => {
            log::warn!("Could not read background image size: {e}");
            None
        }
    }
}

/// Scale an image to fit the viewport, shrunk by `ratio`.
pub fn fit_to_viewport(image: Size, viewport: Size, ratio: f64) -> Size {
    let scale = (viewport.width / image.width).min(viewport.height / image.height) * ratio;
    Size::new(
        viewport.width.min(image.width * scale),
        viewport.height.min(image.height * scale),
    )
}

/// Identifies one load request. Only the newest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Everything a plot window needs, minus the drawing.
#[derive(Debug, Clone)]
pub struct Session {
    config: PlotterConfig,
    scene: Scene,
    arrows: DirectionArrows,
    background: Option<Background>,
    controller: InteractionController,
    viewport: Size,
    load_generation: u64,
}

impl Session {
    pub fn new(viewport: Size) -> Self {
        Self::with_config(viewport, PlotterConfig::default())
    }

    pub fn with_config(viewport: Size, config: PlotterConfig) -> Self {
        let canvas = viewport * config.canvas_fill_ratio;
        Self {
            scene: Scene::with_defaults(canvas, &config.identity),
            arrows: DirectionArrows::new(),
            background: None,
            controller: InteractionController::new(&config),
            viewport,
            load_generation: 0,
            config,
        }
    }

    pub fn config(&self) -> &PlotterConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn arrows(&self) -> &DirectionArrows {
        &self.arrows
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn canvas_size(&self) -> Size {
        self.scene.canvas_size()
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.refit_canvas();
    }

    pub fn set_background(&mut self, background: Option<Background>) {
        self.background = background;
        self.refit_canvas();
    }

    fn refit_canvas(&mut self) {
        let canvas = match self.background.as_ref().and_then(Background::pixel_size) {
            Some(image) => fit_to_viewport(image, self.viewport, self.config.background_fit_ratio),
            None => self.viewport * self.config.canvas_fill_ratio,
        };
        if canvas.width <= 0.0 || canvas.height <= 0.0 {
            log::warn!("Ignoring degenerate canvas size {canvas:?}");
            return;
        }
        self.scene.set_canvas_size(canvas);
    }

    pub fn handle_pointer_event(&mut self, event: &PointerEvent) -> bool {
        self.controller.handle_pointer_event(&mut self.scene, event)
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) -> bool {
        self.controller.handle_key_event(&mut self.scene, event)
    }

    pub fn update_arrow(&mut self, label: &str, direction: f64, strength: f64) -> bool {
        self.arrows.update_arrow(label, direction, strength)
    }

    /// Changes whenever anything visible changes.
    pub fn revision(&self) -> u64 {
        self.scene.revision() + self.arrows.revision() + self.controller.revision()
    }

    pub fn to_document(&self) -> ManeuverDocument {
        ManeuverDocument {
            general: GeneralSettings {
                bg_image: self.background.as_ref().map(|bg| bg.image.clone()),
                ship_stroke_color: self.scene.identity_color().clone(),
            },
            ship_data: self.scene.to_persisted(),
            direction_arrows: self.arrows.arrows().to_vec(),
        }
    }

    /// Replace the whole session state with `document`.
    ///
    /// The background image is decoded first; if that fails nothing changes.
    pub fn apply_document(&mut self, document: ManeuverDocument) -> DocumentResult<()> {
        let ManeuverDocument {
            general,
            ship_data,
            direction_arrows,
        } = document;
        let background = general.bg_image.map(Background::new).transpose()?;

        self.controller.reset();
        self.scene.load_persisted(ship_data);
        self.scene.set_identity_color(general.ship_stroke_color);
        self.arrows.load(direction_arrows);
        self.set_background(background);
        log::info!("Applied maneuver document with {} ships", self.scene.len());
        Ok(())
    }

    pub fn load_json(&mut self, json: &str) -> DocumentResult<()> {
        let document = ManeuverDocument::from_json(json)?;
        self.apply_document(document)
    }

    /// Start a load. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket {
            generation: self.load_generation,
        }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.load_generation
    }

    /// Apply the file contents read for `ticket`.
    ///
    /// Returns `Ok(false)` without touching anything when a newer load has
    /// started since the ticket was issued.
    pub fn finish_load(&mut self, ticket: LoadTicket, json: &str) -> DocumentResult<bool> {
        if !self.accept_ticket(ticket) {
            return Ok(false);
        }
        self.load_json(json)?;
        Ok(true)
    }

    /// Like [`Session::finish_load`], for a document that is already decoded.
    pub fn finish_load_document(&mut self, ticket: LoadTicket, document: ManeuverDocument) -> DocumentResult<bool> {
        if !self.accept_ticket(ticket) {
            return Ok(false);
        }
        self.apply_document(document)?;
        Ok(true)
    }

    fn accept_ticket(&self, ticket: LoadTicket) -> bool {
        if self.is_current(ticket) {
            return true;
        }
        log::warn!(
            "Dropping stale load {} (current is {})",
            ticket.generation,
            self.load_generation
        );
        false
    }

    /// Save the current plot under `name`.
    pub async fn save_to(&self, storage: &dyn Storage, name: &str) -> StorageResult<()> {
        let document = self.to_document();
        storage.save(name, &document).await?;
        log::info!("Saved maneuver {name}");
        Ok(())
    }

    /// Start loading `name` from `storage`.
    ///
    /// The returned future borrows only the storage, so a newer load may be
    /// requested before it resolves. Hand its result to
    /// [`Session::finish_load_document`] with the ticket.
    pub fn request_load<'s>(
        &mut self,
        storage: &'s dyn Storage,
        name: &str,
    ) -> (LoadTicket, BoxFuture<'s, StorageResult<ManeuverDocument>>) {
        (self.begin_load(), storage.load(name))
    }

    /// Load `name` and apply it. Returns `Ok(false)` if a newer load won.
    pub async fn load_from(&mut self, storage: &dyn Storage, name: &str) -> StorageResult<bool> {
        let (ticket, pending) = self.request_load(storage, name);
        let document = pending.await?;
        Ok(self.finish_load_document(ticket, document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HexColor;
    use crate::input::Modifiers;
    use crate::storage::{MemoryStorage, StorageError, block_on};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use kurbo::Point;

    const VIEWPORT: Size = Size::new(1000.0, 800.0);

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), format)
            .unwrap();
        bytes
    }

    fn assert_wide_fit(session: &Session) {
        let canvas = session.canvas_size();
        assert!((canvas.width - 990.0).abs() < 1e-9);
        assert!((canvas.height - 495.0).abs() < 1e-9);
    }

    #[test]
    fn test_canvas_fills_viewport_without_background() {
        let session = Session::new(VIEWPORT);
        assert_eq!(session.canvas_size(), Size::new(950.0, 760.0));
    }

    #[test]
    fn test_fit_to_viewport() {
        let fitted = fit_to_viewport(Size::new(2000.0, 1000.0), VIEWPORT, 0.99);
        assert!((fitted.width - 990.0).abs() < 1e-9);
        assert!((fitted.height - 495.0).abs() < 1e-9);

        let small = fit_to_viewport(Size::new(100.0, 400.0), VIEWPORT, 0.99);
        assert!((small.height - 792.0).abs() < 1e-9);
        assert!((small.width - 198.0).abs() < 1e-9);
    }

    #[test]
    fn test_png_background_sets_canvas() {
        let mut session = Session::new(VIEWPORT);
        let image = BackgroundImage::from_bytes(&encoded(4, 2, ImageFormat::Png), "image/png", "png");
        let background = Background::new(image).unwrap();
        assert_eq!(background.pixel_size(), Some(Size::new(4.0, 2.0)));

        session.set_background(Some(background));
        assert_wide_fit(&session);

        session.set_background(None);
        assert_eq!(session.canvas_size(), Size::new(950.0, 760.0));
    }

    #[test]
    fn test_jpeg_background_sets_canvas() {
        let mut session = Session::new(VIEWPORT);
        let image = BackgroundImage::from_bytes(&encoded(8, 4, ImageFormat::Jpeg), "image/jpeg", "jpg");
        let background = Background::new(image).unwrap();
        assert_eq!(background.pixel_size(), Some(Size::new(8.0, 4.0)));

        session.set_background(Some(background));
        assert_wide_fit(&session);
    }

    #[test]
    fn test_webp_background_sets_canvas() {
        let mut session = Session::new(VIEWPORT);
        let image = BackgroundImage::from_bytes(&encoded(6, 3, ImageFormat::WebP), "image/webp", "webp");
        let background = Background::new(image).unwrap();
        assert_eq!(background.pixel_size(), Some(Size::new(6.0, 3.0)));

        session.set_background(Some(background));
        assert_wide_fit(&session);
    }

    #[test]
    fn test_unreadable_image_uses_given_size() {
        let mut session = Session::new(VIEWPORT);
        let image = BackgroundImage::from_bytes(b"not an image", "image/x-unknown", "bin");
        let background = Background::new(image).unwrap();
        assert_eq!(background.pixel_size(), None);

        session.set_background(Some(background.with_pixel_size(Size::new(2000.0, 1000.0))));
        assert_wide_fit(&session);
    }

    #[test]
    fn test_document_round_trip() {
        let mut session = Session::new(VIEWPORT);
        session.scene_mut().add_ship();
        session.scene_mut().set_identity_color(HexColor::parse("#123456").unwrap());
        session.update_arrow("Wind", 45.0, 25.0);
        let image = BackgroundImage::from_bytes(b"raw", "image/jpeg", "jpg");
        session.set_background(Some(Background::new(image).unwrap()));

        let json = session.to_document().to_json().unwrap();

        let mut restored = Session::new(Size::new(640.0, 480.0));
        restored.load_json(&json).unwrap();

        assert_eq!(restored.scene().len(), 2);
        assert_eq!(restored.scene().identity_color().as_str(), "#123456");
        assert_eq!(restored.arrows().get("Wind").unwrap().strength, 25.0);
        assert_eq!(restored.background().unwrap().bytes(), b"raw");
        assert_eq!(restored.to_document(), session.to_document());
    }

    #[test]
    fn test_bad_background_leaves_session_untouched() {
        let mut session = Session::new(VIEWPORT);
        let mut document = session.to_document();
        document.ship_data.ships.clear();
        document.general.bg_image = Some(BackgroundImage {
            content: "@@@".into(),
            mime_type: "image/png".into(),
            extension: "png".into(),
        });

        let revision = session.revision();
        assert!(session.apply_document(document).is_err());
        assert_eq!(session.revision(), revision);
        assert_eq!(session.scene().len(), 1);
    }

    #[test]
    fn test_stale_load_is_dropped() {
        let mut source = Session::new(VIEWPORT);
        source.scene_mut().add_ship();
        let json = source.to_document().to_json().unwrap();

        let mut session = Session::new(VIEWPORT);
        let first = session.begin_load();
        let second = session.begin_load();

        assert!(!session.finish_load(first, &json).unwrap());
        assert_eq!(session.scene().len(), 1);

        assert!(session.finish_load(second, &json).unwrap());
        assert_eq!(session.scene().len(), 2);
    }

    #[test]
    fn test_invalid_load_is_rejected() {
        let mut session = Session::new(VIEWPORT);
        let ticket = session.begin_load();
        assert!(session.finish_load(ticket, r#"{"general": {}}"#).is_err());
        assert_eq!(session.scene().len(), 1);
    }

    #[test]
    fn test_load_cancels_gesture() {
        let mut session = Session::new(VIEWPORT);
        let center = session.scene().ships()[0].origin();
        let down = PointerEvent::Down {
            position: center,
            modifiers: Some(Modifiers::default()),
        };
        session.handle_pointer_event(&down);
        session.handle_pointer_event(&down);
        assert!(!session.controller().state().is_idle());

        let json = session.to_document().to_json().unwrap();
        session.load_json(&json).unwrap();
        assert!(session.controller().state().is_idle());
        assert!(!session.handle_pointer_event(&PointerEvent::Move {
            position: Point::new(10.0, 10.0)
        }));
    }

    #[test]
    fn test_save_and_load_through_storage() {
        let storage = MemoryStorage::new();
        let mut source = Session::new(VIEWPORT);
        source.scene_mut().add_ship();
        source.update_arrow("Current", 200.0, 3.0);
        block_on(source.save_to(&storage, "harbour")).unwrap();

        let mut session = Session::new(VIEWPORT);
        assert!(block_on(session.load_from(&storage, "harbour")).unwrap());
        assert_eq!(session.to_document(), source.to_document());
    }

    #[test]
    fn test_load_missing_name_keeps_session() {
        let storage = MemoryStorage::new();
        let mut session = Session::new(VIEWPORT);
        let revision = session.revision();

        let result = block_on(session.load_from(&storage, "nowhere"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert_eq!(session.revision(), revision);
    }

    #[test]
    fn test_overlapping_storage_loads_keep_newest() {
        let storage = MemoryStorage::new();
        let mut two_ships = Session::new(VIEWPORT);
        two_ships.scene_mut().add_ship();
        block_on(two_ships.save_to(&storage, "two")).unwrap();
        let mut three_ships = Session::new(VIEWPORT);
        three_ships.scene_mut().add_ship();
        three_ships.scene_mut().add_ship();
        block_on(three_ships.save_to(&storage, "three")).unwrap();

        let mut session = Session::new(VIEWPORT);
        let (older, older_load) = session.request_load(&storage, "two");
        let (newer, newer_load) = session.request_load(&storage, "three");

        let newer_doc = block_on(newer_load).unwrap();
        assert!(session.finish_load_document(newer, newer_doc).unwrap());
        let older_doc = block_on(older_load).unwrap();
        assert!(!session.finish_load_document(older, older_doc).unwrap());

        assert_eq!(session.scene().len(), 3);
    }
}
