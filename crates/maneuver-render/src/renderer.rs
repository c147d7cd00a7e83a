//! Renderer trait abstraction.

use kurbo::Size;
use maneuver_core::direction_arrow::DirectionArrows;
use maneuver_core::interaction::InteractionController;
use maneuver_core::scene::Scene;
use maneuver_core::session::Session;
use peniko::Color;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("No render surface: the canvas size is unknown")]
    SurfaceMissing,
}

pub type RenderResult<T> = Result<T, RendererError>;

/// Everything needed to draw one frame.
pub struct RenderContext<'a> {
    pub scene: &'a Scene,
    pub arrows: &'a DirectionArrows,
    pub controller: &'a InteractionController,
    /// Size of the drawing surface; `None` until the surface exists.
    pub canvas_size: Option<Size>,
    /// Color of the course label and tool outlines.
    pub ink_color: Color,
    pub label_font_size: f64,
    /// Line width of tool outlines.
    pub line_width: f64,
}

/// Identifies the inputs of a frame. Equal keys draw the same frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameKey {
    scene: u64,
    arrows: u64,
    controller: u64,
    canvas_size: Option<Size>,
    ink: [u8; 4],
    label_font_size: f64,
    line_width: f64,
}

impl<'a> RenderContext<'a> {
    pub fn new(scene: &'a Scene, arrows: &'a DirectionArrows, controller: &'a InteractionController) -> Self {
        Self {
            scene,
            arrows,
            controller,
            canvas_size: None,
            ink_color: Color::BLACK,
            label_font_size: 36.0,
            line_width: 1.0,
        }
    }

    /// Context for a session, sized to its canvas.
    pub fn from_session(session: &'a Session) -> Self {
        Self::new(session.scene(), session.arrows(), session.controller())
            .with_canvas_size(Some(session.canvas_size()))
    }

    pub fn with_canvas_size(mut self, size: Option<Size>) -> Self {
        self.canvas_size = size;
        self
    }

    pub fn with_ink(mut self, color: Color) -> Self {
        self.ink_color = color;
        self
    }

    pub fn with_label_font_size(mut self, size: f64) -> Self {
        self.label_font_size = size;
        self
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    pub fn frame_key(&self) -> FrameKey {
        let ink = self.ink_color.to_rgba8();
        FrameKey {
            scene: self.scene.revision(),
            arrows: self.arrows.revision(),
            controller: self.controller.revision(),
            canvas_size: self.canvas_size,
            ink: [ink.r, ink.g, ink.b, ink.a],
            label_font_size: self.label_font_size,
            line_width: self.line_width,
        }
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Prepare the drawing commands for a frame.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;
}
