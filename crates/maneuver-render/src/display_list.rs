//! Frame contents as an ordered list of paths and labels.
//!
//! Backends replay the list in order; nothing here talks to a GPU.

use crate::renderer::{FrameKey, RenderContext, RenderResult, Renderer, RendererError};
use kurbo::{Affine, BezPath, Circle, Point, Shape};
use maneuver_core::color::HexColor;
use maneuver_core::direction_arrow::{ArrowSymbol, RelativeArrow};
use maneuver_core::interaction::{AxisIndicator, ToolGeometry};
use maneuver_core::ship::Ship;
use peniko::Color;

/// Ship outline stroke width.
pub const SHIP_LINE_WIDTH: f64 = 3.0;
/// Alpha of the pan handle fill.
pub const PAN_FILL_ALPHA: u8 = 0x33;
/// Alpha of the rotate ring stroke.
pub const RING_STROKE_ALPHA: u8 = 0x1A;
pub const ARROW_LINE_WIDTH: f64 = 2.0;
/// Arrow badge side as a multiple of the arrow length.
pub const BADGE_SCALE: f64 = 1.7;
pub const BADGE_MARGIN: f64 = 8.0;

const PATH_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub enum Paint {
    Fill(Color),
    Stroke { color: Color, width: f64 },
}

#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub path: BezPath,
    /// Maps the path into canvas space.
    pub transform: Affine,
    pub paint: Paint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Bottom,
}

#[derive(Debug, Clone)]
pub struct TextCommand {
    pub text: String,
    /// Anchor in canvas space.
    pub position: Point,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    pub color: Color,
    pub font_size: f64,
}

#[derive(Debug, Clone)]
pub enum Command {
    Draw(DrawCommand),
    Text(TextCommand),
}

#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<Command>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_draw(&mut self, path: BezPath, transform: Affine, paint: Paint) {
        self.commands.push(Command::Draw(DrawCommand { path, transform, paint }));
    }

    pub fn push_text(&mut self, text: TextCommand) {
        self.commands.push(Command::Text(text));
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter_map(|command| match command {
            Command::Draw(draw) => Some(draw),
            Command::Text(_) => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextCommand> {
        self.commands.iter().filter_map(|command| match command {
            Command::Text(text) => Some(text),
            Command::Draw(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn circle(radius: f64) -> BezPath {
    Circle::new(Point::ORIGIN, radius).to_path(PATH_TOLERANCE)
}

fn triangle(indicator: &AxisIndicator) -> BezPath {
    let [a, b, c] = indicator.vertices;
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    path.line_to(c);
    path.close_path();
    path
}

/// Pan handle, rotate ring and axis indicators of the selected ship.
fn push_tools(
    list: &mut DisplayList,
    ctx: &RenderContext,
    ship: &Ship,
    tools: &ToolGeometry,
    indicators: &[AxisIndicator],
    color: &HexColor,
) {
    let transform = ship.transform();
    let outline = Paint::Stroke {
        color: ctx.ink_color,
        width: ctx.line_width,
    };

    list.push_draw(circle(tools.pan_radius), transform, Paint::Fill(color.with_alpha(PAN_FILL_ALPHA)));
    list.push_draw(circle(tools.pan_radius), transform, outline);

    let ring_width = tools.ring_width();
    list.push_draw(
        circle(tools.inner_radius + ring_width / 2.0),
        transform,
        Paint::Stroke {
            color: color.with_alpha(RING_STROKE_ALPHA),
            width: ring_width,
        },
    );
    list.push_draw(circle(tools.inner_radius), transform, outline);
    list.push_draw(circle(tools.outer_radius), transform, outline);

    for indicator in indicators {
        list.push_draw(triangle(indicator), Affine::IDENTITY, Paint::Fill(color.into()));
    }
}

/// The `NNN°` course label at the outer edge of the rotate ring.
pub fn course_label(ship: &Ship, tools: &ToolGeometry, color: Color, font_size: f64) -> TextCommand {
    let course = (ship.course_degrees().round() as u32) % 360;
    let position = ship.transform() * Point::new(0.0, tools.outer_radius);

    TextCommand {
        text: format!("{course:03}°"),
        position,
        align: if course > 180 { TextAlign::Right } else { TextAlign::Left },
        baseline: if course < 90 || course > 270 {
            TextBaseline::Bottom
        } else {
            TextBaseline::Top
        },
        color,
        font_size,
    }
}

/// Square a direction arrow is drawn in, with its compass rose.
pub fn badge_size(arrow: &RelativeArrow) -> f64 {
    arrow.length * BADGE_SCALE
}

/// One arrow with its compass ring, centered on `center`.
pub fn push_arrow_badge(list: &mut DisplayList, arrow: &RelativeArrow, center: Point, ink: Color, line_width: f64) {
    let color = arrow.color.to_color().unwrap_or_else(|| {
        log::warn!("Unknown color {} for arrow {}, drawing it in ink", arrow.color, arrow.label);
        ink
    });
    let translate = Affine::translate(center.to_vec2());

    let paint = match arrow.symbol {
        ArrowSymbol::Arrow => Paint::Fill(color),
        ArrowSymbol::Wind => Paint::Stroke {
            color,
            width: ARROW_LINE_WIDTH,
        },
    };
    list.push_draw(
        arrow.path.clone(),
        translate * Affine::rotate(arrow.direction.to_radians()),
        paint,
    );

    let radius = badge_size(arrow) * 0.45;
    let outline = Paint::Stroke {
        color: ink,
        width: line_width,
    };
    list.push_draw(circle(radius), translate, outline);

    let tick = (radius * 0.1).max(4.0);
    for angle in (0..360).step_by(15) {
        let length = if angle % 45 == 0 { tick * 1.5 } else { tick };
        let mut path = BezPath::new();
        path.move_to((0.0, radius));
        path.line_to((0.0, radius - length));
        list.push_draw(path, translate * Affine::rotate(f64::from(angle).to_radians()), outline);
    }
}

/// Build the display list for a frame.
pub fn build_display_list(ctx: &RenderContext) -> RenderResult<DisplayList> {
    let canvas = ctx.canvas_size.ok_or(RendererError::SurfaceMissing)?;
    let mut list = DisplayList::new();

    let selected = ctx.scene.selected_ship();
    let tools = ctx.controller.tool_geometry(ctx.scene);
    let indicators = ctx.controller.axis_indicators(ctx.scene);

    for ship in ctx.scene.ships() {
        let color = ctx.scene.effective_color(&ship);
        list.push_draw(
            ship.outline(),
            ship.transform(),
            Paint::Stroke {
                color: color.into(),
                width: SHIP_LINE_WIDTH,
            },
        );

        if let Some(tools) = tools.as_ref().filter(|_| ctx.scene.is_selected(&ship.id)) {
            push_tools(&mut list, ctx, &ship, tools, &indicators, color);
        }
    }

    if let (Some(ship), Some(tools)) = (selected.as_ref(), tools.as_ref()) {
        list.push_text(course_label(ship, tools, ctx.ink_color, ctx.label_font_size));
    }

    let mut x = BADGE_MARGIN;
    for arrow in ctx.arrows.relative(canvas.width) {
        let size = badge_size(&arrow);
        let center = Point::new(x + size / 2.0, BADGE_MARGIN + size / 2.0);
        push_arrow_badge(&mut list, &arrow, center, ctx.ink_color, ctx.line_width);
        x += size + BADGE_MARGIN;
    }

    Ok(list)
}

/// Keeps the last built display list and rebuilds it only when an input changed.
#[derive(Debug, Default)]
pub struct DisplayListRenderer {
    list: DisplayList,
    built_for: Option<FrameKey>,
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    pub fn needs_rebuild(&self, ctx: &RenderContext) -> bool {
        self.built_for != Some(ctx.frame_key())
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        let key = ctx.frame_key();
        if self.built_for == Some(key) {
            return Ok(());
        }
        self.list = build_display_list(ctx)?;
        self.built_for = Some(key);
        log::trace!("Built display list with {} commands", self.list.len());
        Ok(())
    }
}
