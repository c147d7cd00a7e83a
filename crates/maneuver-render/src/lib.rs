//! Maneuver plotter render library.
//!
//! Turns a session's ships, tools and direction arrows into a display list
//! that a drawing backend replays.

mod display_list;
mod renderer;

pub use display_list::{
    Command, DisplayList, DisplayListRenderer, DrawCommand, Paint, TextAlign, TextBaseline, TextCommand,
    build_display_list, course_label, push_arrow_badge,
};
pub use renderer::{FrameKey, RenderContext, RenderResult, Renderer, RendererError};
