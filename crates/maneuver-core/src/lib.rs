//! Maneuver plotter core library.
//!
//! Platform-agnostic ship geometry, scene state, gesture handling and
//! persistence for drawing vessel maneuvers on a canvas.

pub mod color;
pub mod config;
pub mod direction_arrow;
pub mod document;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod scene;
pub mod session;
pub mod ship;
pub mod storage;

pub use color::{ColorError, HexColor};
pub use config::PlotterConfig;
pub use direction_arrow::{ArrowSymbol, DirectionArrow, DirectionArrows, RelativeArrow};
pub use document::{BackgroundImage, DocumentError, ManeuverDocument};
pub use geometry::Line;
pub use input::{Key, KeyEvent, Modifiers, PointerEvent};
pub use interaction::{GestureState, InteractionController, PointerDownOutcome, ToolGeometry};
pub use scene::{Scene, SceneError, ShipData};
pub use session::{Background, LoadTicket, Session};
pub use ship::{PersistedShip, Ship, ShipId, ShipPosition};
pub use storage::{MemoryStorage, Storage, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
