//! Gesture state machine for selecting, panning, rotating and deleting ships.
//!
//! The selected ship gets two concentric tools around its origin: a pan
//! handle disc and a rotate ring outside it. Pointer-down decides which one
//! (if any) the gesture uses; moves then edit the ship through the [`Scene`].

use crate::config::{PlotterConfig, ToolProportions};
use crate::geometry::{Line, angle_between, closest_point_on_line, normalize_degrees, point_in_triangle};
use crate::input::{Key, KeyEvent, Modifiers, PointerEvent};
use crate::scene::Scene;
use crate::ship::{MovementAxis, Ship, ShipId, find_clicked_ship};
use kurbo::{Point, Vec2};

/// Where the tip of an axis indicator sits, as a share of the pan radius.
const INDICATOR_REACH: f64 = 0.95;

/// Radii of the selected ship's tools, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolGeometry {
    pub center: Point,
    pub pan_radius: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl ToolGeometry {
    pub fn for_ship(ship: &Ship, proportions: &ToolProportions, scale: f64) -> Self {
        let pan_radius = ship.length * proportions.pan_radius * scale;
        let inner_radius = pan_radius * proportions.ring_gap;
        let outer_radius = inner_radius + ship.length * proportions.ring_width * scale;
        Self {
            center: ship.origin(),
            pan_radius,
            inner_radius,
            outer_radius,
        }
    }

    pub fn ring_width(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    /// Whether a point is anywhere on the tools.
    pub fn contains_tools(&self, point: Point) -> bool {
        self.center.distance(point) <= self.outer_radius
    }

    pub fn in_pan_handle(&self, point: Point) -> bool {
        self.center.distance(point) <= self.pan_radius
    }

    pub fn in_rotate_ring(&self, point: Point) -> bool {
        let distance = self.center.distance(point);
        distance >= self.inner_radius && distance <= self.outer_radius
    }
}

/// Direction an axis indicator points to, in the ship's own frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    /// Towards the tapered end.
    Ahead,
    Astern,
    Port,
    Starboard,
}

impl AxisDirection {
    pub const ALL: [AxisDirection; 4] = [
        AxisDirection::Ahead,
        AxisDirection::Astern,
        AxisDirection::Port,
        AxisDirection::Starboard,
    ];

    pub fn axis(self) -> MovementAxis {
        match self {
            AxisDirection::Ahead | AxisDirection::Astern => MovementAxis::Heading,
            AxisDirection::Port | AxisDirection::Starboard => MovementAxis::Beam,
        }
    }

    fn local_unit(self) -> Vec2 {
        match self {
            AxisDirection::Ahead => Vec2::new(0.0, 1.0),
            AxisDirection::Astern => Vec2::new(0.0, -1.0),
            AxisDirection::Port => Vec2::new(1.0, 0.0),
            AxisDirection::Starboard => Vec2::new(-1.0, 0.0),
        }
    }
}

/// A small triangle inside the pan handle that starts an axis-locked drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisIndicator {
    pub direction: AxisDirection,
    /// Tip first, then the two base corners, in canvas pixels.
    pub vertices: [Point; 3],
}

impl AxisIndicator {
    pub fn contains(&self, point: Point) -> bool {
        let [a, b, c] = self.vertices;
        point_in_triangle(point, a, b, c)
    }
}

/// The four axis indicators of a ship.
pub fn axis_indicators(ship: &Ship, tools: &ToolGeometry, proportions: &ToolProportions) -> [AxisIndicator; 4] {
    let size = tools.pan_radius * proportions.axis_indicator;
    let reach = tools.pan_radius * INDICATOR_REACH;
    let transform = ship.transform();

    AxisDirection::ALL.map(|direction| {
        let unit = direction.local_unit();
        let across = Vec2::new(-unit.y, unit.x) * (size / 2.0);
        let tip = (unit * reach).to_point();
        let base = unit * (reach - size);
        AxisIndicator {
            direction,
            vertices: [
                transform * tip,
                transform * (base + across).to_point(),
                transform * (base - across).to_point(),
            ],
        }
    })
}

/// Current gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Panning {
        ship_id: ShipId,
        hold: Point,
        axis_lock: Option<Line>,
    },
    Rotating {
        ship_id: ShipId,
        hold: Point,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }
}

/// What a pointer-down did.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerDownOutcome {
    /// Selection changed to this ship, or was cleared.
    Selected(Option<ShipId>),
    PanStarted {
        ship_id: ShipId,
        duplicated: bool,
        axis: Option<MovementAxis>,
    },
    RotateStarted {
        ship_id: ShipId,
    },
}

/// Drives the scene from pointer and key events.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: GestureState,
    modifiers: Modifiers,
    proportions: ToolProportions,
    tool_scale: f64,
    axis_lock_enabled: bool,
    /// Bumped when a setting that changes how tools are drawn changes.
    revision: u64,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(&PlotterConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: &PlotterConfig) -> Self {
        Self {
            state: GestureState::Idle,
            modifiers: Modifiers::default(),
            proportions: config.tools,
            tool_scale: config.tool_scale,
            axis_lock_enabled: config.axis_lock,
            revision: 0,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn proportions(&self) -> &ToolProportions {
        &self.proportions
    }

    pub fn tool_scale(&self) -> f64 {
        self.tool_scale
    }

    /// Zoom factor for the tool geometry.
    pub fn set_tool_scale(&mut self, scale: f64) {
        if scale.is_nan() || scale <= 0.0 {
            log::warn!("Ignoring non-positive tool scale {scale}");
            return;
        }
        if scale != self.tool_scale {
            self.tool_scale = scale;
            self.revision += 1;
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn axis_lock_enabled(&self) -> bool {
        self.axis_lock_enabled
    }

    /// Drop any gesture in progress.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Tools of the selected ship, if any.
    pub fn tool_geometry(&self, scene: &Scene) -> Option<ToolGeometry> {
        scene
            .selected_ship()
            .map(|ship| ToolGeometry::for_ship(&ship, &self.proportions, self.tool_scale))
    }

    /// Axis indicators of the selected ship. Empty when axis lock is off.
    pub fn axis_indicators(&self, scene: &Scene) -> Vec<AxisIndicator> {
        if !self.axis_lock_enabled {
            return Vec::new();
        }
        scene.selected_ship().map_or_else(Vec::new, |ship| {
            let tools = ToolGeometry::for_ship(&ship, &self.proportions, self.tool_scale);
            axis_indicators(&ship, &tools, &self.proportions).to_vec()
        })
    }

    /// Dispatch a pointer event. Returns whether the scene changed.
    pub fn handle_pointer_event(&mut self, scene: &mut Scene, event: &PointerEvent) -> bool {
        let before = scene.revision();
        match *event {
            PointerEvent::Down { position, modifiers } => {
                if let Some(modifiers) = modifiers {
                    self.modifiers = modifiers;
                }
                self.pointer_down(scene, position);
            }
            PointerEvent::Move { position } => {
                self.pointer_move(scene, position);
            }
            PointerEvent::Up { position } => {
                self.pointer_up(scene, position);
            }
        }
        scene.revision() != before
    }

    /// Dispatch a key event. Returns whether the scene changed.
    pub fn handle_key_event(&mut self, scene: &mut Scene, event: &KeyEvent) -> bool {
        self.modifiers.apply_key(event);

        match event {
            KeyEvent::Released(Key::Delete) => self.delete_selected(scene),
            _ => false,
        }
    }

    pub fn pointer_down(&mut self, scene: &mut Scene, position: Point) -> PointerDownOutcome {
        let Some(selected) = scene.selected_ship() else {
            return self.select_at(scene, position);
        };

        let tools = ToolGeometry::for_ship(&selected, &self.proportions, self.tool_scale);
        if !tools.contains_tools(position) {
            return self.select_at(scene, position);
        }

        if tools.in_pan_handle(position) {
            let axis = if self.axis_lock_enabled {
                axis_indicators(&selected, &tools, &self.proportions)
                    .iter()
                    .find(|indicator| indicator.contains(position))
                    .map(|indicator| indicator.direction.axis())
            } else {
                None
            };

            let duplicated = self.modifiers.shift;
            let target = if duplicated {
                let copy = scene.add_copy_of_ship(&selected);
                scene.select_ship(Some(&copy.id));
                copy
            } else {
                selected
            };

            log::debug!("Pan started on ship {} (axis {axis:?}, duplicate {duplicated})", target.id);
            self.state = GestureState::Panning {
                ship_id: target.id.clone(),
                hold: position,
                axis_lock: axis.map(|axis| target.axis_line(axis)),
            };
            return PointerDownOutcome::PanStarted {
                ship_id: target.id,
                duplicated,
                axis,
            };
        }

        if tools.in_rotate_ring(position) {
            log::debug!("Rotate started on ship {}", selected.id);
            self.state = GestureState::Rotating {
                ship_id: selected.id.clone(),
                hold: position,
            };
            return PointerDownOutcome::RotateStarted { ship_id: selected.id };
        }

        self.select_at(scene, position)
    }

    /// Continue the current gesture. Returns whether the ship moved.
    pub fn pointer_move(&mut self, scene: &mut Scene, position: Point) -> bool {
        self.apply_gesture(scene, position)
    }

    /// Finish the current gesture at `position`, or at the hold point when
    /// the release has no position.
    pub fn pointer_up(&mut self, scene: &mut Scene, position: Option<Point>) -> bool {
        let changed = match (position, self.hold_point()) {
            (Some(position), _) | (None, Some(position)) => self.apply_gesture(scene, position),
            (None, None) => false,
        };
        self.state = GestureState::Idle;
        changed
    }

    fn hold_point(&self) -> Option<Point> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Panning { hold, .. } | GestureState::Rotating { hold, .. } => Some(*hold),
        }
    }

    fn select_at(&mut self, scene: &mut Scene, position: Point) -> PointerDownOutcome {
        self.state = GestureState::Idle;
        let ships = scene.ships();
        let hit = find_clicked_ship(position, &ships).map(|ship| ship.id.clone());
        scene.select_ship(hit.as_deref());
        PointerDownOutcome::Selected(hit)
    }

    /// The ship the current gesture works on, or `None` (and back to idle)
    /// when it is no longer the selected ship.
    fn gesture_target(&mut self, scene: &Scene) -> Option<Ship> {
        let ship_id = match &self.state {
            GestureState::Idle => return None,
            GestureState::Panning { ship_id, .. } | GestureState::Rotating { ship_id, .. } => ship_id,
        };

        match scene.selected_ship() {
            Some(ship) if &ship.id == ship_id => Some(ship),
            _ => {
                log::debug!("Selection changed during gesture on ship {ship_id}, dropping it");
                self.state = GestureState::Idle;
                None
            }
        }
    }

    fn apply_gesture(&mut self, scene: &mut Scene, position: Point) -> bool {
        let Some(ship) = self.gesture_target(scene) else {
            return false;
        };

        let edited = match &mut self.state {
            GestureState::Idle => return false,
            GestureState::Panning { hold, axis_lock, .. } => {
                let proposed = ship.origin() + (position - *hold);
                let origin = match axis_lock {
                    Some(line) => closest_point_on_line(line, proposed),
                    None => proposed,
                };
                *hold = position;
                ship.clone().with_origin(origin)
            }
            GestureState::Rotating { hold, .. } => {
                let center = ship.origin();
                let delta = angle_between(center, position) - angle_between(center, *hold);
                *hold = position;
                let rotation = normalize_degrees(ship.rotation() + delta);
                ship.clone().with_rotation(rotation)
            }
        };

        if edited == ship {
            return false;
        }
        scene.edit_ship(&ship.id, edited).is_ok()
    }

    fn delete_selected(&mut self, scene: &mut Scene) -> bool {
        let Some(id) = scene.selected_ship_id().map(str::to_string) else {
            return false;
        };
        self.state = GestureState::Idle;
        scene.remove_ship(&id).is_some()
    }
}
