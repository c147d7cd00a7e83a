//! Ship entities, their silhouette and hit-testing.
//!
//! A ship is drawn in its own local frame: origin at the geometric center,
//! length along the local y axis, width along x. The end at local +y is
//! tapered by two chamfers and is the end the ship's rotation points to.

use crate::color::HexColor;
use crate::geometry::{Line, canvas_to_course_degrees, rotate_point, round4};
use kurbo::{Affine, BezPath, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Ship ids are string-encoded integers ("1", "2", ...).
pub type ShipId = String;

/// Chamfer size as a share of the ship width.
pub const SIDE_OFFSET_RATIO: f64 = 0.3;

/// Placement of a ship: where its center is and which way it points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipPosition {
    pub origin: Point,
    /// Canvas degrees: 0 points down the canvas, clockwise positive.
    pub rotation: f64,
}

impl ShipPosition {
    pub fn new(origin: Point, rotation: f64) -> Self {
        Self { origin, rotation }
    }
}

/// Axis of a ship that a pan gesture can be locked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementAxis {
    /// Along the ship's length.
    Heading,
    /// Across the ship.
    Beam,
}

/// A ship in canvas pixels, ready for rendering and hit-testing.
#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub id: ShipId,
    pub position: ShipPosition,
    /// Length in pixels.
    pub length: f64,
    /// Width in pixels.
    pub width: f64,
    /// Own stroke color; `None` means the identity color applies.
    pub stroke_color: Option<HexColor>,
}

impl Ship {
    pub fn new(id: impl Into<ShipId>, position: ShipPosition, length: f64, width: f64) -> Self {
        Self {
            id: id.into(),
            position,
            length,
            width,
            stroke_color: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ShipId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.position.origin = origin;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.position.rotation = rotation;
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_stroke_color(mut self, color: Option<HexColor>) -> Self {
        self.stroke_color = color;
        self
    }

    pub fn origin(&self) -> Point {
        self.position.origin
    }

    pub fn rotation(&self) -> f64 {
        self.position.rotation
    }

    /// Compass course shown next to the selected ship.
    pub fn course_degrees(&self) -> f64 {
        canvas_to_course_degrees(self.position.rotation)
    }

    pub fn side_offset(&self) -> f64 {
        self.width * SIDE_OFFSET_RATIO
    }

    pub fn length_offset(&self) -> f64 {
        self.length - self.side_offset()
    }

    pub fn width_offset(&self) -> f64 {
        self.width - self.side_offset()
    }

    /// Ship-local to canvas transform: translate to the origin, then rotate.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position.origin.to_vec2())
            * Affine::rotate(self.position.rotation.to_radians())
    }

    /// Map a canvas point into the ship's local frame.
    pub fn to_local(&self, canvas_point: Point) -> Point {
        self.transform().inverse() * canvas_point
    }

    /// Hexagon vertices in local coordinates, in drawing order.
    pub fn outline_vertices(&self) -> [Point; 6] {
        let half_width = self.width / 2.0;
        let half_length = self.length / 2.0;
        let corner = |x: f64, y: f64| Point::new(x - half_width, y - half_length);

        [
            corner(0.0, 0.0),
            corner(self.width, 0.0),
            corner(self.width, self.length_offset()),
            corner(self.width_offset(), self.length),
            corner(self.side_offset(), self.length),
            corner(0.0, self.length_offset()),
        ]
    }

    /// Closed silhouette path in local coordinates.
    pub fn outline(&self) -> BezPath {
        let vertices = self.outline_vertices();
        let mut path = BezPath::new();
        path.move_to(vertices[0]);
        for vertex in &vertices[1..] {
            path.line_to(*vertex);
        }
        path.close_path();
        path
    }

    /// Whether a point in the ship's local frame is inside the silhouette.
    pub fn contains_local(&self, local: Point) -> bool {
        let x = local.x + self.width / 2.0;
        let y = local.y + self.length / 2.0;

        let within_x = x >= 0.0 && x <= self.width;
        let within_y = y >= 0.0 && y <= self.length;
        if !(within_x && within_y) {
            return false;
        }

        let length_offset = self.length_offset();
        if y <= length_offset {
            return true;
        }

        let width_offset = self.width_offset();
        let depth = y - length_offset;
        (x <= width_offset && x >= depth) || (x > width_offset && x + depth <= self.width)
    }

    /// Whether a canvas point hits this ship.
    pub fn contains(&self, canvas_point: Point) -> bool {
        self.contains_local(self.to_local(canvas_point))
    }

    /// Line through the ship's center along one of its axes.
    pub fn axis_line(&self, axis: MovementAxis) -> Line {
        let origin = self.position.origin;
        let unit = match axis {
            MovementAxis::Heading => Vec2::new(0.0, 1.0),
            MovementAxis::Beam => Vec2::new(1.0, 0.0),
        };
        Line::new(origin, rotate_point(origin + unit, origin, self.position.rotation))
    }

    /// Fractional representation for the given canvas size.
    pub fn to_persisted(&self, canvas: Size) -> PersistedShip {
        PersistedShip {
            id: self.id.clone(),
            position: ShipPosition {
                origin: Point::new(
                    round4(self.position.origin.x / canvas.width),
                    round4(self.position.origin.y / canvas.height),
                ),
                rotation: self.position.rotation,
            },
            length: round4(self.length / canvas.width),
            width: round4(self.width / canvas.height),
            stroke_color: self.stroke_color.clone(),
        }
    }
}

/// First ship, in scene order, that contains `point`.
pub fn find_clicked_ship(point: Point, ships: &[Ship]) -> Option<&Ship> {
    ships.iter().find(|ship| ship.contains(point))
}

/// A ship stored as fractions of the canvas.
///
/// `origin.x` and `length` are fractions of the canvas width, `origin.y`
/// and `width` fractions of the canvas height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedShip {
    pub id: ShipId,
    pub position: ShipPosition,
    pub length: f64,
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<HexColor>,
}

impl PersistedShip {
    /// Pixel representation for the given canvas size.
    pub fn to_canvas(&self, canvas: Size) -> Ship {
        Ship {
            id: self.id.clone(),
            position: ShipPosition {
                origin: Point::new(
                    round4(self.position.origin.x * canvas.width),
                    round4(self.position.origin.y * canvas.height),
                ),
                rotation: self.position.rotation,
            },
            length: round4(self.length * canvas.width),
            width: round4(self.width * canvas.height),
            stroke_color: self.stroke_color.clone(),
        }
    }

    /// Whether the ship still has exactly the given identity dimensions.
    pub fn has_dimensions(&self, length: f64, width: f64) -> bool {
        self.length == length && self.width == width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_ship() -> Ship {
        Ship::new("1", ShipPosition::new(Point::new(800.0, 400.0), 0.0), 120.0, 25.0)
    }

    #[test]
    fn test_click_on_center_hits() {
        assert!(scenario_ship().contains(Point::new(800.0, 400.0)));
    }

    #[test]
    fn test_click_past_tapered_tip_misses() {
        assert!(!scenario_ship().contains(Point::new(800.0, 461.0)));
    }

    #[test]
    fn test_local_center_is_inside_for_any_placement() {
        for rotation in [0.0, 33.0, 90.0, 180.0, 271.5] {
            let ship = Ship::new("1", ShipPosition::new(Point::new(-40.0, 17.0), rotation), 90.0, 20.0);
            assert!(ship.contains_local(Point::ZERO));
            assert!(ship.contains(ship.origin()), "rotation {rotation}");
        }
    }

    #[test]
    fn test_tapered_corners_are_outside() {
        let ship = scenario_ship();
        let (hw, hl) = (ship.width / 2.0, ship.length / 2.0);

        assert!(!ship.contains_local(Point::new(-hw, hl)));
        assert!(!ship.contains_local(Point::new(hw, hl)));
        // the flat end keeps its corners
        assert!(ship.contains_local(Point::new(-hw, -hl)));
        assert!(ship.contains_local(Point::new(hw, -hl)));
    }

    #[test]
    fn test_chamfer_band() {
        let ship = scenario_ship();
        let hl = ship.length / 2.0;
        // center line near the tip is inside, the chamfered corners are not
        assert!(ship.contains_local(Point::new(0.0, hl - 1.0)));
        assert!(!ship.contains_local(Point::new(ship.width / 2.0 - 0.5, hl - 0.5)));
        assert!(!ship.contains_local(Point::new(-ship.width / 2.0 + 0.5, hl - 0.5)));
    }

    #[test]
    fn test_rotated_hit_test() {
        let ship = Ship::new("1", ShipPosition::new(Point::new(100.0, 100.0), 90.0), 120.0, 25.0);
        // rotation 90 points the tapered end towards -x
        assert!(ship.contains(Point::new(45.0, 100.0)));
        assert!(ship.contains(Point::new(155.0, 100.0)));
        assert!(!ship.contains(Point::new(100.0, 120.0)));
        assert!(!ship.contains(Point::new(35.0, 100.0)));
    }

    #[test]
    fn test_find_clicked_ship_first_match_wins() {
        let a = scenario_ship();
        let b = scenario_ship().with_id("2");
        let c = scenario_ship().with_id("3").with_origin(Point::new(100.0, 100.0));
        let ships = vec![a, b, c];

        assert_eq!(find_clicked_ship(Point::new(800.0, 400.0), &ships).map(|s| s.id.as_str()), Some("1"));
        assert_eq!(find_clicked_ship(Point::new(100.0, 100.0), &ships).map(|s| s.id.as_str()), Some("3"));
        assert!(find_clicked_ship(Point::new(0.0, 0.0), &ships).is_none());
    }

    #[test]
    fn test_outline_vertices() {
        let ship = scenario_ship();
        let v = ship.outline_vertices();
        assert_eq!(v[0], Point::new(-12.5, -60.0));
        assert_eq!(v[1], Point::new(12.5, -60.0));
        assert!((v[2].y - (-60.0 + ship.length_offset())).abs() < 1e-9);
        assert!((v[3].x - (-12.5 + ship.width_offset())).abs() < 1e-9);
        assert!((v[4].x - (-12.5 + ship.side_offset())).abs() < 1e-9);
        assert!((v[3].y - 60.0).abs() < 1e-9);
        assert_eq!(ship.outline().elements().len(), 7);
    }

    #[test]
    fn test_axis_lines() {
        let ship = scenario_ship();
        assert!(ship.axis_line(MovementAxis::Heading).is_vertical());
        assert!(ship.axis_line(MovementAxis::Beam).is_horizontal());
    }

    #[test]
    fn test_fraction_round_trip() {
        let canvas = Size::new(1600.0, 800.0);
        let ship = scenario_ship().with_stroke_color(Some(HexColor::parse("#ff0000").unwrap()));

        let persisted = ship.to_persisted(canvas);
        assert_eq!(persisted.position.origin, Point::new(0.5, 0.5));
        assert_eq!(persisted.length, 0.075);
        assert_eq!(persisted.width, round4(25.0 / 800.0));

        let back = persisted.to_canvas(canvas);
        assert_eq!(back.position.origin, ship.position.origin);
        assert!((back.length - ship.length).abs() < 1e-4 * canvas.width);
        assert_eq!(back.stroke_color, ship.stroke_color);
        assert_eq!(back.to_persisted(canvas), persisted);
    }

    #[test]
    fn test_persisted_json_shape() {
        let persisted = PersistedShip {
            id: "7".into(),
            position: ShipPosition::new(Point::new(0.25, 0.75), 45.0),
            length: 0.16,
            width: 0.036,
            stroke_color: None,
        };
        let value = serde_json::to_value(&persisted).unwrap();
        assert_eq!(value["position"]["origin"]["x"], 0.25);
        assert_eq!(value["position"]["rotation"], 45.0);
        assert!(value.get("strokeColor").is_none());
    }
}
