//! Scene store: the ships, the selection and the identity ship.
//!
//! Ships are stored as canvas fractions so the scene does not depend on the
//! current canvas resolution. Every read for drawing or hit-testing goes
//! through [`Scene::ships`], which scales them to pixels.

use crate::color::HexColor;
use crate::config::IdentityDefaults;
use crate::geometry::round4;
use crate::ship::{PersistedShip, Ship, ShipId, ShipPosition};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Rotation given to freshly added ships (tapered end towards the top).
pub const NEW_SHIP_ROTATION: f64 = 180.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("No ship with id {0}")]
    UnknownShip(ShipId),
}

/// The ship part of a saved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipData {
    pub ships: Vec<PersistedShip>,
    pub identity_length: f64,
    pub identity_width: f64,
}

/// Default dimensions and color for ships that were not customised.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityShip {
    /// Fraction of canvas width.
    pub length: f64,
    /// Fraction of canvas height.
    pub width: f64,
    pub stroke_color: HexColor,
}

/// Mutable scene state. All changes go through its methods.
#[derive(Debug, Clone)]
pub struct Scene {
    ships: Arc<Vec<PersistedShip>>,
    selected: Option<ShipId>,
    identity: IdentityShip,
    canvas_size: Size,
    /// `None` once a loaded id reached `u64::MAX`.
    next_id: Option<u64>,
    revision: u64,
}

impl Scene {
    /// Create a scene with one seed ship in the middle of the canvas.
    pub fn new(canvas_size: Size) -> Self {
        Self::with_defaults(canvas_size, &IdentityDefaults::default())
    }

    pub fn with_defaults(canvas_size: Size, defaults: &IdentityDefaults) -> Self {
        let seed = PersistedShip {
            id: "1".to_string(),
            position: ShipPosition::new(Point::new(0.5, 0.5), NEW_SHIP_ROTATION),
            length: defaults.length,
            width: defaults.width,
            stroke_color: None,
        };

        Self {
            ships: Arc::new(vec![seed]),
            selected: None,
            identity: IdentityShip {
                length: defaults.length,
                width: defaults.width,
                stroke_color: defaults.stroke_color.clone(),
            },
            canvas_size: sanitize_canvas_size(canvas_size),
            next_id: Some(2),
            revision: 0,
        }
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    /// Change the canvas size. Stored fractions are unaffected.
    pub fn set_canvas_size(&mut self, size: Size) {
        let size = sanitize_canvas_size(size);
        if size != self.canvas_size {
            self.canvas_size = size;
            self.touch();
        }
    }

    /// Increases on every mutation; renderers redraw when it changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The current immutable ship collection (fractions).
    ///
    /// Holding on to it is safe: later edits build a new collection.
    pub fn snapshot(&self) -> Arc<Vec<PersistedShip>> {
        Arc::clone(&self.ships)
    }

    pub fn persisted_ships(&self) -> &[PersistedShip] {
        &self.ships
    }

    /// All ships in canvas pixels, in scene order.
    pub fn ships(&self) -> Vec<Ship> {
        self.ships.iter().map(|ship| ship.to_canvas(self.canvas_size)).collect()
    }

    pub fn ship(&self, id: &str) -> Option<Ship> {
        self.ships
            .iter()
            .find(|ship| ship.id == id)
            .map(|ship| ship.to_canvas(self.canvas_size))
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    pub fn identity(&self) -> &IdentityShip {
        &self.identity
    }

    pub fn identity_length_px(&self) -> f64 {
        round4(self.identity.length * self.canvas_size.width)
    }

    pub fn identity_width_px(&self) -> f64 {
        round4(self.identity.width * self.canvas_size.height)
    }

    pub fn identity_color(&self) -> &HexColor {
        &self.identity.stroke_color
    }

    /// Color a ship is drawn with.
    pub fn effective_color<'a>(&'a self, ship: &'a Ship) -> &'a HexColor {
        ship.stroke_color.as_ref().unwrap_or(&self.identity.stroke_color)
    }

    fn allocate_id(&mut self) -> ShipId {
        match self.next_id {
            Some(id) => {
                self.next_id = id.checked_add(1);
                id.to_string()
            }
            None => self.lowest_free_id(),
        }
    }

    /// Smallest positive numeric id no ship uses. One of the first
    /// `len + 1` candidates is always free.
    fn lowest_free_id(&self) -> ShipId {
        let used: HashSet<u64> = self.ships.iter().filter_map(|ship| ship.id.parse().ok()).collect();
        let mut candidate: u64 = 1;
        while used.contains(&candidate) {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Add a new identity ship in the middle of the canvas.
    pub fn add_ship(&mut self) -> Ship {
        let id = self.allocate_id();
        let ship = PersistedShip {
            id,
            position: ShipPosition::new(Point::new(0.5, 0.5), NEW_SHIP_ROTATION),
            length: self.identity.length,
            width: self.identity.width,
            stroke_color: None,
        };
        log::debug!("Added ship {}", ship.id);

        let added = ship.to_canvas(self.canvas_size);
        Arc::make_mut(&mut self.ships).push(ship);
        self.touch();
        added
    }

    /// Add a copy of `source` under a fresh id. Returns the copy in pixels.
    pub fn add_copy_of_ship(&mut self, source: &Ship) -> Ship {
        let id = self.allocate_id();
        let persisted = source.clone().with_id(id).to_persisted(self.canvas_size);
        log::debug!("Copied ship {} as {}", source.id, persisted.id);

        let added = persisted.to_canvas(self.canvas_size);
        Arc::make_mut(&mut self.ships).push(persisted);
        self.touch();
        added
    }

    /// Replace the ship with `id` by `ship` (given in pixels), keeping its place in the order.
    pub fn edit_ship(&mut self, id: &str, ship: Ship) -> Result<(), SceneError> {
        let index = self
            .ships
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SceneError::UnknownShip(id.to_string()))?;

        let persisted = ship.with_id(id).to_persisted(self.canvas_size);
        Arc::make_mut(&mut self.ships)[index] = persisted;
        self.touch();
        Ok(())
    }

    /// Remove a ship. Clears the selection if it pointed at it.
    pub fn remove_ship(&mut self, id: &str) -> Option<Ship> {
        let index = self.ships.iter().position(|s| s.id == id)?;
        let removed = Arc::make_mut(&mut self.ships).remove(index);

        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        log::debug!("Removed ship {id}");
        self.touch();
        Some(removed.to_canvas(self.canvas_size))
    }

    /// Select a ship, or clear the selection with `None`.
    ///
    /// An id that is not in the scene clears the selection.
    pub fn select_ship(&mut self, id: Option<&str>) {
        let next = match id {
            Some(id) if self.ships.iter().any(|s| s.id == id) => Some(id.to_string()),
            Some(id) => {
                log::warn!("Ignoring selection of unknown ship {id}");
                None
            }
            None => None,
        };

        if next != self.selected {
            self.selected = next;
            self.touch();
        }
    }

    pub fn selected_ship_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    pub fn selected_ship(&self) -> Option<Ship> {
        self.selected.as_deref().and_then(|id| self.ship(id))
    }

    /// Length shown in the length stepper, in pixels.
    pub fn displayed_length(&self) -> f64 {
        self.selected_ship().map_or_else(|| self.identity_length_px(), |ship| ship.length)
    }

    /// Width shown in the width stepper, in pixels.
    pub fn displayed_width(&self) -> f64 {
        self.selected_ship().map_or_else(|| self.identity_width_px(), |ship| ship.width)
    }

    /// Set the length of the selected ship, or of the identity ship and
    /// every ship that still has the identity dimensions.
    ///
    /// Length is a fraction of the canvas **width**.
    pub fn adjust_ship_length(&mut self, length_px: f64) {
        let length = round4(length_px / self.canvas_size.width);
        self.adjust_dimension(length, |ship, value| ship.length = value, |identity, value| identity.length = value);
    }

    /// Set the width of the selected ship, or of the identity ship and
    /// every ship that still has the identity dimensions.
    ///
    /// Width is a fraction of the canvas **height**.
    pub fn adjust_ship_width(&mut self, width_px: f64) {
        let width = round4(width_px / self.canvas_size.height);
        self.adjust_dimension(width, |ship, value| ship.width = value, |identity, value| identity.width = value);
    }

    fn adjust_dimension(
        &mut self,
        value: f64,
        set_ship: impl Fn(&mut PersistedShip, f64),
        set_identity: impl FnOnce(&mut IdentityShip, f64),
    ) {
        match self.selected.clone() {
            Some(selected) => {
                let ships = Arc::make_mut(&mut self.ships);
                if let Some(ship) = ships.iter_mut().find(|s| s.id == selected) {
                    set_ship(ship, value);
                }
            }
            None => {
                let (length, width) = (self.identity.length, self.identity.width);
                let ships = Arc::make_mut(&mut self.ships);
                for ship in ships.iter_mut().filter(|s| s.has_dimensions(length, width)) {
                    set_ship(ship, value);
                }
                set_identity(&mut self.identity, value);
            }
        }
        self.touch();
    }

    /// Recolor the selected ship, or change the identity color.
    pub fn select_color(&mut self, color: HexColor) {
        match self.selected.clone() {
            Some(selected) => {
                let ships = Arc::make_mut(&mut self.ships);
                if let Some(ship) = ships.iter_mut().find(|s| s.id == selected) {
                    ship.stroke_color = Some(color);
                }
            }
            None => self.identity.stroke_color = color,
        }
        self.touch();
    }

    /// Set the identity color regardless of the selection.
    pub fn set_identity_color(&mut self, color: HexColor) {
        self.identity.stroke_color = color;
        self.touch();
    }

    pub fn to_persisted(&self) -> ShipData {
        ShipData {
            ships: self.ships.as_ref().clone(),
            identity_length: self.identity.length,
            identity_width: self.identity.width,
        }
    }

    /// Replace the whole ship state. Clears the selection.
    ///
    /// A ship whose id is already taken by an earlier ship gets a fresh id.
    pub fn load_persisted(&mut self, data: ShipData) {
        let highest_id = data
            .ships
            .iter()
            .filter_map(|ship| ship.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.next_id = match (self.next_id, highest_id.checked_add(1)) {
            (Some(next), Some(after_loaded)) => Some(next.max(after_loaded)),
            _ => None,
        };

        log::info!("Loaded {} ships", data.ships.len());
        self.ships = Arc::new(Vec::with_capacity(data.ships.len()));
        let mut seen = HashSet::new();
        for mut ship in data.ships {
            if !seen.insert(ship.id.clone()) {
                let fresh = self.allocate_id();
                log::warn!("Ship id {} is used twice, loading the copy as {fresh}", ship.id);
                ship.id = fresh;
                seen.insert(ship.id.clone());
            }
            Arc::make_mut(&mut self.ships).push(ship);
        }
        self.identity.length = data.identity_length;
        self.identity.width = data.identity_width;
        self.selected = None;
        self.touch();
    }
}

fn sanitize_canvas_size(size: Size) -> Size {
    Size::new(size.width.max(1.0), size.height.max(1.0))
}
