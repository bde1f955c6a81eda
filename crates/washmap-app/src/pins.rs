//! User-created map pins and layer visibility toggles.
//!
//! Pins carry a generated id, which is what the remove action and the
//! visibility toggles key on. Sample car-wash markers live in a separate
//! collection entirely, so there is no ambiguity about which layer a marker
//! belongs to.

use uuid::Uuid;
use washmap_core::{LatLng, Notice};

#[derive(Debug, Clone)]
pub struct UserPin {
    pub id: Uuid,
    pub name: String,
    pub position: LatLng,
}

/// The user-pin collection plus the two independent layer toggles.
#[derive(Debug)]
pub struct PinBoard {
    pins: Vec<UserPin>,
    pub show_carwashes: bool,
    pub show_user_pins: bool,
}

impl Default for PinBoard {
    fn default() -> Self {
        Self {
            pins: Vec::new(),
            show_carwashes: true,
            show_user_pins: true,
        }
    }
}

impl PinBoard {
    /// Validates and appends a pin. Validation failures leave the
    /// collection untouched and never reach the network or the map.
    ///
    /// # Errors
    ///
    /// - warning [`Notice`] for an empty (post-trim) name;
    /// - danger [`Notice`] for out-of-range coordinates.
    pub fn add(&mut self, name: &str, lat: f64, lng: f64) -> Result<Uuid, Notice> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Notice::warning("Please enter a location name"));
        }
        let position = LatLng::new(lat, lng)
            .map_err(|_| Notice::danger("Coordinates are out of valid range"))?;
        let id = Uuid::new_v4();
        self.pins.push(UserPin {
            id,
            name: name.to_owned(),
            position,
        });
        Ok(id)
    }

    /// Removes a pin by id.
    pub fn remove(&mut self, id: Uuid) -> Option<Notice> {
        let before = self.pins.len();
        self.pins.retain(|pin| pin.id != id);
        if self.pins.len() < before {
            Some(Notice::info("Location removed from map"))
        } else {
            None
        }
    }

    #[must_use]
    pub fn pins(&self) -> &[UserPin] {
        &self.pins
    }

    /// Pins currently visible on the map, honouring the layer toggle.
    #[must_use]
    pub fn visible_pins(&self) -> &[UserPin] {
        if self.show_user_pins {
            &self.pins
        } else {
            &[]
        }
    }
}
