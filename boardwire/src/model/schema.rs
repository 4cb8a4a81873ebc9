//! Board model data types
//!
//! Geometry is in canvas units. Pins are referenced by plain string
//! identifiers; ownership is tracked by the model's pin index rather than by
//! parsing the identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::PinDirection;

/// A point on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Vector from `other` to `self`
    pub fn minus(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A pin owned by a placed component.
///
/// Its canvas position is not stored: it is derived from the owning
/// component's geometry by [`crate::canvas::layout::pin_position`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentPin {
    pub id: String,
    pub name: String,
    pub direction: PinDirection,
}

/// A component instance placed on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// `"{type}_{sequence}"`, e.g. `led_1`
    pub id: String,

    /// Component catalog id
    #[serde(rename = "type")]
    pub type_id: String,

    pub position: Point,
    pub size: Size,

    /// Pins in catalog template order
    pub pins: Vec<ComponentPin>,
}

impl Component {
    pub fn pin(&self, id: &str) -> Option<&ComponentPin> {
        self.pins.iter().find(|p| p.id == id)
    }

    /// Look a pin up by its template name (`power`, `signal`, ...)
    pub fn pin_named(&self, name: &str) -> Option<&ComponentPin> {
        self.pins.iter().find(|p| p.name == name)
    }

    pub fn pin_index(&self, id: &str) -> Option<usize> {
        self.pins.iter().position(|p| p.id == id)
    }

    /// Half-open containment test against the component body
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.x < self.position.x + self.size.width
            && point.y >= self.position.y
            && point.y < self.position.y + self.size.height
    }

    pub fn center(&self) -> Point {
        self.position
            .offset(self.size.width / 2.0, self.size.height / 2.0)
    }
}

/// A wire between two pins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub source_pin: String,
    pub target_pin: String,
}

impl Connection {
    /// The endpoint opposite `pin_id`, if the connection touches it
    pub fn other_end(&self, pin_id: &str) -> Option<&str> {
        if self.source_pin == pin_id {
            Some(&self.target_pin)
        } else if self.target_pin == pin_id {
            Some(&self.source_pin)
        } else {
            None
        }
    }

    /// Endpoints ordered so that `a <= b`, for duplicate detection
    pub fn unordered_key(&self) -> (&str, &str) {
        if self.source_pin <= self.target_pin {
            (&self.source_pin, &self.target_pin)
        } else {
            (&self.target_pin, &self.source_pin)
        }
    }
}

/// Who owns a pin identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PinOwner {
    Board,
    Component(String),
}

impl PinOwner {
    pub fn component_id(&self) -> Option<&str> {
        match self {
            PinOwner::Component(id) => Some(id),
            PinOwner::Board => None,
        }
    }
}
