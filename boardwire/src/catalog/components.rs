//! Component catalog
//!
//! Component types are described by an embedded JSON document. Each type
//! lists its pins in order; that order drives both pin layout on the canvas
//! and the pin identifiers created when a component is placed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const EMBEDDED_COMPONENTS: &str = include_str!("../../catalog/components.json");

/// Logical direction of a component pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinDirection {
    Input,
    Output,
    Bidirectional,
}

impl fmt::Display for PinDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinDirection::Input => write!(f, "input"),
            PinDirection::Output => write!(f, "output"),
            PinDirection::Bidirectional => write!(f, "input/output"),
        }
    }
}

/// 24-bit colour, written as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("colour must start with '#': {s}"))?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("colour must be #RRGGBB: {s}"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("bad colour {s}: {e}"))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// One entry of a component's pin template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinTemplate {
    pub name: String,
    pub direction: PinDirection,
}

/// A pluggable component type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentTypeDef {
    /// Stable id, e.g. `led`
    pub id: String,

    /// Display name, e.g. `LED`
    pub name: String,

    #[serde(default)]
    pub icon: String,

    pub color: Rgb,

    pub pins: Vec<PinTemplate>,
}

/// Read-only set of component types, in presentation order
#[derive(Debug, Clone)]
pub struct ComponentCatalog {
    types: Vec<ComponentTypeDef>,
}

impl ComponentCatalog {
    /// Catalog built from the embedded component definitions
    pub fn builtin() -> Self {
        match serde_json::from_str::<Vec<ComponentTypeDef>>(EMBEDDED_COMPONENTS) {
            Ok(types) => Self { types },
            Err(e) => {
                tracing::warn!("Failed to parse embedded component catalog: {}", e);
                Self { types: Vec::new() }
            }
        }
    }

    pub fn from_types(types: Vec<ComponentTypeDef>) -> Self {
        Self { types }
    }

    pub fn get_component_types(&self) -> &[ComponentTypeDef] {
        &self.types
    }

    pub fn get(&self, type_id: &str) -> Option<&ComponentTypeDef> {
        self.types.iter().find(|t| t.id == type_id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for ComponentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = ComponentCatalog::builtin();
        let ids: Vec<&str> = catalog
            .get_component_types()
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(
            ids,
            ["led", "button", "pot", "servo", "ultrasonic", "rgb_led", "custom"]
        );
    }

    #[test]
    fn test_led_template() {
        let catalog = ComponentCatalog::builtin();
        let led = catalog.get("led").expect("led is built in");
        assert_eq!(led.name, "LED");
        assert_eq!(led.color, Rgb::new(0xFF, 0x52, 0x52));
        let pins: Vec<(&str, PinDirection)> = led
            .pins
            .iter()
            .map(|p| (p.name.as_str(), p.direction))
            .collect();
        assert_eq!(
            pins,
            [("power", PinDirection::Input), ("ground", PinDirection::Output)]
        );
    }

    #[test]
    fn test_rgb_parse_and_display() {
        let c: Rgb = "#4CAF50".parse().unwrap();
        assert_eq!(c, Rgb::new(0x4C, 0xAF, 0x50));
        assert_eq!(c.to_string(), "#4CAF50");
        assert!("4CAF50".parse::<Rgb>().is_err());
        assert!("#4CAF5".parse::<Rgb>().is_err());
        assert!("#GGGGGG".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_unknown_type() {
        assert!(ComponentCatalog::builtin().get("relay").is_none());
    }
}
