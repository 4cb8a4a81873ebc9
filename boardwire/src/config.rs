//! Editor settings
//!
//! Every field has a default, so a settings file only needs the keys it
//! changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::core::BoardwireError;
use crate::model::{Point, Size};

/// What `set_board` does with a board type the catalog does not know
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupPolicy {
    /// Reject with `UnknownBoardType`
    #[default]
    Strict,
    /// Select the default board and log a warning
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub default_component_size: Size,

    /// Where catalog-menu additions land
    pub default_drop_position: Point,

    /// Radius of the circle used for pin hit-testing
    pub pin_hit_radius: f64,

    pub pin_draw_size: f64,
    pub pin_hover_size: f64,

    /// Top-left corner of the board rectangle on the canvas
    pub board_origin: Point,

    pub lookup_policy: LookupPolicy,

    /// Directory of extra board definitions (`*.json`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_dir: Option<PathBuf>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_component_size: Size::new(100.0, 80.0),
            default_drop_position: Point::new(400.0, 150.0),
            pin_hit_radius: 5.0,
            pin_draw_size: 6.0,
            pin_hover_size: 8.0,
            board_origin: Point::new(50.0, 50.0),
            lookup_policy: LookupPolicy::Strict,
            catalog_dir: None,
        }
    }
}

impl EditorSettings {
    pub fn load(path: &Path) -> Result<Self, BoardwireError> {
        let content = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        tracing::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Catalog described by these settings: the built-in one, plus boards
    /// from `catalog_dir` when set.
    pub fn catalog(&self) -> Catalog {
        match &self.catalog_dir {
            Some(dir) => {
                let (catalog, errors) = Catalog::with_board_dir(dir);
                for e in errors {
                    tracing::warn!("{}", e);
                }
                catalog
            }
            None => Catalog::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: EditorSettings =
            serde_json::from_str(r#"{"pin_hit_radius": 8.0, "lookup_policy": "fallback"}"#)
                .unwrap();
        assert_eq!(settings.pin_hit_radius, 8.0);
        assert_eq!(settings.lookup_policy, LookupPolicy::Fallback);
        assert_eq!(settings.default_component_size, Size::new(100.0, 80.0));
        assert_eq!(settings.board_origin, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boardwire.json");
        std::fs::write(&path, r#"{"default_drop_position": {"x": 10.0, "y": 20.0}}"#).unwrap();

        let settings = EditorSettings::load(&path).unwrap();
        assert_eq!(settings.default_drop_position, Point::new(10.0, 20.0));
        assert_eq!(settings.lookup_policy, LookupPolicy::Strict);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boardwire.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            EditorSettings::load(&path),
            Err(BoardwireError::Json(_))
        ));
    }
}
