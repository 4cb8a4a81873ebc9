//! Read-only catalogs of boards and component types

pub mod boards;
pub mod components;

use std::path::Path;

pub use boards::{Board, BoardCatalog, BoardPin, PinRole, Platform, DEFAULT_BOARD_TYPE};
pub use components::{ComponentCatalog, ComponentTypeDef, PinDirection, PinTemplate, Rgb};

/// Both catalogs, shared read-only by the model, canvas and code generator
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub boards: BoardCatalog,
    pub components: ComponentCatalog,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            boards: BoardCatalog::builtin(),
            components: ComponentCatalog::builtin(),
        }
    }

    /// Built-in catalog extended with board files from `dir`.
    /// Files that fail to load are reported and skipped.
    pub fn with_board_dir(dir: &Path) -> (Self, Vec<String>) {
        let (extra, errors) = boards::load_boards_from_directory(dir);
        let catalog = Self {
            boards: BoardCatalog::builtin().with_boards(extra),
            components: ComponentCatalog::builtin(),
        };
        (catalog, errors)
    }
}
