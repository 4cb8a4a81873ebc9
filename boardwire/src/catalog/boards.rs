//! Built-in and external board definitions
//!
//! This module loads board definitions from:
//! 1. Embedded JSON files compiled into the binary
//! 2. An optional directory of JSON files (user-editable)
//!
//! A board loaded from a directory replaces the built-in board with the same
//! id, so users can adjust pin layouts without recompiling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::core::BoardwireError;
use crate::model::{Point, Size};

const EMBEDDED_ARDUINO_UNO: &str = include_str!("../../catalog/boards/arduino_uno.json");
const EMBEDDED_ESP32: &str = include_str!("../../catalog/boards/esp32.json");
const EMBEDDED_TEENSY40: &str = include_str!("../../catalog/boards/teensy40.json");
const EMBEDDED_DAISY_SEED: &str = include_str!("../../catalog/boards/daisy_seed.json");

/// Board used when a lookup falls back
pub const DEFAULT_BOARD_TYPE: &str = "arduino";

/// Electrical role of a board pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinRole {
    Digital,
    Analog,
    Power,
    Ground,
    Control,
}

impl PinRole {
    /// Power or ground
    pub fn is_supply(&self) -> bool {
        matches!(self, PinRole::Power | PinRole::Ground)
    }
}

impl fmt::Display for PinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinRole::Digital => write!(f, "digital"),
            PinRole::Analog => write!(f, "analog"),
            PinRole::Power => write!(f, "power"),
            PinRole::Ground => write!(f, "ground"),
            PinRole::Control => write!(f, "control"),
        }
    }
}

/// Firmware ecosystem a board's code is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Arduino,
    Esp32,
    Teensy,
    Daisy,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Arduino => write!(f, "Arduino"),
            Platform::Esp32 => write!(f, "ESP32"),
            Platform::Teensy => write!(f, "Teensy"),
            Platform::Daisy => write!(f, "Daisy"),
        }
    }
}

/// A fixed pin on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardPin {
    /// Identifier used by connections and emitted in generated code (`D13`)
    pub id: String,

    /// Silkscreen label (`13 (LED)`)
    pub label: String,

    #[serde(flatten)]
    pub position: Point,

    pub role: PinRole,
}

/// A board template. Immutable once selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub platform: Platform,

    /// Toolchain board identifier used for uploads (`arduino:avr:uno`)
    pub fqbn: String,

    pub width: f64,
    pub height: f64,
    pub pins: Vec<BoardPin>,
}

impl Board {
    pub fn pin(&self, id: &str) -> Option<&BoardPin> {
        self.pins.iter().find(|p| p.id == id)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn pins_with_role(&self, role: PinRole) -> impl Iterator<Item = &BoardPin> {
        self.pins.iter().filter(move |p| p.role == role)
    }
}

/// Get all board definitions from the embedded JSON files
pub fn get_builtin_boards() -> Vec<Board> {
    let embedded_jsons = [
        EMBEDDED_ARDUINO_UNO,
        EMBEDDED_ESP32,
        EMBEDDED_TEENSY40,
        EMBEDDED_DAISY_SEED,
    ];

    let mut boards = Vec::new();
    for json_str in embedded_jsons {
        match serde_json::from_str::<Board>(json_str) {
            Ok(board) => boards.push(board),
            Err(e) => {
                tracing::warn!("Failed to parse embedded board definition: {}", e);
            }
        }
    }
    boards
}

/// Load boards from a directory of JSON files.
/// Returns both successfully loaded boards and any errors encountered.
pub fn load_boards_from_directory(dir: &Path) -> (Vec<Board>, Vec<String>) {
    let mut boards = Vec::new();
    let mut errors = Vec::new();

    if !dir.is_dir() {
        return (boards, errors);
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(format!("Failed to read directory {:?}: {}", dir, e));
            return (boards, errors);
        }
    };

    let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }

        match load_board_from_file(&path) {
            Ok(board) => {
                tracing::info!("Loaded board {} from {:?}", board.id, path.file_name());
                boards.push(board);
            }
            Err(e) => {
                let error_msg = format!("Failed to load {:?}: {}", path.file_name(), e);
                tracing::warn!("{}", error_msg);
                errors.push(error_msg);
            }
        }
    }

    (boards, errors)
}

/// Load a single board from a JSON file
pub fn load_board_from_file(path: &Path) -> Result<Board, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;

    let board: Board =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse JSON: {}", e))?;

    if board.pins.is_empty() {
        return Err(format!("Board {} defines no pins", board.id));
    }
    Ok(board)
}

/// The set of selectable boards
#[derive(Debug, Clone)]
pub struct BoardCatalog {
    // Never empty once constructed through `builtin`.
    boards: Vec<Board>,
}

impl BoardCatalog {
    pub fn builtin() -> Self {
        Self {
            boards: get_builtin_boards(),
        }
    }

    /// Add boards, replacing any existing board with the same id
    pub fn with_boards(mut self, boards: impl IntoIterator<Item = Board>) -> Self {
        for board in boards {
            match self.boards.iter_mut().find(|b| b.id == board.id) {
                Some(existing) => *existing = board,
                None => self.boards.push(board),
            }
        }
        self
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn contains(&self, board_type: &str) -> bool {
        self.boards.iter().any(|b| b.id == board_type)
    }

    /// Strict lookup
    pub fn try_get_board(&self, board_type: &str) -> Result<&Board, BoardwireError> {
        self.boards
            .iter()
            .find(|b| b.id == board_type)
            .ok_or_else(|| BoardwireError::UnknownBoardType(board_type.to_string()))
    }

    /// Permissive lookup: unknown types resolve to the default board.
    ///
    /// # Panics
    ///
    /// Panics if the catalog holds no boards at all, which only happens when
    /// the embedded board data is corrupt.
    pub fn get_board(&self, board_type: &str) -> &Board {
        match self.try_get_board(board_type) {
            Ok(board) => board,
            Err(_) => {
                tracing::warn!(
                    "Unknown board type '{}', falling back to '{}'",
                    board_type,
                    DEFAULT_BOARD_TYPE
                );
                self.default_board()
            }
        }
    }

    pub fn default_board(&self) -> &Board {
        self.boards
            .iter()
            .find(|b| b.id == DEFAULT_BOARD_TYPE)
            .unwrap_or(&self.boards[0])
    }
}

impl Default for BoardCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_embedded_boards_parse() {
        let boards = get_builtin_boards();
        let ids: Vec<&str> = boards.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["arduino", "esp32", "teensy", "daisy"]);
    }

    #[test]
    fn test_arduino_uno_layout() {
        let catalog = BoardCatalog::builtin();
        let uno = catalog.get_board("arduino");
        assert_eq!(uno.name, "Arduino Uno");
        assert_eq!(uno.platform, Platform::Arduino);
        assert_eq!(uno.size(), Size::new(300.0, 200.0));
        assert_eq!(uno.pins.len(), 25);

        let d13 = uno.pin("D13").expect("D13 exists");
        assert_eq!(d13.label, "13 (LED)");
        assert_eq!(d13.position, Point::new(150.0, 185.0));
        assert_eq!(d13.role, PinRole::Digital);

        assert_eq!(uno.pin("GND1").map(|p| p.role), Some(PinRole::Ground));
        assert_eq!(uno.pin("5V").map(|p| p.role), Some(PinRole::Power));
        assert_eq!(uno.pin("RESET").map(|p| p.role), Some(PinRole::Control));
    }

    #[test]
    fn test_unknown_board_falls_back() {
        let catalog = BoardCatalog::builtin();
        assert_eq!(catalog.get_board("atari").id, "arduino");
        assert!(matches!(
            catalog.try_get_board("atari"),
            Err(BoardwireError::UnknownBoardType(t)) if t == "atari"
        ));
    }

    #[test]
    fn test_board_pin_ids_unique() {
        for board in get_builtin_boards() {
            let mut ids: Vec<&str> = board.pins.iter().map(|p| p.id.as_str()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), board.pins.len(), "duplicate pin id on {}", board.id);
        }
    }

    #[test]
    fn test_with_boards_replaces_by_id() {
        let mut esp = BoardCatalog::builtin().get_board("esp32").clone();
        esp.name = "ESP32 DevKit".to_string();
        let catalog = BoardCatalog::builtin().with_boards([esp]);
        assert_eq!(catalog.boards().len(), 4);
        assert_eq!(catalog.get_board("esp32").name, "ESP32 DevKit");
    }

    #[test]
    fn test_load_boards_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pico.json"),
            r#"{"id": "pico", "name": "Pico", "platform": "arduino",
                "fqbn": "rp2040:rp2040:rpipico",
                "width": 120, "height": 260,
                "pins": [{"id": "GP0", "label": "GP0", "x": 10, "y": 10, "role": "digital"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let (boards, errors) = load_boards_from_directory(dir.path());
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].id, "pico");
        assert_eq!(boards[0].pins[0].position, Point::new(10.0, 10.0));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("broken.json"));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let (boards, errors) = load_boards_from_directory(Path::new("/nonexistent/boards"));
        assert!(boards.is_empty());
        assert!(errors.is_empty());
    }
}
