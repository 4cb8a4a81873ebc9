//! Boardwire - microcontroller board editor core
//!
//! This library holds everything behind a board-wiring editor except the
//! window: board and component catalogs, the editable board model, a
//! toolkit-independent canvas controller, wiring checks, and a firmware
//! code generator.
//!
//! # Quick Start
//!
//! ```
//! use boardwire::prelude::*;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::builtin());
//! let mut model = BoardModel::new(catalog.clone(), "arduino").unwrap();
//! model.add_component("led", Point::new(400.0, 150.0)).unwrap();
//! model.add_connection("D13", "led_1_power").unwrap();
//!
//! let code = CodeGenerator::new(catalog).generate_model(&model);
//! assert!(code.source.contains("#define LED_PIN D13"));
//! ```
//!
//! # Features
//!
//! - **Catalogs**: Arduino Uno, ESP32, Teensy 4.0 and Daisy Seed boards;
//!   seven component types; extra boards from a directory of JSON files
//! - **Canvas**: hit-testing, drag, two-click wiring, context menus and a
//!   paintable display list
//! - **Checks**: duplicate wires, supply shorts, misused supply pins
//! - **Code generation**: Arduino sketches, header stubs for other platforms

pub mod analyzer;
pub mod canvas;
pub mod catalog;
pub mod codegen;
pub mod config;
pub mod core;
pub mod model;
pub mod project;

// Re-export main types
pub use analyzer::rules::{Issue, RulesEngine, Severity};
pub use canvas::{CanvasController, CanvasEvent, Scene};
pub use catalog::{Board, Catalog, ComponentTypeDef, PinRole, Platform};
pub use codegen::{CodeGenerator, GeneratedCode};
pub use config::{EditorSettings, LookupPolicy};
pub use crate::core::{
    issues_to_stats, BoardwireCore, BoardwireError, CheckResult, GenerationOptions,
    GenerationResult, IssueStats,
};
pub use model::{BoardModel, Component, Connection, Netlist, Point, Size};
pub use project::{load_project, save_project, ProjectFile};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BoardModel, BoardwireCore, BoardwireError, CanvasController, Catalog, CodeGenerator,
        EditorSettings, GenerationOptions, Issue, Point, Severity,
    };
}
