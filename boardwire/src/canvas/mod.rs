//! Canvas: pin layout, hit-testing, pointer interaction and the display list

pub mod controller;
pub mod geometry;
pub mod layout;
pub mod scene;

pub use controller::{
    CanvasController, CanvasEvent, ContextMenu, Interaction, MenuAction, MenuItem, MenuTarget,
};
pub use geometry::CubicBezier;
pub use scene::{LineStyle, Scene, Shape, Stroke, TextAlign};
