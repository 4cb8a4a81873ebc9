//! Display list for painting the canvas
//!
//! [`Scene::build`] turns the model and the controller's UI state into an
//! ordered list of primitive shapes. Any toolkit able to fill rectangles,
//! draw circles, text and cubic curves can paint it in list order.

use serde::Serialize;

use crate::catalog::{PinRole, Rgb};
use crate::config::EditorSettings;
use crate::model::{BoardModel, Point, Size};

use super::controller::{CanvasController, Interaction};
use super::geometry::CubicBezier;
use super::layout;

const BOARD_FILL: Rgb = Rgb::new(100, 100, 100);
const OUTLINE: Rgb = Rgb::new(50, 50, 50);
const PIN_OUTLINE: Rgb = Rgb::new(30, 30, 30);
const WHITE: Rgb = Rgb::new(255, 255, 255);
const COMPONENT_PIN: Rgb = Rgb::new(255, 235, 59);
const WIRE: Rgb = Rgb::new(255, 193, 7);

/// Board pins left of this x get their label on the right
const LABEL_LEFT_LIMIT: f64 = 100.0;
/// Board pins right of this x get their label on the left
const LABEL_RIGHT_LIMIT: f64 = 200.0;

pub fn role_color(role: PinRole) -> Rgb {
    match role {
        PinRole::Digital => Rgb::new(76, 175, 80),
        PinRole::Analog => Rgb::new(33, 150, 243),
        PinRole::Power => Rgb::new(255, 87, 34),
        PinRole::Ground | PinRole::Control => Rgb::new(158, 158, 158),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
    pub style: LineStyle,
}

impl Stroke {
    pub const fn solid(color: Rgb, width: f64) -> Self {
        Self {
            color,
            width,
            style: LineStyle::Solid,
        }
    }
}

/// Horizontal alignment of a text run relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Start,
    End,
    /// Centered on the anchor in both directions
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Rect {
        origin: Point,
        size: Size,
        fill: Rgb,
        stroke: Stroke,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Rgb,
        stroke: Stroke,
    },
    Text {
        anchor: Point,
        text: String,
        font_size: f64,
        bold: bool,
        color: Rgb,
        align: TextAlign,
    },
    Curve {
        curve: CubicBezier,
        stroke: Stroke,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    pub shapes: Vec<Shape>,
}

impl Scene {
    /// Paint order: board, board pins, components and their pins, wires,
    /// then the pending wire on top.
    pub fn build(
        model: &BoardModel,
        controller: &CanvasController,
        settings: &EditorSettings,
    ) -> Self {
        let mut shapes = Vec::new();
        let board = model.board();
        let hovered = controller.hovered_pin();
        let pin_radius = |id: &str| {
            if hovered == Some(id) {
                settings.pin_hover_size / 2.0
            } else {
                settings.pin_draw_size / 2.0
            }
        };

        let board_size = board.size();
        shapes.push(Shape::Rect {
            origin: settings.board_origin,
            size: board_size,
            fill: BOARD_FILL,
            stroke: Stroke::solid(OUTLINE, 2.0),
        });
        shapes.push(Shape::Text {
            anchor: settings
                .board_origin
                .offset(board_size.width / 2.0, board_size.height / 2.0),
            text: board.name.clone(),
            font_size: 12.0,
            bold: true,
            color: WHITE,
            align: TextAlign::Center,
        });

        for pin in &board.pins {
            let p = pin.position;
            shapes.push(Shape::Circle {
                center: p,
                radius: pin_radius(&pin.id),
                fill: role_color(pin.role),
                stroke: Stroke::solid(PIN_OUTLINE, 1.0),
            });
            let (anchor, align) = if p.x < LABEL_LEFT_LIMIT {
                (p.offset(8.0, 4.0), TextAlign::Start)
            } else if p.x > LABEL_RIGHT_LIMIT {
                (p.offset(-8.0, 4.0), TextAlign::End)
            } else {
                (p.offset(-10.0, -8.0), TextAlign::Start)
            };
            shapes.push(Shape::Text {
                anchor,
                text: pin.label.clone(),
                font_size: 7.0,
                bold: false,
                color: WHITE,
                align,
            });
        }

        for component in model.components() {
            let Some(def) = model.catalog().components.get(&component.type_id) else {
                continue;
            };
            let outline = if controller.selected() == Some(component.id.as_str()) {
                Stroke::solid(WHITE, 2.0)
            } else {
                Stroke::solid(OUTLINE, 1.0)
            };
            shapes.push(Shape::Rect {
                origin: component.position,
                size: component.size,
                fill: def.color,
                stroke: outline,
            });
            shapes.push(Shape::Text {
                anchor: component.center(),
                text: format!("{}\n{}", def.icon, def.name),
                font_size: 10.0,
                bold: true,
                color: WHITE,
                align: TextAlign::Center,
            });
            for (pin, center) in component.pins.iter().zip(layout::pin_positions(component)) {
                shapes.push(Shape::Circle {
                    center,
                    radius: pin_radius(&pin.id),
                    fill: COMPONENT_PIN,
                    stroke: Stroke::solid(PIN_OUTLINE, 1.0),
                });
            }
        }

        for connection in model.connections() {
            if let (Some(a), Some(b)) = (
                model.pin_position(&connection.source_pin),
                model.pin_position(&connection.target_pin),
            ) {
                shapes.push(Shape::Curve {
                    curve: CubicBezier::wire(a, b),
                    stroke: Stroke {
                        color: WIRE,
                        width: 2.0,
                        style: LineStyle::Dashed,
                    },
                });
            }
        }

        if let Interaction::Connecting { from, cursor } = controller.interaction() {
            if let Some(start) = model.pin_position(from) {
                shapes.push(Shape::Curve {
                    curve: CubicBezier::wire(start, *cursor),
                    stroke: Stroke {
                        color: WIRE,
                        width: 2.0,
                        style: LineStyle::Dotted,
                    },
                });
            }
        }

        Self { shapes }
    }

    pub fn curves(&self) -> impl Iterator<Item = (&CubicBezier, &Stroke)> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Curve { curve, stroke } => Some((curve, stroke)),
            _ => None,
        })
    }
}
