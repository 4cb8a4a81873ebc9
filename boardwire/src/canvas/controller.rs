//! Interactive editing on the board canvas
//!
//! The controller holds only UI-local state (selection, hover, the current
//! drag or pending wire) and forwards edits to a [`BoardModel`] passed in by
//! the caller. It knows nothing about the toolkit delivering the pointer
//! events.
//!
//! ```text
//!            press on body              release
//!   Idle ───────────────────▶ Dragging ─────────▶ Idle
//!    │ ▲
//!    │ │ press on other pin (commit) / same pin / empty space / body
//!    ▼ │
//!   Connecting
//! ```

use crate::config::EditorSettings;
use crate::core::BoardwireError;
use crate::model::{BoardModel, Component, Connection, Point};

use super::geometry::{within_radius, CubicBezier};
use super::layout;

/// What the pointer is doing
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Idle,
    Dragging {
        component: String,
        /// Pointer position relative to the component's top-left corner
        grab_offset: Point,
    },
    Connecting {
        from: String,
        /// Live end of the rubber-band wire
        cursor: Point,
    },
}

/// Result of feeding a pointer event to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    Nothing,
    DragStarted {
        component: String,
        /// A pending wire was dropped because the press landed on a body
        cancelled_connection: bool,
    },
    ComponentMoved {
        component: String,
        position: Point,
    },
    DragEnded {
        component: String,
    },
    ConnectionStarted {
        pin: String,
    },
    RubberBandMoved(Point),
    ConnectionCommitted {
        connection: String,
    },
    ConnectionCancelled,
    SelectionCleared,
    HoverChanged(Option<String>),
    ComponentAdded {
        component: String,
    },
    ComponentRemoved {
        component: String,
    },
    ConnectionRemoved {
        connection: String,
    },
    BoardChanged {
        board: String,
    },
}

/// Action offered by a context menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    DeleteComponent(String),
    DeleteConnection(String),
    /// Add a component of this catalog type at the default drop position
    AddComponent(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuTarget {
    Component(String),
    Connection(String),
    Canvas,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    pub target: MenuTarget,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone)]
pub struct CanvasController {
    interaction: Interaction,
    selected: Option<String>,
    hovered_pin: Option<String>,
    pin_hit_radius: f64,
    default_drop_position: Point,
}

impl CanvasController {
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            interaction: Interaction::Idle,
            selected: None,
            hovered_pin: None,
            pin_hit_radius: settings.pin_hit_radius,
            default_drop_position: settings.default_drop_position,
        }
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn hovered_pin(&self) -> Option<&str> {
        self.hovered_pin.as_deref()
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self.interaction, Interaction::Connecting { .. })
    }

    /// Drop all UI-local state
    pub fn reset(&mut self) {
        self.interaction = Interaction::Idle;
        self.selected = None;
        self.hovered_pin = None;
    }

    /// First component (in placement order) whose body contains `point`
    pub fn component_at<'m>(&self, model: &'m BoardModel, point: Point) -> Option<&'m Component> {
        model.components().iter().find(|c| c.contains(point))
    }

    /// Pin under `point`: board pins first, then component pins
    pub fn pin_at(&self, model: &BoardModel, point: Point) -> Option<String> {
        let radius = self.pin_hit_radius;
        if let Some(pin) = model
            .board()
            .pins
            .iter()
            .find(|p| within_radius(point, p.position, radius))
        {
            return Some(pin.id.clone());
        }

        model.components().iter().find_map(|component| {
            layout::pin_positions(component)
                .into_iter()
                .zip(&component.pins)
                .find(|(pos, _)| within_radius(point, *pos, radius))
                .map(|(_, pin)| pin.id.clone())
        })
    }

    /// Wire whose drawn curve passes within the hit radius of `point`
    pub fn connection_at<'m>(&self, model: &'m BoardModel, point: Point) -> Option<&'m Connection> {
        model.connections().iter().find(|c| {
            match (model.pin_position(&c.source_pin), model.pin_position(&c.target_pin)) {
                (Some(a), Some(b)) => {
                    CubicBezier::wire(a, b).distance_to(point) <= self.pin_hit_radius
                }
                _ => false,
            }
        })
    }

    /// Primary button pressed at `point`.
    ///
    /// Bodies are tested before pins, so a press inside a component always
    /// starts a drag.
    pub fn pointer_down(
        &mut self,
        model: &mut BoardModel,
        point: Point,
    ) -> Result<CanvasEvent, BoardwireError> {
        let previous = std::mem::replace(&mut self.interaction, Interaction::Idle);
        let was_connecting = matches!(previous, Interaction::Connecting { .. });

        if let Some(component) = self.component_at(model, point) {
            let id = component.id.clone();
            self.interaction = Interaction::Dragging {
                component: id.clone(),
                grab_offset: point.minus(component.position),
            };
            self.selected = Some(id.clone());
            return Ok(CanvasEvent::DragStarted {
                component: id,
                cancelled_connection: was_connecting,
            });
        }

        if let Some(pin) = self.pin_at(model, point) {
            return match previous {
                Interaction::Connecting { from, .. } if from == pin => {
                    Ok(CanvasEvent::ConnectionCancelled)
                }
                Interaction::Connecting { from, .. } => {
                    let connection = model.add_connection(&from, &pin)?;
                    Ok(CanvasEvent::ConnectionCommitted {
                        connection: connection.id.clone(),
                    })
                }
                _ => {
                    self.interaction = Interaction::Connecting {
                        from: pin.clone(),
                        cursor: point,
                    };
                    Ok(CanvasEvent::ConnectionStarted { pin })
                }
            };
        }

        self.selected = None;
        if was_connecting {
            Ok(CanvasEvent::ConnectionCancelled)
        } else {
            Ok(CanvasEvent::SelectionCleared)
        }
    }

    /// Pointer moved to `point`. Hover is re-evaluated on every move.
    pub fn pointer_move(&mut self, model: &mut BoardModel, point: Point) -> Vec<CanvasEvent> {
        let mut events = Vec::new();

        match &mut self.interaction {
            Interaction::Dragging {
                component,
                grab_offset,
            } => {
                let position = point.minus(*grab_offset);
                match model.move_component(component, position) {
                    Ok(()) => events.push(CanvasEvent::ComponentMoved {
                        component: component.clone(),
                        position,
                    }),
                    Err(e) => {
                        tracing::warn!("Drag target vanished: {}", e);
                        self.interaction = Interaction::Idle;
                    }
                }
            }
            Interaction::Connecting { cursor, .. } => {
                *cursor = point;
                events.push(CanvasEvent::RubberBandMoved(point));
            }
            Interaction::Idle => {}
        }

        let hovered = self.pin_at(model, point);
        if hovered != self.hovered_pin {
            self.hovered_pin = hovered.clone();
            events.push(CanvasEvent::HoverChanged(hovered));
        }
        events
    }

    /// Primary button released. Ends a drag; a pending wire stays pending.
    pub fn pointer_up(&mut self) -> CanvasEvent {
        match std::mem::replace(&mut self.interaction, Interaction::Idle) {
            Interaction::Dragging { component, .. } => CanvasEvent::DragEnded { component },
            other => {
                self.interaction = other;
                CanvasEvent::Nothing
            }
        }
    }

    /// Menu for a secondary click at `point`
    pub fn context_menu(&self, model: &BoardModel, point: Point) -> ContextMenu {
        if let Some(component) = self.component_at(model, point) {
            return ContextMenu {
                target: MenuTarget::Component(component.id.clone()),
                items: vec![MenuItem {
                    label: "Delete Component".to_string(),
                    action: MenuAction::DeleteComponent(component.id.clone()),
                }],
            };
        }

        if let Some(connection) = self.connection_at(model, point) {
            return ContextMenu {
                target: MenuTarget::Connection(connection.id.clone()),
                items: vec![MenuItem {
                    label: "Delete Connection".to_string(),
                    action: MenuAction::DeleteConnection(connection.id.clone()),
                }],
            };
        }

        ContextMenu {
            target: MenuTarget::Canvas,
            items: model
                .catalog()
                .components
                .get_component_types()
                .iter()
                .map(|t| MenuItem {
                    label: format!("Add Component/{}", t.name),
                    action: MenuAction::AddComponent(t.id.clone()),
                })
                .collect(),
        }
    }

    /// Perform a context-menu action
    pub fn apply(
        &mut self,
        model: &mut BoardModel,
        action: MenuAction,
    ) -> Result<CanvasEvent, BoardwireError> {
        match action {
            MenuAction::DeleteComponent(id) => {
                let removed = model.remove_component(&id)?;
                self.forget_component(&removed);
                Ok(CanvasEvent::ComponentRemoved { component: id })
            }
            MenuAction::DeleteConnection(id) => {
                model.remove_connection(&id)?;
                Ok(CanvasEvent::ConnectionRemoved { connection: id })
            }
            MenuAction::AddComponent(type_id) => {
                let component = model.add_component(&type_id, self.default_drop_position)?;
                Ok(CanvasEvent::ComponentAdded {
                    component: component.id.clone(),
                })
            }
        }
    }

    /// A catalog entry dragged from the component list was dropped at `point`
    pub fn drop_component(
        &mut self,
        model: &mut BoardModel,
        type_id: &str,
        point: Point,
    ) -> Result<CanvasEvent, BoardwireError> {
        let component = model.drop_component(type_id, point)?;
        Ok(CanvasEvent::ComponentAdded {
            component: component.id.clone(),
        })
    }

    /// Switch boards and drop all interaction state tied to the old one
    pub fn change_board(
        &mut self,
        model: &mut BoardModel,
        board_type: &str,
    ) -> Result<CanvasEvent, BoardwireError> {
        model.set_board(board_type)?;
        self.reset();
        Ok(CanvasEvent::BoardChanged {
            board: model.board_type().to_string(),
        })
    }

    fn forget_component(&mut self, removed: &Component) {
        if self.selected.as_deref() == Some(removed.id.as_str()) {
            self.selected = None;
        }
        if self
            .hovered_pin
            .as_deref()
            .map(|h| removed.pin(h).is_some())
            .unwrap_or(false)
        {
            self.hovered_pin = None;
        }
        let stale = match &self.interaction {
            Interaction::Dragging { component, .. } => *component == removed.id,
            Interaction::Connecting { from, .. } => removed.pin(from).is_some(),
            Interaction::Idle => false,
        };
        if stale {
            self.interaction = Interaction::Idle;
        }
    }
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new(&EditorSettings::default())
    }
}
