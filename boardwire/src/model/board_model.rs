//! The editable board session
//!
//! `BoardModel` is the only mutable aggregate: the active board, the placed
//! components, and the wires between pins. A pin-owner index maps every live
//! pin identifier to its owner, so ownership questions never depend on the
//! shape of the identifiers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::canvas::layout;
use crate::catalog::{Board, BoardPin, Catalog, ComponentTypeDef};
use crate::config::{EditorSettings, LookupPolicy};
use crate::core::BoardwireError;

use super::schema::*;

/// A resolved pin identifier
#[derive(Debug, Clone, Copy)]
pub enum PinRef<'a> {
    Board(&'a BoardPin),
    Component {
        component: &'a Component,
        pin: &'a ComponentPin,
    },
}

impl<'a> PinRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            PinRef::Board(pin) => &pin.id,
            PinRef::Component { pin, .. } => &pin.id,
        }
    }

    /// `D13` for board pins, `led_1.power` for component pins
    pub fn display_name(&self) -> String {
        match self {
            PinRef::Board(pin) => pin.id.clone(),
            PinRef::Component { component, pin } => format!("{}.{}", component.id, pin.name),
        }
    }

    pub fn position(&self) -> Point {
        match self {
            PinRef::Board(pin) => pin.position,
            PinRef::Component { component, pin } => component
                .pin_index(&pin.id)
                .map(|i| layout::pin_position(component, i))
                .unwrap_or_else(|| component.center()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoardModel {
    catalog: Arc<Catalog>,
    board: Board,
    components: Vec<Component>,
    connections: Vec<Connection>,
    next_component_id: u64,
    next_connection_id: u64,
    pin_owners: HashMap<String, PinOwner>,
    lookup_policy: LookupPolicy,
    default_component_size: Size,
}

impl BoardModel {
    /// Empty session on `board_type`, with default settings
    pub fn new(catalog: Arc<Catalog>, board_type: &str) -> Result<Self, BoardwireError> {
        Self::with_settings(catalog, board_type, &EditorSettings::default())
    }

    pub fn with_settings(
        catalog: Arc<Catalog>,
        board_type: &str,
        settings: &EditorSettings,
    ) -> Result<Self, BoardwireError> {
        let board = resolve_board(&catalog, board_type, settings.lookup_policy)?;
        let mut model = Self {
            catalog,
            board,
            components: Vec::new(),
            connections: Vec::new(),
            next_component_id: 1,
            next_connection_id: 1,
            pin_owners: HashMap::new(),
            lookup_policy: settings.lookup_policy,
            default_component_size: settings.default_component_size,
        };
        model.index_board_pins();
        Ok(model)
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_type(&self) -> &str {
        &self.board.id
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn next_component_id(&self) -> u64 {
        self.next_component_id
    }

    pub fn next_connection_id(&self) -> u64 {
        self.next_connection_id
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn pin_owner(&self, pin_id: &str) -> Option<&PinOwner> {
        self.pin_owners.get(pin_id)
    }

    pub fn resolve_pin(&self, pin_id: &str) -> Option<PinRef<'_>> {
        match self.pin_owners.get(pin_id)? {
            PinOwner::Board => self.board.pin(pin_id).map(PinRef::Board),
            PinOwner::Component(component_id) => {
                let component = self.component(component_id)?;
                let pin = component.pin(pin_id)?;
                Some(PinRef::Component { component, pin })
            }
        }
    }

    /// Canvas position of any live pin
    pub fn pin_position(&self, pin_id: &str) -> Option<Point> {
        self.resolve_pin(pin_id).map(|p| p.position())
    }

    /// Connections with at least one endpoint owned by `component_id`
    pub fn connections_for_component(&self, component_id: &str) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|c| {
                self.is_owned_by(&c.source_pin, component_id)
                    || self.is_owned_by(&c.target_pin, component_id)
            })
            .collect()
    }

    fn is_owned_by(&self, pin_id: &str, component_id: &str) -> bool {
        self.pin_owners
            .get(pin_id)
            .and_then(|o| o.component_id())
            .map(|owner| owner == component_id)
            .unwrap_or(false)
    }

    /// Replace the active board. All components and connections are
    /// discarded; id counters keep counting.
    pub fn set_board(&mut self, board_type: &str) -> Result<(), BoardwireError> {
        let board = resolve_board(&self.catalog, board_type, self.lookup_policy)?;
        tracing::debug!(
            "Switching board {} -> {} (dropping {} components, {} connections)",
            self.board.id,
            board.id,
            self.components.len(),
            self.connections.len()
        );
        self.board = board;
        self.components.clear();
        self.connections.clear();
        self.pin_owners.clear();
        self.index_board_pins();
        Ok(())
    }

    /// Instantiate a catalog component at `position` (its top-left corner)
    pub fn add_component(
        &mut self,
        type_id: &str,
        position: Point,
    ) -> Result<&Component, BoardwireError> {
        let def = self
            .catalog
            .components
            .get(type_id)
            .ok_or_else(|| BoardwireError::UnknownComponentType(type_id.to_string()))?;

        let id = format!("{}_{}", type_id, self.next_component_id);
        let component = instantiate(def, id, position, self.default_component_size);
        self.check_pin_ids_free(&component)?;

        self.next_component_id += 1;
        for pin in &component.pins {
            self.pin_owners
                .insert(pin.id.clone(), PinOwner::Component(component.id.clone()));
        }
        tracing::debug!("Added component {} at {}", component.id, position);
        self.components.push(component);
        Ok(&self.components[self.components.len() - 1])
    }

    /// Drag-and-drop placement: the new component is centered on `point`
    pub fn drop_component(
        &mut self,
        type_id: &str,
        point: Point,
    ) -> Result<&Component, BoardwireError> {
        let size = self.default_component_size;
        self.add_component(type_id, point.offset(-size.width / 2.0, -size.height / 2.0))
    }

    /// Move a component. Positions are not clamped to the board.
    pub fn move_component(&mut self, id: &str, position: Point) -> Result<(), BoardwireError> {
        let component = self
            .components
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| BoardwireError::UnknownComponent(id.to_string()))?;
        component.position = position;
        Ok(())
    }

    /// Remove a component and every connection touching one of its pins
    pub fn remove_component(&mut self, id: &str) -> Result<Component, BoardwireError> {
        let index = self
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| BoardwireError::UnknownComponent(id.to_string()))?;

        let before = self.connections.len();
        let owners = &self.pin_owners;
        let owned = |pin_id: &str| {
            owners
                .get(pin_id)
                .and_then(|o| o.component_id())
                .map(|owner| owner == id)
                .unwrap_or(false)
        };
        self.connections
            .retain(|c| !owned(&c.source_pin) && !owned(&c.target_pin));
        let dropped = before - self.connections.len();

        let component = self.components.remove(index);
        for pin in &component.pins {
            self.pin_owners.remove(&pin.id);
        }
        tracing::debug!(
            "Removed component {} and {} connection(s)",
            component.id,
            dropped
        );
        Ok(component)
    }

    /// Wire two pins together.
    ///
    /// Duplicate and role-incompatible wires are accepted; see
    /// [`crate::analyzer::RulesEngine`] for reporting them.
    pub fn add_connection(
        &mut self,
        source_pin: &str,
        target_pin: &str,
    ) -> Result<&Connection, BoardwireError> {
        if source_pin == target_pin {
            return Err(BoardwireError::SelfConnection(source_pin.to_string()));
        }
        for pin in [source_pin, target_pin] {
            if !self.pin_owners.contains_key(pin) {
                return Err(BoardwireError::UnknownPin(pin.to_string()));
            }
        }

        let connection = Connection {
            id: format!("connection_{}", self.next_connection_id),
            source_pin: source_pin.to_string(),
            target_pin: target_pin.to_string(),
        };
        self.next_connection_id += 1;
        tracing::debug!(
            "Connected {} -> {} as {}",
            source_pin,
            target_pin,
            connection.id
        );
        self.connections.push(connection);
        Ok(&self.connections[self.connections.len() - 1])
    }

    pub fn remove_connection(&mut self, id: &str) -> Result<Connection, BoardwireError> {
        let index = self
            .connections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| BoardwireError::UnknownConnection(id.to_string()))?;
        Ok(self.connections.remove(index))
    }

    /// Rebuild a session from stored parts, validating every entity against
    /// the catalogs.
    pub(crate) fn restore(
        catalog: Arc<Catalog>,
        settings: &EditorSettings,
        board_type: &str,
        components: Vec<Component>,
        connections: Vec<Connection>,
        next_component_id: u64,
        next_connection_id: u64,
    ) -> Result<Self, BoardwireError> {
        let strict = EditorSettings {
            lookup_policy: LookupPolicy::Strict,
            ..settings.clone()
        };
        let mut model = Self::with_settings(catalog, board_type, &strict)?;
        model.lookup_policy = settings.lookup_policy;

        for component in components {
            let def = model
                .catalog
                .components
                .get(&component.type_id)
                .ok_or_else(|| BoardwireError::UnknownComponentType(component.type_id.clone()))?;
            if typed_sequence(&component.id, &component.type_id).is_none() {
                return Err(BoardwireError::InvalidProject(format!(
                    "component id {} is not of the form {}_<n>",
                    component.id, component.type_id
                )));
            }
            let expected = instantiate(
                def,
                component.id.clone(),
                component.position,
                component.size,
            );
            if expected.pins != component.pins {
                return Err(BoardwireError::InvalidProject(format!(
                    "pins of {} do not match the {} template",
                    component.id, component.type_id
                )));
            }
            if model.component(&component.id).is_some() {
                return Err(BoardwireError::InvalidProject(format!(
                    "duplicate component id {}",
                    component.id
                )));
            }
            model.check_pin_ids_free(&component)?;
            for pin in &component.pins {
                model
                    .pin_owners
                    .insert(pin.id.clone(), PinOwner::Component(component.id.clone()));
            }
            model.components.push(component);
        }

        let mut seen = HashSet::new();
        for connection in connections {
            if !seen.insert(connection.id.clone()) {
                return Err(BoardwireError::InvalidProject(format!(
                    "duplicate connection id {}",
                    connection.id
                )));
            }
            if connection.source_pin == connection.target_pin {
                return Err(BoardwireError::SelfConnection(connection.source_pin));
            }
            for pin in [&connection.source_pin, &connection.target_pin] {
                if !model.pin_owners.contains_key(pin) {
                    return Err(BoardwireError::UnknownPin(pin.clone()));
                }
            }
            model.connections.push(connection);
        }

        // Counters must stay ahead of every id already handed out.
        let max_component = model
            .components
            .iter()
            .filter_map(|c| sequence_suffix(&c.id))
            .max()
            .unwrap_or(0);
        let max_connection = model
            .connections
            .iter()
            .filter_map(|c| sequence_suffix(&c.id))
            .max()
            .unwrap_or(0);
        let first_free = |max: u64, kind: &str| {
            max.checked_add(1).ok_or_else(|| {
                BoardwireError::InvalidProject(format!("{} id counter overflows", kind))
            })
        };
        model.next_component_id = next_component_id.max(first_free(max_component, "component")?);
        model.next_connection_id =
            next_connection_id.max(first_free(max_connection, "connection")?);
        Ok(model)
    }

    fn index_board_pins(&mut self) {
        for pin in &self.board.pins {
            self.pin_owners.insert(pin.id.clone(), PinOwner::Board);
        }
    }

    fn check_pin_ids_free(&self, component: &Component) -> Result<(), BoardwireError> {
        let mut local = HashSet::new();
        for pin in &component.pins {
            if self.pin_owners.contains_key(&pin.id) || !local.insert(pin.id.as_str()) {
                return Err(BoardwireError::DuplicatePin(pin.id.clone()));
            }
        }
        Ok(())
    }
}

fn resolve_board(
    catalog: &Catalog,
    board_type: &str,
    policy: LookupPolicy,
) -> Result<Board, BoardwireError> {
    match policy {
        LookupPolicy::Strict => catalog.boards.try_get_board(board_type).cloned(),
        LookupPolicy::Fallback => Ok(catalog.boards.get_board(board_type).clone()),
    }
}

/// Create a component with one pin per template entry
fn instantiate(def: &ComponentTypeDef, id: String, position: Point, size: Size) -> Component {
    let pins = def
        .pins
        .iter()
        .map(|t| ComponentPin {
            id: format!("{}_{}", id, t.name),
            name: t.name.clone(),
            direction: t.direction,
        })
        .collect();
    Component {
        id,
        type_id: def.id.clone(),
        position,
        size,
        pins,
    }
}

/// `led_12` -> 12, `connection_3` -> 3
fn sequence_suffix(id: &str) -> Option<u64> {
    id.rsplit('_').next()?.parse().ok()
}

/// Sequence number of `id` if it reads `"{type_id}_{n}"`
fn typed_sequence(id: &str, type_id: &str) -> Option<u64> {
    let digits = id.strip_prefix(type_id)?.strip_prefix('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PinDirection;

    fn model() -> BoardModel {
        BoardModel::new(Arc::new(Catalog::builtin()), "arduino").unwrap()
    }

    #[test]
    fn test_add_component_instantiates_template() {
        let mut model = model();
        let led = model.add_component("led", Point::new(400.0, 150.0)).unwrap();
        assert_eq!(led.id, "led_1");
        assert_eq!(led.size, Size::new(100.0, 80.0));
        let pins: Vec<(&str, &str, PinDirection)> = led
            .pins
            .iter()
            .map(|p| (p.id.as_str(), p.name.as_str(), p.direction))
            .collect();
        assert_eq!(
            pins,
            [
                ("led_1_power", "power", PinDirection::Input),
                ("led_1_ground", "ground", PinDirection::Output),
            ]
        );
        assert_eq!(
            model.pin_owner("led_1_power"),
            Some(&PinOwner::Component("led_1".to_string()))
        );
    }

    #[test]
    fn test_ids_are_sequential_across_types() {
        let mut model = model();
        model.add_component("led", Point::default()).unwrap();
        model.add_component("button", Point::default()).unwrap();
        let ids: Vec<&str> = model.components().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["led_1", "button_2"]);
    }

    #[test]
    fn test_unknown_component_type() {
        let mut model = model();
        let err = model.add_component("relay", Point::default()).unwrap_err();
        assert!(matches!(err, BoardwireError::UnknownComponentType(t) if t == "relay"));
        assert!(model.components().is_empty());
        assert_eq!(model.next_component_id(), 1);
    }

    #[test]
    fn test_drop_centers_component() {
        let mut model = model();
        let c = model.drop_component("button", Point::new(500.0, 300.0)).unwrap();
        assert_eq!(c.position, Point::new(450.0, 260.0));
    }

    #[test]
    fn test_add_connection_validation() {
        let mut model = model();
        model.add_component("led", Point::default()).unwrap();

        assert!(matches!(
            model.add_connection("D13", "D13"),
            Err(BoardwireError::SelfConnection(p)) if p == "D13"
        ));
        assert!(matches!(
            model.add_connection("D99", "led_1_power"),
            Err(BoardwireError::UnknownPin(p)) if p == "D99"
        ));
        assert!(matches!(
            model.add_connection("D13", "led_2_power"),
            Err(BoardwireError::UnknownPin(p)) if p == "led_2_power"
        ));

        let conn = model.add_connection("D13", "led_1_power").unwrap();
        assert_eq!(conn.id, "connection_1");
        // duplicates are accepted
        let dup = model.add_connection("led_1_power", "D13").unwrap();
        assert_eq!(dup.id, "connection_2");
    }

    #[test]
    fn test_remove_component_is_exact() {
        let mut model = model();
        for _ in 0..10 {
            model.add_component("led", Point::default()).unwrap();
        }
        model.add_connection("D1", "led_1_power").unwrap();
        model.add_connection("D10", "led_10_power").unwrap();
        model.add_connection("led_1_ground", "led_10_ground").unwrap();

        let removed = model.remove_component("led_1").unwrap();
        assert_eq!(removed.id, "led_1");
        let remaining: Vec<&str> = model.connections().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(remaining, ["connection_2"]);
        assert!(model.pin_owner("led_1_power").is_none());
        assert!(model.pin_owner("led_10_power").is_some());
    }

    #[test]
    fn test_remove_unknown() {
        let mut model = model();
        assert!(matches!(
            model.remove_component("led_1"),
            Err(BoardwireError::UnknownComponent(_))
        ));
        assert!(matches!(
            model.remove_connection("connection_1"),
            Err(BoardwireError::UnknownConnection(_))
        ));
        assert!(matches!(
            model.move_component("led_1", Point::default()),
            Err(BoardwireError::UnknownComponent(_))
        ));
    }

    #[test]
    fn test_move_component_unbounded() {
        let mut model = model();
        model.add_component("led", Point::default()).unwrap();
        model.move_component("led_1", Point::new(-500.0, 9000.0)).unwrap();
        assert_eq!(
            model.component("led_1").map(|c| c.position),
            Some(Point::new(-500.0, 9000.0))
        );
    }

    #[test]
    fn test_set_board_clears_and_keeps_counters() {
        let mut model = model();
        model.add_component("led", Point::default()).unwrap();
        model.add_connection("D13", "led_1_power").unwrap();

        model.set_board("esp32").unwrap();
        assert_eq!(model.board().name, "ESP32");
        assert!(model.components().is_empty());
        assert!(model.connections().is_empty());
        assert!(model.pin_owner("led_1_power").is_none());
        assert!(model.pin_owner("D13").is_some());
        assert!(model.pin_owner("A0").is_none());

        let led = model.add_component("led", Point::default()).unwrap();
        assert_eq!(led.id, "led_2");
    }

    #[test]
    fn test_set_board_policy() {
        let mut model = model();
        assert!(matches!(
            model.set_board("atari"),
            Err(BoardwireError::UnknownBoardType(_))
        ));
        assert_eq!(model.board_type(), "arduino");

        let settings = EditorSettings {
            lookup_policy: LookupPolicy::Fallback,
            ..EditorSettings::default()
        };
        let mut lenient =
            BoardModel::with_settings(Arc::new(Catalog::builtin()), "teensy", &settings).unwrap();
        lenient.set_board("atari").unwrap();
        assert_eq!(lenient.board_type(), "arduino");
    }

    #[test]
    fn test_resolve_pin() {
        let mut model = model();
        model.add_component("led", Point::new(400.0, 150.0)).unwrap();

        let board_pin = model.resolve_pin("D13").unwrap();
        assert!(matches!(board_pin, PinRef::Board(_)));
        assert_eq!(board_pin.position(), Point::new(150.0, 185.0));

        let comp_pin = model.resolve_pin("led_1_ground").unwrap();
        assert_eq!(comp_pin.display_name(), "led_1.ground");
        assert_eq!(comp_pin.position(), Point::new(500.0, 190.0));
        assert!(model.resolve_pin("nope").is_none());
    }

    #[test]
    fn test_sequence_suffix() {
        assert_eq!(sequence_suffix("rgb_led_12"), Some(12));
        assert_eq!(sequence_suffix("connection_3"), Some(3));
        assert_eq!(sequence_suffix("custom"), None);
    }
}
