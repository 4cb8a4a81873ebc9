//! Board model properties

use boardwire::catalog::Catalog;
use boardwire::model::PinOwner;
use boardwire::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn model(board: &str) -> BoardModel {
    BoardModel::new(Arc::new(Catalog::builtin()), board).unwrap()
}

/// Every connection endpoint resolves to a live pin
fn assert_connections_resolve(model: &BoardModel) {
    for c in model.connections() {
        assert!(model.resolve_pin(&c.source_pin).is_some(), "{}", c.source_pin);
        assert!(model.resolve_pin(&c.target_pin).is_some(), "{}", c.target_pin);
    }
}

#[test]
fn test_every_type_instantiates_its_template() {
    let catalog = Arc::new(Catalog::builtin());
    let mut model = BoardModel::new(catalog.clone(), "arduino").unwrap();

    for def in catalog.components.get_component_types() {
        let component = model.add_component(&def.id, Point::new(200.0, 200.0)).unwrap();
        assert_eq!(component.type_id, def.id);

        let pins: Vec<_> = component.pins.iter().map(|p| (p.name.as_str(), p.direction)).collect();
        let template: Vec<_> = def.pins.iter().map(|t| (t.name.as_str(), t.direction)).collect();
        assert_eq!(pins, template, "{}", def.id);

        for pin in &component.pins {
            assert_eq!(pin.id, format!("{}_{}", component.id, pin.name));
        }
    }
    assert_eq!(model.components().len(), 7);
}

#[test]
fn test_component_ids_unique_after_removals() {
    let mut model = model("arduino");
    let mut seen = HashSet::new();
    for i in 0..6 {
        let id = model
            .add_component(if i % 2 == 0 { "led" } else { "pot" }, Point::default())
            .unwrap()
            .id
            .clone();
        assert!(seen.insert(id.clone()), "reused id {}", id);
        if i % 3 == 0 {
            model.remove_component(&id).unwrap();
        }
    }
    let live: HashSet<&str> = model.components().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(live.len(), model.components().len());
}

#[test]
fn test_cascade_keeps_connections_valid() {
    let mut model = model("arduino");
    model.add_component("rgb_led", Point::default()).unwrap();
    model.add_component("button", Point::default()).unwrap();
    model.add_connection("D9", "rgb_led_1_red").unwrap();
    model.add_connection("D10", "rgb_led_1_green").unwrap();
    model.add_connection("D2", "button_2_signal").unwrap();
    model.add_connection("rgb_led_1_ground", "button_2_ground").unwrap();

    model.remove_component("rgb_led_1").unwrap();
    assert_connections_resolve(&model);
    assert_eq!(model.connections().len(), 1);
    assert_eq!(model.connections()[0].target_pin, "button_2_signal");
}

#[test]
fn test_prefix_safe_removal() {
    let mut model = model("arduino");
    for _ in 0..10 {
        model.add_component("led", Point::default()).unwrap();
    }
    model.add_connection("D3", "led_10_power").unwrap();
    model.add_connection("D4", "led_1_power").unwrap();

    model.remove_component("led_1").unwrap();
    let remaining: Vec<&str> = model.connections().iter().map(|c| c.target_pin.as_str()).collect();
    assert_eq!(remaining, ["led_10_power"]);
}

#[test]
fn test_failed_add_leaves_model_unchanged() {
    let mut model = model("esp32");
    model.add_component("servo", Point::default()).unwrap();
    let before = (model.components().to_vec(), model.next_component_id());

    assert!(matches!(
        model.add_component("stepper", Point::default()),
        Err(BoardwireError::UnknownComponentType(_))
    ));
    assert_eq!((model.components().to_vec(), model.next_component_id()), before);
}

#[test]
fn test_board_switch_keeps_counters_monotonic() {
    let mut model = model("arduino");
    model.add_component("led", Point::default()).unwrap();
    model.add_connection("D13", "led_1_power").unwrap();

    for board in ["esp32", "teensy", "daisy", "arduino"] {
        model.set_board(board).unwrap();
        assert!(model.components().is_empty());
        assert!(model.connections().is_empty());
    }
    assert_eq!(model.add_component("led", Point::default()).unwrap().id, "led_2");
    assert_eq!(
        model.add_connection("D12", "led_2_power").unwrap().id,
        "connection_2"
    );
}

#[test]
fn test_pin_owner_index_tracks_board() {
    let mut model = model("daisy");
    assert_eq!(model.pin_owner("A7"), Some(&PinOwner::Board));
    model.add_component("pot", Point::default()).unwrap();
    assert_eq!(
        model.pin_owner("pot_1_signal"),
        Some(&PinOwner::Component("pot_1".to_string()))
    );

    model.set_board("teensy").unwrap();
    assert_eq!(model.pin_owner("A7"), None);
    assert_eq!(model.pin_owner("pot_1_signal"), None);
    assert_eq!(model.pin_owner("D23"), Some(&PinOwner::Board));
}

#[test]
fn test_connections_for_component() {
    let mut model = model("arduino");
    model.add_component("ultrasonic", Point::default()).unwrap();
    model.add_connection("D7", "ultrasonic_1_trigger").unwrap();
    model.add_connection("ultrasonic_1_echo", "D8").unwrap();
    model.add_connection("D2", "D3").unwrap();

    let ids: Vec<&str> = model
        .connections_for_component("ultrasonic_1")
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(ids, ["connection_1", "connection_2"]);
}

#[test]
fn test_catalog_boards() {
    let catalog = Catalog::builtin();
    let expected = [
        ("arduino", "Arduino Uno", "arduino:avr:uno", 25),
        ("esp32", "ESP32", "esp32:esp32:esp32", 29),
        ("teensy", "Teensy 4.0", "teensy:avr:teensy40", 27),
        ("daisy", "Daisy Seed", "daisy:stm32:daisy", 26),
    ];
    for (id, name, fqbn, pins) in expected {
        let board = catalog.boards.try_get_board(id).unwrap();
        assert_eq!(board.name, name);
        assert_eq!(board.fqbn, fqbn);
        assert_eq!(board.pins.len(), pins, "{}", id);
    }
    assert_eq!(catalog.boards.get_board("atari").id, "arduino");
}
