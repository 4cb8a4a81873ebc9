//! Pointer-driven editing sessions on the canvas

use boardwire::canvas::{
    CanvasEvent, CubicBezier, Interaction, LineStyle, MenuAction, MenuTarget, Shape,
};
use boardwire::prelude::*;
use boardwire::{RulesEngine, Scene};
use std::sync::Arc;

fn session() -> (BoardModel, CanvasController, EditorSettings) {
    let settings = EditorSettings::default();
    let model =
        BoardModel::with_settings(Arc::new(Catalog::builtin()), "arduino", &settings).unwrap();
    (model, CanvasController::new(&settings), settings)
}

fn wire_midpoint(model: &BoardModel, connection: &str) -> Point {
    let c = model.connection(connection).unwrap();
    CubicBezier::wire(
        model.pin_position(&c.source_pin).unwrap(),
        model.pin_position(&c.target_pin).unwrap(),
    )
    .eval(0.5)
}

#[test]
fn test_build_blink_circuit_by_pointer() {
    let (mut model, mut canvas, settings) = session();

    // palette drop centers the body on the pointer
    let added = canvas
        .drop_component(&mut model, "led", Point::new(450.0, 190.0))
        .unwrap();
    assert_eq!(added, CanvasEvent::ComponentAdded { component: "led_1".to_string() });
    assert_eq!(model.component("led_1").unwrap().position, Point::new(400.0, 150.0));

    // nudge it 20px right and down
    canvas.pointer_down(&mut model, Point::new(450.0, 190.0)).unwrap();
    canvas.pointer_move(&mut model, Point::new(470.0, 210.0));
    canvas.pointer_up();
    assert_eq!(model.component("led_1").unwrap().position, Point::new(420.0, 170.0));

    // power pin now at (420, 210), ground at (520, 210)
    canvas.pointer_down(&mut model, Point::new(150.0, 185.0)).unwrap();
    let first = canvas.pointer_down(&mut model, Point::new(417.0, 210.0)).unwrap();
    assert_eq!(first, CanvasEvent::ConnectionCommitted { connection: "connection_1".to_string() });

    canvas.pointer_down(&mut model, Point::new(523.0, 210.0)).unwrap();
    let second = canvas.pointer_down(&mut model, Point::new(30.0, 95.0)).unwrap();
    assert_eq!(second, CanvasEvent::ConnectionCommitted { connection: "connection_2".to_string() });
    assert_eq!(model.connections()[1].source_pin, "led_1_ground");
    assert_eq!(model.connections()[1].target_pin, "GND1");

    let scene = Scene::build(&model, &canvas, &settings);
    assert_eq!(scene.curves().count(), 2);
    assert!(scene.curves().all(|(_, stroke)| stroke.style == LineStyle::Dashed));

    assert!(RulesEngine::with_default_rules().analyze(&model).is_empty());
    let code = CodeGenerator::new(model.catalog().clone()).generate_model(&model);
    assert!(code.source.contains("#define LED_PIN D13"));
}

#[test]
fn test_context_menu_edits() {
    let (mut model, mut canvas, _) = session();
    model.add_component("led", Point::new(400.0, 150.0)).unwrap();
    model.add_connection("D13", "led_1_power").unwrap();
    model.add_connection("led_1_ground", "GND1").unwrap();

    let menu = canvas.context_menu(&model, wire_midpoint(&model, "connection_2"));
    assert_eq!(menu.target, MenuTarget::Connection("connection_2".to_string()));
    let event = canvas.apply(&mut model, menu.items[0].action.clone()).unwrap();
    assert_eq!(event, CanvasEvent::ConnectionRemoved { connection: "connection_2".to_string() });
    assert_eq!(model.connections().len(), 1);

    let menu = canvas.context_menu(&model, Point::new(450.0, 190.0));
    assert_eq!(menu.items[0].label, "Delete Component");
    canvas.apply(&mut model, menu.items[0].action.clone()).unwrap();
    assert!(model.components().is_empty());
    assert!(model.connections().is_empty());

    let menu = canvas.context_menu(&model, Point::new(700.0, 500.0));
    assert_eq!(menu.target, MenuTarget::Canvas);
    assert_eq!(menu.items.len(), 7);
    assert_eq!(menu.items[0].label, "Add Component/LED");
    assert_eq!(menu.items[0].action, MenuAction::AddComponent("led".to_string()));

    // ids keep counting after the delete
    let event = canvas.apply(&mut model, menu.items[0].action.clone()).unwrap();
    assert_eq!(event, CanvasEvent::ComponentAdded { component: "led_2".to_string() });
    assert_eq!(model.component("led_2").unwrap().position, Point::new(400.0, 150.0));
}

#[test]
fn test_scene_shows_pending_wire_and_hover() {
    let (mut model, mut canvas, settings) = session();

    canvas.pointer_down(&mut model, Point::new(150.0, 185.0)).unwrap();
    canvas.pointer_move(&mut model, Point::new(151.0, 185.0));
    assert_eq!(canvas.hovered_pin(), Some("D13"));

    let scene = Scene::build(&model, &canvas, &settings);
    let d13_radius = scene.shapes.iter().find_map(|s| match s {
        Shape::Circle { center, radius, .. } if *center == Point::new(150.0, 185.0) => {
            Some(*radius)
        }
        _ => None,
    });
    assert_eq!(d13_radius, Some(settings.pin_hover_size / 2.0));

    let (curve, stroke) = scene.curves().last().unwrap();
    assert_eq!(stroke.style, LineStyle::Dotted);
    assert_eq!(curve.to, Point::new(151.0, 185.0));

    let json = serde_json::to_value(&scene).unwrap();
    assert_eq!(json["shapes"][0]["kind"], "rect");
    assert_eq!(json["shapes"][0]["fill"], "#646464");
}

#[test]
fn test_board_change_drops_pending_wire() {
    let (mut model, mut canvas, _) = session();
    model.add_component("pot", Point::new(400.0, 150.0)).unwrap();
    canvas.pointer_down(&mut model, Point::new(150.0, 185.0)).unwrap();
    assert!(canvas.is_connecting());

    let event = canvas.change_board(&mut model, "esp32").unwrap();
    assert_eq!(event, CanvasEvent::BoardChanged { board: "esp32".to_string() });
    assert_eq!(canvas.interaction(), &Interaction::Idle);
    assert!(model.components().is_empty());

    assert!(matches!(
        canvas.change_board(&mut model, "atari"),
        Err(BoardwireError::UnknownBoardType(_))
    ));
    assert_eq!(model.board_type(), "esp32");
}
