//! Simple generation example: wire an LED to D13 and print the sketch.

use boardwire::prelude::*;
use boardwire::PinRole;
use std::sync::Arc;

fn main() -> Result<(), BoardwireError> {
    let board = std::env::args().nth(1).unwrap_or_else(|| "arduino".to_string());

    let catalog = Arc::new(Catalog::builtin());
    let mut model = BoardModel::new(catalog.clone(), &board)?;
    model.add_component("led", Point::new(400.0, 150.0))?;
    model.add_connection("D13", "led_1_power")?;
    let ground = model
        .board()
        .pins_with_role(PinRole::Ground)
        .next()
        .map(|p| p.id.clone());
    if let Some(ground) = ground {
        model.add_connection("led_1_ground", &ground)?;
    }

    let code = CodeGenerator::new(catalog).generate_model(&model);
    print!("{}", code.source);

    for issue in &code.issues {
        eprintln!("{}: {}", issue.severity, issue.message);
    }
    if code.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
