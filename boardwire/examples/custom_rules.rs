//! Example: adding a project-specific rule to the RulesEngine.
//! Run with: cargo run --example custom_rules [path/to/project.board.json]

use boardwire::analyzer::{Issue, Rule, RuleContext, RulesEngine, Severity};
use boardwire::{BoardwireCore, BoardwireError, EditorSettings, PinRole};
use std::path::Path;
use std::sync::Arc;

/// Analog inputs should be read from analog-capable pins
struct PotOnAnalogPinRule;

impl Rule for PotOnAnalogPinRule {
    fn id(&self) -> &str {
        "pot_on_analog_pin"
    }

    fn name(&self) -> &str {
        "Potentiometer Pin Check"
    }

    fn severity(&self) -> Severity {
        Severity::Suggestion
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        ctx.components
            .iter()
            .filter(|c| c.type_id == "pot")
            .filter_map(|c| {
                let signal = c.pin_named("signal")?;
                let reached = ctx.netlist.board_pins_reachable(&signal.id);
                let analog = |p: &&str| ctx.board.pin(p).map(|b| b.role) == Some(PinRole::Analog);
                let digital_only = !reached.is_empty() && !reached.iter().any(analog);
                digital_only.then(|| {
                    Issue::new(
                        self.id(),
                        self.severity(),
                        format!("{} is read from {}", c.id, reached.join(", ")),
                    )
                    .with_component(&c.id)
                    .with_suggestion("Use an analog pin for analogRead")
                })
            })
            .collect()
    }
}

fn main() -> Result<(), BoardwireError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/blink.board.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example custom_rules [path/to/project.board.json]");
        std::process::exit(1);
    }

    let model = BoardwireCore::load_project(path, &EditorSettings::default())?;
    let mut engine = RulesEngine::with_default_rules();
    engine.add_rule(Arc::new(PotOnAnalogPinRule));
    let issues = engine.analyze(&model);

    println!("Custom checks found {} issues for {}", issues.len(), path.display());
    for issue in &issues {
        println!("  [{}] {}", issue.severity, issue.message);
        if let Some(ref comp) = issue.component {
            println!("    Component: {}", comp);
        }
    }

    if issues.iter().any(|i| i.severity == Severity::Error) {
        std::process::exit(1);
    }
    Ok(())
}
