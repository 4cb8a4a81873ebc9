use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::catalog::{Board, PinRole};
use crate::codegen::arduino::bound_pin_names;
use crate::model::{BoardModel, Component, Connection, Netlist};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Suggestion,
}

impl Severity {
    /// Lower is more severe
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warning => 1,
            Severity::Info => 2,
            Severity::Suggestion => 3,
        }
    }

    /// True if `self` is at least as severe as `threshold`
    pub fn at_least(&self, threshold: Severity) -> bool {
        self.rank() <= threshold.rank()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Suggestion => "suggestion",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pins: Vec<String>,
    pub suggestion: Option<String>,
}

impl Issue {
    pub fn new(rule_id: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rule_id: rule_id.to_string(),
            severity,
            message: message.into(),
            component: None,
            pins: Vec::new(),
            suggestion: None,
        }
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with_pins<I, S>(mut self, pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pins = pins.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Everything a rule may look at
pub struct RuleContext<'a> {
    pub board: &'a Board,
    pub components: &'a [Component],
    pub connections: &'a [Connection],
    pub netlist: Netlist,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        board: &'a Board,
        components: &'a [Component],
        connections: &'a [Connection],
    ) -> Self {
        Self {
            board,
            components,
            connections,
            netlist: Netlist::build(board, components, connections),
        }
    }

    fn board_role(&self, pin_id: &str) -> Option<PinRole> {
        self.board.pin(pin_id).map(|p| p.role)
    }
}

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn severity(&self) -> Severity;
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue>;
}

pub struct RulesEngine {
    rules: Vec<Arc<dyn Rule>>,
}

impl RulesEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Arc::new(DuplicateConnectionRule));
        engine.add_rule(Arc::new(SupplyShortRule));
        engine.add_rule(Arc::new(GroundMismatchRule));
        engine.add_rule(Arc::new(SupplyAsSignalRule));
        engine.add_rule(Arc::new(FloatingComponentRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn analyze(&self, model: &BoardModel) -> Vec<Issue> {
        let ctx = RuleContext::new(model.board(), model.components(), model.connections());
        self.analyze_context(&ctx)
    }

    pub fn analyze_context(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        for rule in &self.rules {
            issues.extend(rule.check(ctx));
        }
        issues
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// The same two pins wired together more than once
pub struct DuplicateConnectionRule;

impl Rule for DuplicateConnectionRule {
    fn id(&self) -> &str {
        "duplicate_connection"
    }

    fn name(&self) -> &str {
        "Duplicate Connection Check"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        let mut first_seen: HashMap<(&str, &str), &str> = HashMap::new();
        let mut issues = Vec::new();
        for connection in ctx.connections {
            let key = connection.unordered_key();
            match first_seen.get(&key) {
                Some(original) => issues.push(
                    Issue::new(
                        self.id(),
                        self.severity(),
                        format!(
                            "{} repeats {} between {} and {}",
                            connection.id, original, key.0, key.1
                        ),
                    )
                    .with_pins([key.0, key.1])
                    .with_suggestion(format!("Delete {}", connection.id)),
                ),
                None => {
                    first_seen.insert(key, &connection.id);
                }
            }
        }
        issues
    }
}

/// A net joining a board supply pin to a board ground pin
pub struct SupplyShortRule;

impl Rule for SupplyShortRule {
    fn id(&self) -> &str {
        "supply_short"
    }

    fn name(&self) -> &str {
        "Supply Short Check"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        for net in ctx.netlist.nets() {
            let supply: Vec<&str> = net
                .pins
                .iter()
                .filter(|p| ctx.board_role(p) == Some(PinRole::Power))
                .map(String::as_str)
                .collect();
            let ground: Vec<&str> = net
                .pins
                .iter()
                .filter(|p| ctx.board_role(p) == Some(PinRole::Ground))
                .map(String::as_str)
                .collect();
            if supply.is_empty() || ground.is_empty() {
                continue;
            }
            issues.push(
                Issue::new(
                    self.id(),
                    self.severity(),
                    format!(
                        "{} is shorted to {}",
                        supply.join(", "),
                        ground.join(", ")
                    ),
                )
                .with_pins(net.pins.iter().map(String::as_str))
                .with_suggestion("Remove the wire joining the supply to ground"),
            );
        }
        issues
    }
}

/// A component ground pin wired to board pins none of which is ground
pub struct GroundMismatchRule;

impl Rule for GroundMismatchRule {
    fn id(&self) -> &str {
        "ground_mismatch"
    }

    fn name(&self) -> &str {
        "Ground Pin Check"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        for component in ctx.components {
            let Some(ground) = component.pin_named("ground") else {
                continue;
            };
            let reached = ctx.netlist.board_pins_reachable(&ground.id);
            if reached.is_empty()
                || reached
                    .iter()
                    .any(|p| ctx.board_role(p) == Some(PinRole::Ground))
            {
                continue;
            }
            issues.push(
                Issue::new(
                    self.id(),
                    self.severity(),
                    format!(
                        "{}.ground is wired to {} but not to a ground pin",
                        component.id,
                        reached.join(", ")
                    ),
                )
                .with_component(&component.id)
                .with_pins(std::iter::once(ground.id.as_str()).chain(reached.iter().copied()))
                .with_suggestion("Wire the ground pin to one of the board's GND pins"),
            );
        }
        issues
    }
}

/// A pin the generator drives as a signal, bound only to supply pins
pub struct SupplyAsSignalRule;

impl Rule for SupplyAsSignalRule {
    fn id(&self) -> &str {
        "supply_as_signal"
    }

    fn name(&self) -> &str {
        "Signal On Supply Pin Check"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        for component in ctx.components {
            for name in bound_pin_names(&component.type_id) {
                let Some(pin) = component.pin_named(name) else {
                    continue;
                };
                let reached = ctx.netlist.board_pins_reachable(&pin.id);
                let all_supply = !reached.is_empty()
                    && reached
                        .iter()
                        .all(|p| ctx.board_role(p).map(|r| r.is_supply()).unwrap_or(false));
                if !all_supply {
                    continue;
                }
                issues.push(
                    Issue::new(
                        self.id(),
                        self.severity(),
                        format!(
                            "{}.{} is driven as a signal but only reaches {}",
                            component.id,
                            pin.name,
                            reached.join(", ")
                        ),
                    )
                    .with_component(&component.id)
                    .with_pins(std::iter::once(pin.id.as_str()).chain(reached.iter().copied()))
                    .with_suggestion("Wire it to a digital or analog pin"),
                );
            }
        }
        issues
    }
}

/// A component with no wires at all
pub struct FloatingComponentRule;

impl Rule for FloatingComponentRule {
    fn id(&self) -> &str {
        "floating_component"
    }

    fn name(&self) -> &str {
        "Floating Component Check"
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
        ctx.components
            .iter()
            .filter(|c| !c.pins.iter().any(|p| ctx.netlist.is_wired(&p.id)))
            .map(|c| {
                Issue::new(
                    self.id(),
                    self.severity(),
                    format!("{} is not connected to anything", c.id),
                )
                .with_component(&c.id)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::Point;

    fn model() -> BoardModel {
        BoardModel::new(std::sync::Arc::new(Catalog::builtin()), "arduino").unwrap()
    }

    fn rule_ids(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.rule_id.as_str()).collect()
    }

    #[test]
    fn test_clean_led_circuit() {
        let mut model = model();
        model.add_component("led", Point::default()).unwrap();
        model.add_connection("D13", "led_1_power").unwrap();
        model.add_connection("led_1_ground", "GND1").unwrap();

        let issues = RulesEngine::with_default_rules().analyze(&model);
        assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn test_duplicate_connection_either_direction() {
        let mut model = model();
        model.add_component("led", Point::default()).unwrap();
        model.add_connection("D13", "led_1_power").unwrap();
        model.add_connection("led_1_power", "D13").unwrap();

        let issues = DuplicateConnectionRule.check(&RuleContext::new(
            model.board(),
            model.components(),
            model.connections(),
        ));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.starts_with("connection_2 repeats connection_1"));
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_supply_short_through_component() {
        let mut model = model();
        model.add_component("custom", Point::default()).unwrap();
        model.add_connection("5V", "custom_1_pin1").unwrap();
        model.add_connection("custom_1_pin1", "GND2").unwrap();

        let issues = RulesEngine::with_default_rules().analyze(&model);
        assert_eq!(rule_ids(&issues), ["supply_short"]);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].message, "5V is shorted to GND2");
    }

    #[test]
    fn test_ground_mismatch_and_supply_as_signal() {
        let mut model = model();
        model.add_component("led", Point::default()).unwrap();
        model.add_connection("led_1_power", "5V").unwrap();
        model.add_connection("led_1_ground", "D2").unwrap();

        let issues = RulesEngine::with_default_rules().analyze(&model);
        assert_eq!(rule_ids(&issues), ["ground_mismatch", "supply_as_signal"]);
        assert_eq!(issues[0].component.as_deref(), Some("led_1"));
        assert_eq!(issues[1].pins, ["led_1_power", "5V"]);
    }

    #[test]
    fn test_floating_component() {
        let mut model = model();
        model.add_component("pot", Point::default()).unwrap();
        model.add_component("servo", Point::default()).unwrap();
        model.add_connection("servo_2_signal", "D9").unwrap();

        let issues = RulesEngine::with_default_rules().analyze(&model);
        assert_eq!(rule_ids(&issues), ["floating_component"]);
        assert_eq!(issues[0].severity, Severity::Info);
        assert_eq!(issues[0].component.as_deref(), Some("pot_1"));
    }

    #[test]
    fn test_custom_rule() {
        struct NoServos;
        impl Rule for NoServos {
            fn id(&self) -> &str {
                "no_servos"
            }
            fn name(&self) -> &str {
                "No Servos"
            }
            fn severity(&self) -> Severity {
                Severity::Suggestion
            }
            fn check(&self, ctx: &RuleContext<'_>) -> Vec<Issue> {
                ctx.components
                    .iter()
                    .filter(|c| c.type_id == "servo")
                    .map(|c| Issue::new(self.id(), self.severity(), "servo").with_component(&c.id))
                    .collect()
            }
        }

        let mut model = model();
        model.add_component("servo", Point::default()).unwrap();
        let mut engine = RulesEngine::new();
        engine.add_rule(Arc::new(NoServos));
        let issues = engine.analyze(&model);
        assert_eq!(rule_ids(&issues), ["no_servos"]);
    }

    #[test]
    fn test_severity_threshold() {
        assert!(Severity::Error.at_least(Severity::Warning));
        assert!(Severity::Warning.at_least(Severity::Warning));
        assert!(!Severity::Info.at_least(Severity::Warning));
    }
}
