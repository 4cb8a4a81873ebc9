//! Wiring checks that report problems without blocking edits

pub mod rules;

pub use rules::{Issue, Rule, RuleContext, RulesEngine, Severity};
