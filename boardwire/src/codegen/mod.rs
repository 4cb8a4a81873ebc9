//! Firmware source generation
//!
//! The generator resolves the board, builds the netlist and hands both to
//! the emitter registered for the board's platform. Components that cannot
//! be emitted are reported as issues instead of being dropped silently.

pub mod arduino;

use serde::Serialize;
use std::sync::Arc;

use crate::analyzer::{Issue, Severity};
use crate::catalog::{Board, Catalog, Platform};
use crate::model::{BoardModel, Component, Connection, Netlist};

pub use arduino::ArduinoEmitter;

pub const UNSUPPORTED_BOARD: &str = "// Unsupported board type\n";

/// Per-platform source emitter
pub trait Emitter: Send + Sync {
    fn platform(&self) -> Platform;

    /// Produce source text for `components` plus any generation issues
    fn emit(
        &self,
        board: &Board,
        components: &[Component],
        netlist: &Netlist,
    ) -> (String, Vec<Issue>);
}

/// Platforms without templates: a header comment and an info issue
pub struct StubEmitter {
    platform: Platform,
}

impl StubEmitter {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl Emitter for StubEmitter {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn emit(
        &self,
        _board: &Board,
        components: &[Component],
        _netlist: &Netlist,
    ) -> (String, Vec<Issue>) {
        let source = format!("// Auto-generated code for {}\n\n", self.platform);
        let mut issue = Issue::new(
            "stub_platform",
            Severity::Info,
            format!("No code templates exist for {}; only a header was generated", self.platform),
        );
        if !components.is_empty() {
            issue = issue.with_suggestion(format!(
                "{} component(s) were not emitted",
                components.len()
            ));
        }
        (source, vec![issue])
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCode {
    pub board_type: String,
    /// `None` when the board type is unknown
    pub platform: Option<Platform>,
    pub source: String,
    pub issues: Vec<Issue>,
}

impl GeneratedCode {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Any issue at `threshold` or worse
    pub fn has_issues_at(&self, threshold: Severity) -> bool {
        self.issues.iter().any(|i| i.severity.at_least(threshold))
    }
}

pub struct CodeGenerator {
    catalog: Arc<Catalog>,
    emitters: Vec<Arc<dyn Emitter>>,
}

impl CodeGenerator {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            emitters: vec![
                Arc::new(ArduinoEmitter),
                Arc::new(StubEmitter::new(Platform::Esp32)),
                Arc::new(StubEmitter::new(Platform::Teensy)),
                Arc::new(StubEmitter::new(Platform::Daisy)),
            ],
        }
    }

    /// Register an emitter, replacing any existing one for its platform
    pub fn with_emitter(mut self, emitter: Arc<dyn Emitter>) -> Self {
        self.emitters.retain(|e| e.platform() != emitter.platform());
        self.emitters.push(emitter);
        self
    }

    fn emitter_for(&self, platform: Platform) -> Option<&Arc<dyn Emitter>> {
        self.emitters.iter().find(|e| e.platform() == platform)
    }

    pub fn generate(
        &self,
        board_type: &str,
        components: &[Component],
        connections: &[Connection],
    ) -> GeneratedCode {
        let board = match self.catalog.boards.try_get_board(board_type) {
            Ok(board) => board,
            Err(e) => {
                tracing::warn!("Cannot generate code: {}", e);
                return GeneratedCode {
                    board_type: board_type.to_string(),
                    platform: None,
                    source: UNSUPPORTED_BOARD.to_string(),
                    issues: vec![Issue::new("unsupported_board", Severity::Error, e.to_string())],
                };
            }
        };

        let Some(emitter) = self.emitter_for(board.platform) else {
            return GeneratedCode {
                board_type: board_type.to_string(),
                platform: Some(board.platform),
                source: UNSUPPORTED_BOARD.to_string(),
                issues: vec![Issue::new(
                    "unsupported_board",
                    Severity::Error,
                    format!("No emitter registered for {}", board.platform),
                )],
            };
        };

        let netlist = Netlist::build(board, components, connections);
        let (source, issues) = emitter.emit(board, components, &netlist);
        tracing::info!(
            "Generated {} lines for {} ({} components, {} issues)",
            source.lines().count(),
            board.name,
            components.len(),
            issues.len()
        );

        GeneratedCode {
            board_type: board.id.clone(),
            platform: Some(board.platform),
            source,
            issues,
        }
    }

    pub fn generate_model(&self, model: &BoardModel) -> GeneratedCode {
        self.generate(model.board_type(), model.components(), model.connections())
    }
}

/// Bind each named pin of `component` to the first board pin it reaches.
///
/// Returns `None` and records an `unwired_component` issue if any of them
/// reaches no board pin. A pin reaching several board pins is bound to the
/// first and reported as `ambiguous_binding`.
pub(crate) fn bind_pins(
    component: &Component,
    names: &[&str],
    netlist: &Netlist,
    issues: &mut Vec<Issue>,
) -> Option<Vec<String>> {
    let mut bound = Vec::with_capacity(names.len());
    let mut missing = Vec::new();

    for name in names {
        let reached = component
            .pin_named(name)
            .map(|p| netlist.board_pins_reachable(&p.id))
            .unwrap_or_default();
        match reached.as_slice() {
            [] => missing.push(*name),
            [first, rest @ ..] => {
                if !rest.is_empty() {
                    issues.push(
                        Issue::new(
                            "ambiguous_binding",
                            Severity::Warning,
                            format!(
                                "{}.{} reaches {}; using {}",
                                component.id,
                                name,
                                reached.join(", "),
                                first
                            ),
                        )
                        .with_component(&component.id)
                        .with_pins(reached.iter().copied()),
                    );
                }
                bound.push(first.to_string());
            }
        }
    }

    if missing.is_empty() {
        return Some(bound);
    }
    issues.push(
        Issue::new(
            "unwired_component",
            Severity::Warning,
            format!(
                "{} was left out: {} not wired to the board",
                component.id,
                missing.join(", ")
            ),
        )
        .with_component(&component.id)
        .with_suggestion(format!(
            "Connect {} to a board pin",
            missing
                .iter()
                .map(|n| format!("{}.{}", component.id, n))
                .collect::<Vec<_>>()
                .join(" and ")
        )),
    );
    None
}

pub(crate) fn unsupported_component(component: &Component, platform: Platform) -> Issue {
    Issue::new(
        "unsupported_component",
        Severity::Warning,
        format!(
            "{} ({}) has no {} template and was left out",
            component.id, component.type_id, platform
        ),
    )
    .with_component(&component.id)
}
