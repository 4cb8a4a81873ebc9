//! Core API shared by the CLI and any GUI front end.
//! No toolkit or process state dependencies.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analyzer::rules::{Issue, RulesEngine, Severity};
use crate::codegen::{CodeGenerator, GeneratedCode};
use crate::config::EditorSettings;
use crate::model::BoardModel;
use crate::project;

#[derive(Debug, thiserror::Error)]
pub enum BoardwireError {
    #[error("Unknown board type: {0}")]
    UnknownBoardType(String),
    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),
    #[error("Unknown component: {0}")]
    UnknownComponent(String),
    #[error("Unknown connection: {0}")]
    UnknownConnection(String),
    #[error("Cannot connect pin {0} to itself")]
    SelfConnection(String),
    #[error("Unknown pin: {0}")]
    UnknownPin(String),
    #[error("Pin id already in use: {0}")]
    DuplicatePin(String),
    #[error("Invalid project: {0}")]
    InvalidProject(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options for generation runs (CLI or GUI).
#[derive(Clone, Debug)]
pub struct GenerationOptions {
    /// Treat warnings as failures
    pub strict: bool,
    /// Append wiring-rule issues to the generation issues
    pub check_wiring: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            strict: false,
            check_wiring: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueStats {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub suggestions: usize,
}

impl IssueStats {
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.info + self.suggestions
    }

    /// Number of issues at `threshold` or worse
    pub fn at_least(&self, threshold: Severity) -> usize {
        match threshold {
            Severity::Error => self.errors,
            Severity::Warning => self.errors + self.warnings,
            Severity::Info => self.errors + self.warnings + self.info,
            Severity::Suggestion => self.total(),
        }
    }
}

pub fn issues_to_stats(issues: &[Issue]) -> IssueStats {
    let mut stats = IssueStats::default();
    for i in issues {
        match i.severity {
            Severity::Error => stats.errors += 1,
            Severity::Warning => stats.warnings += 1,
            Severity::Info => stats.info += 1,
            Severity::Suggestion => stats.suggestions += 1,
        }
    }
    stats
}

/// Wiring check result for one project file
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub file: PathBuf,
    pub board_type: String,
    pub issues: Vec<Issue>,
    pub stats: IssueStats,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.stats.errors > 0
    }
}

/// Generation result for one project file
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub file: PathBuf,
    #[serde(flatten)]
    pub code: GeneratedCode,
    pub stats: IssueStats,
}

impl GenerationResult {
    /// Errors always fail; warnings fail only in strict mode
    pub fn passed(&self, options: &GenerationOptions) -> bool {
        let threshold = if options.strict {
            Severity::Warning
        } else {
            Severity::Error
        };
        self.stats.at_least(threshold) == 0
    }
}

/// Core project API used by both GUI and CLI.
pub struct BoardwireCore;

impl BoardwireCore {
    /// Load a project with the catalog described by `settings`
    pub fn load_project(
        path: &Path,
        settings: &EditorSettings,
    ) -> Result<BoardModel, BoardwireError> {
        let catalog = Arc::new(settings.catalog());
        project::load_project(path, catalog, settings)
    }

    /// Run the wiring rules over a saved project
    pub fn check_project(
        path: &Path,
        settings: &EditorSettings,
    ) -> Result<CheckResult, BoardwireError> {
        let model = Self::load_project(path, settings)?;
        Ok(Self::check_model(path, &model))
    }

    pub fn check_model(path: &Path, model: &BoardModel) -> CheckResult {
        let issues = RulesEngine::with_default_rules().analyze(model);
        let stats = issues_to_stats(&issues);
        CheckResult {
            file: path.to_path_buf(),
            board_type: model.board_type().to_string(),
            issues,
            stats,
        }
    }

    /// Generate firmware source for a saved project
    pub fn generate_project(
        path: &Path,
        settings: &EditorSettings,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, BoardwireError> {
        let model = Self::load_project(path, settings)?;
        Ok(Self::generate_model(path, &model, options))
    }

    pub fn generate_model(
        path: &Path,
        model: &BoardModel,
        options: &GenerationOptions,
    ) -> GenerationResult {
        let generator = CodeGenerator::new(model.catalog().clone());
        let mut code = generator.generate_model(model);
        if options.check_wiring {
            code.issues
                .extend(RulesEngine::with_default_rules().analyze(model));
        }
        let stats = issues_to_stats(&code.issues);
        GenerationResult {
            file: path.to_path_buf(),
            code,
            stats,
        }
    }
}
