//! Project files (`*.board.json`)
//!
//! A project stores the board type, the placed components, the wires and
//! the id counters. Loading validates everything against the catalogs and
//! rebuilds the pin index, so a hand-edited file cannot smuggle in pins the
//! catalog does not define.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::EditorSettings;
use crate::core::BoardwireError;
use crate::model::{BoardModel, Component, Connection};

pub const PROJECT_VERSION: u32 = 1;
pub const PROJECT_EXTENSION: &str = "board.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default = "default_version")]
    pub version: u32,
    pub board_type: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default = "first_id")]
    pub next_component_id: u64,
    #[serde(default = "first_id")]
    pub next_connection_id: u64,
}

fn default_version() -> u32 {
    PROJECT_VERSION
}

fn first_id() -> u64 {
    1
}

impl ProjectFile {
    pub fn from_model(model: &BoardModel) -> Self {
        Self {
            version: PROJECT_VERSION,
            board_type: model.board_type().to_string(),
            components: model.components().to_vec(),
            connections: model.connections().to_vec(),
            next_component_id: model.next_component_id(),
            next_connection_id: model.next_connection_id(),
        }
    }

    pub fn into_model(
        self,
        catalog: Arc<Catalog>,
        settings: &EditorSettings,
    ) -> Result<BoardModel, BoardwireError> {
        if self.version > PROJECT_VERSION {
            return Err(BoardwireError::InvalidProject(format!(
                "file version {} is newer than supported version {}",
                self.version, PROJECT_VERSION
            )));
        }
        BoardModel::restore(
            catalog,
            settings,
            &self.board_type,
            self.components,
            self.connections,
            self.next_component_id,
            self.next_connection_id,
        )
    }

    pub fn to_json(&self) -> Result<String, BoardwireError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self, BoardwireError> {
        Ok(serde_json::from_str(content)?)
    }
}

pub fn save_project(model: &BoardModel, path: &Path) -> Result<(), BoardwireError> {
    let json = ProjectFile::from_model(model).to_json()?;
    std::fs::write(path, json)?;
    tracing::debug!(
        "Saved {} components and {} connections to {:?}",
        model.components().len(),
        model.connections().len(),
        path
    );
    Ok(())
}

pub fn load_project(
    path: &Path,
    catalog: Arc<Catalog>,
    settings: &EditorSettings,
) -> Result<BoardModel, BoardwireError> {
    let content = std::fs::read_to_string(path)?;
    let model = ProjectFile::from_json(&content)?.into_model(catalog, settings)?;
    tracing::debug!("Loaded project {:?} on board {}", path, model.board_type());
    Ok(model)
}
