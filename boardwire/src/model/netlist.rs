//! Electrical connectivity derived from the wires
//!
//! Pins are nodes and connections are edges of an undirected graph. Board
//! pins are inserted first, in board order, so node order doubles as board
//! order when picking the pin a component is bound to.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use serde::Serialize;
use std::collections::HashMap;

use crate::catalog::Board;

use super::board_model::BoardModel;
use super::schema::{Component, Connection};

/// A group of pins joined by wires
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Net {
    /// Board pins first (in board order), then component pins
    pub pins: Vec<String>,
}

impl Net {
    pub fn contains(&self, pin_id: &str) -> bool {
        self.pins.iter().any(|p| p == pin_id)
    }
}

#[derive(Debug, Clone)]
pub struct Netlist {
    /// Node weight: pin id. Edge weight: connection id.
    graph: UnGraph<String, String>,
    indices: HashMap<String, NodeIndex>,
    board_pin_count: usize,
}

impl Netlist {
    pub fn from_model(model: &BoardModel) -> Self {
        Self::build(model.board(), model.components(), model.connections())
    }

    /// Build from loose parts. Connections whose endpoints are not pins of
    /// `board` or `components` are skipped.
    pub fn build(board: &Board, components: &[Component], connections: &[Connection]) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut indices = HashMap::new();

        for pin in &board.pins {
            let idx = graph.add_node(pin.id.clone());
            indices.insert(pin.id.clone(), idx);
        }
        let board_pin_count = graph.node_count();

        for pin in components.iter().flat_map(|c| &c.pins) {
            indices
                .entry(pin.id.clone())
                .or_insert_with(|| graph.add_node(pin.id.clone()));
        }

        for connection in connections {
            match (
                indices.get(&connection.source_pin),
                indices.get(&connection.target_pin),
            ) {
                (Some(&a), Some(&b)) => {
                    graph.add_edge(a, b, connection.id.clone());
                }
                _ => tracing::debug!(
                    "Skipping {}: endpoint not on this board",
                    connection.id
                ),
            }
        }

        Self {
            graph,
            indices,
            board_pin_count,
        }
    }

    fn is_board_node(&self, idx: NodeIndex) -> bool {
        idx.index() < self.board_pin_count
    }

    /// Every node joined to `start` (itself included), in node order
    fn group(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let mut bfs = Bfs::new(&self.graph, start);
        let mut members = Vec::new();
        while let Some(idx) = bfs.next(&self.graph) {
            members.push(idx);
        }
        members.sort();
        members
    }

    /// All nets with at least two pins, ordered by their first pin
    pub fn nets(&self) -> Vec<Net> {
        let mut seen = vec![false; self.graph.node_count()];
        let mut nets = Vec::new();
        for idx in self.graph.node_indices() {
            if seen[idx.index()] || self.graph.neighbors(idx).next().is_none() {
                continue;
            }
            let members = self.group(idx);
            for m in &members {
                seen[m.index()] = true;
            }
            nets.push(Net {
                pins: members.iter().map(|&m| self.graph[m].clone()).collect(),
            });
        }
        nets
    }

    /// The net containing `pin_id`, if it is wired to anything
    pub fn net_of(&self, pin_id: &str) -> Option<Net> {
        let &idx = self.indices.get(pin_id)?;
        self.graph.neighbors(idx).next()?;
        Some(Net {
            pins: self
                .group(idx)
                .into_iter()
                .map(|m| self.graph[m].clone())
                .collect(),
        })
    }

    /// Board pins electrically joined to `pin_id`, in board order. The pin
    /// itself is not included.
    pub fn board_pins_reachable(&self, pin_id: &str) -> Vec<&str> {
        let Some(&start) = self.indices.get(pin_id) else {
            return Vec::new();
        };
        self.group(start)
            .into_iter()
            .filter(|&m| m != start && self.is_board_node(m))
            .map(|m| self.graph[m].as_str())
            .collect()
    }

    pub fn is_wired(&self, pin_id: &str) -> bool {
        self.indices
            .get(pin_id)
            .map(|&idx| self.graph.neighbors(idx).next().is_some())
            .unwrap_or(false)
    }

    pub fn pin_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn wire_count(&self) -> usize {
        self.graph.edge_count()
    }
}
