//! Board model: placed components, wires and the connectivity between them

pub mod board_model;
pub mod netlist;
pub mod schema;

pub use board_model::{BoardModel, PinRef};
pub use netlist::{Net, Netlist};
pub use schema::*;
