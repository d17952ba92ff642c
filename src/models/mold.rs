//! Mold model.
//!
//! A mold is a shared physical tool: at most one machine may hold it at
//! any instant. The decoder enforces this exclusivity through a
//! per-(mold, day) interval store.

use serde::{Deserialize, Serialize};

use super::MachineGroup;

/// An injection mold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mold {
    /// Unique mold identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Size class; must match the hosting machine's group.
    pub group: MachineGroup,
    /// Required clamping force in tons; must not exceed the machine's.
    pub tonnage: f64,
}

impl Mold {
    /// Creates a new mold.
    pub fn new(id: impl Into<String>, group: MachineGroup, tonnage: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            group,
            tonnage,
        }
    }

    /// Sets the mold name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
