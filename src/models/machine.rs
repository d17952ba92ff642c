//! Injection-molding machine model.
//!
//! A machine is the primary scheduling resource. Its effective daily
//! capacity in hours is `hours_per_day × efficiency`; a machine *admits*
//! a mold iff their groups match and the mold's tonnage does not exceed
//! the machine's.

use serde::{Deserialize, Serialize};

use super::Mold;

/// Size class shared by machines and molds.
///
/// A mold can only be mounted on a machine of the same group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineGroup {
    Small,
    Medium,
    Large,
}

/// An injection-molding machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    /// Unique machine identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Size class; must match the mounted mold's group.
    pub group: MachineGroup,
    /// Clamping force capacity in tons.
    pub tonnage: f64,
    /// Scheduled working hours per day.
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: f64,
    /// Work rate multiplier in (0, 1.5].
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
}

fn default_hours_per_day() -> f64 {
    21.0
}

fn default_efficiency() -> f64 {
    0.85
}

impl Machine {
    /// Creates a new machine with default working hours and efficiency.
    pub fn new(id: impl Into<String>, group: MachineGroup, tonnage: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            group,
            tonnage,
            hours_per_day: default_hours_per_day(),
            efficiency: default_efficiency(),
        }
    }

    /// Sets the machine name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the working hours per day.
    pub fn with_hours_per_day(mut self, hours: f64) -> Self {
        self.hours_per_day = hours;
        self
    }

    /// Sets the efficiency multiplier.
    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.efficiency = efficiency;
        self
    }

    /// Effective daily capacity in hours.
    #[inline]
    pub fn capacity(&self) -> f64 {
        self.hours_per_day * self.efficiency
    }

    /// Whether this machine can mount the given mold.
    #[inline]
    pub fn admits(&self, mold: &Mold) -> bool {
        self.group == mold.group && mold.tonnage <= self.tonnage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_builder() {
        let m = Machine::new("M1", MachineGroup::Small, 120.0)
            .with_name("Press 1")
            .with_hours_per_day(12.0)
            .with_efficiency(1.0);

        assert_eq!(m.id, "M1");
        assert_eq!(m.name, "Press 1");
        assert_eq!(m.group, MachineGroup::Small);
        assert!((m.capacity() - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_machine_defaults() {
        let m = Machine::new("M1", MachineGroup::Large, 500.0);
        assert!((m.hours_per_day - 21.0).abs() < 1e-10);
        assert!((m.efficiency - 0.85).abs() < 1e-10);
        assert!((m.capacity() - 17.85).abs() < 1e-10);
    }

    #[test]
    fn test_admits_group_and_tonnage() {
        let m = Machine::new("M1", MachineGroup::Small, 120.0);

        let fits = Mold::new("MO1", MachineGroup::Small, 80.0);
        let too_heavy = Mold::new("MO2", MachineGroup::Small, 150.0);
        let wrong_group = Mold::new("MO3", MachineGroup::Large, 80.0);

        assert!(m.admits(&fits));
        assert!(!m.admits(&too_heavy));
        assert!(!m.admits(&wrong_group));
    }

    #[test]
    fn test_group_serde_lowercase() {
        let json = serde_json::to_string(&MachineGroup::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let back: MachineGroup = serde_json::from_str("\"small\"").unwrap();
        assert_eq!(back, MachineGroup::Small);
    }
}
