//! Component (demand) model.
//!
//! A component is one demand line of the monthly plan: a quantity of
//! identical pieces, produced with a specific mold and color, due by a
//! given day. Components may depend on other components; the
//! prerequisite graph must be a DAG system-wide.

use serde::{Deserialize, Serialize};

/// A component demand to be produced within the month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Unique component identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Demanded pieces.
    pub quantity: i64,
    /// Seconds per piece on the machine.
    pub cycle_time_sec: f64,
    /// Required mold.
    pub mold_id: String,
    /// Color/material; changing it on a machine costs a setup.
    pub color: String,
    /// Day index in the month (1-based) by which the demand is due.
    pub due_day: u32,
    /// Days of slack to reserve before the due day.
    #[serde(default = "default_lead_time_days")]
    pub lead_time_days: u32,
    /// Components that must be fully produced before this one starts.
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

fn default_lead_time_days() -> u32 {
    2
}

impl Component {
    /// Creates a new component demand.
    pub fn new(
        id: impl Into<String>,
        mold_id: impl Into<String>,
        quantity: i64,
        cycle_time_sec: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            quantity,
            cycle_time_sec,
            mold_id: mold_id.into(),
            color: String::new(),
            due_day: 1,
            lead_time_days: default_lead_time_days(),
            prerequisites: Vec::new(),
        }
    }

    /// Sets the component name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Sets the due day (1-based).
    pub fn with_due_day(mut self, due_day: u32) -> Self {
        self.due_day = due_day;
        self
    }

    /// Sets the lead time in days.
    pub fn with_lead_time_days(mut self, days: u32) -> Self {
        self.lead_time_days = days;
        self
    }

    /// Adds a prerequisite component ID.
    pub fn with_prerequisite(mut self, component_id: impl Into<String>) -> Self {
        self.prerequisites.push(component_id.into());
        self
    }

    /// Machine hours needed for one piece.
    #[inline]
    pub fn piece_hours(&self) -> f64 {
        self.cycle_time_sec / 3600.0
    }

    /// Machine hours needed for the full demand.
    #[inline]
    pub fn total_hours(&self) -> f64 {
        self.quantity as f64 * self.piece_hours()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_builder() {
        let c = Component::new("C1", "MO1", 800, 40.0)
            .with_name("Housing")
            .with_color("red")
            .with_due_day(3)
            .with_lead_time_days(0)
            .with_prerequisite("C0");

        assert_eq!(c.id, "C1");
        assert_eq!(c.mold_id, "MO1");
        assert_eq!(c.quantity, 800);
        assert_eq!(c.due_day, 3);
        assert_eq!(c.prerequisites, vec!["C0".to_string()]);
    }

    #[test]
    fn test_piece_hours() {
        let c = Component::new("C1", "MO1", 90, 40.0);
        // 40 s/piece = 1/90 h/piece, 90 pieces = 1 h
        assert!((c.piece_hours() - 40.0 / 3600.0).abs() < 1e-12);
        assert!((c.total_hours() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_lead_time_default_from_json() {
        let c: Component = serde_json::from_str(
            r#"{"id":"C1","name":"","quantity":10,"cycle_time_sec":30.0,
                "mold_id":"MO1","color":"red","due_day":5}"#,
        )
        .unwrap();
        assert_eq!(c.lead_time_days, 2);
        assert!(c.prerequisites.is_empty());
    }
}
