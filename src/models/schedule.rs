//! Schedule (solution) model.
//!
//! A schedule is an ordered sequence of per-(day, machine) timeline
//! atoms: changeovers, waits, and production runs. On each (machine,
//! day) the atoms are contiguous from hour 0 and their total hours never
//! exceed the machine's effective daily capacity.

use serde::{Deserialize, Serialize};

/// Sentinel emitted for the first-ever mold or color transition on a
/// machine. Downstream viewers rely on it.
pub const NO_PRIOR: &str = "none";

/// Timeline atom classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Color/material changeover.
    ChangeColor,
    /// Mold changeover; occupies the target mold.
    ChangeMold,
    /// Idle span counted against capacity (prerequisite or mold wait).
    Wait,
    /// A production run of one component.
    Produce,
}

/// A single timeline atom on a specific (day, machine).
///
/// Task-specific fields are `None` (and omitted from JSON) for task
/// types they don't apply to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Day index in the month (1-based).
    pub day: u32,
    /// Machine identifier.
    pub machine_id: String,
    /// Machine display name (denormalized for viewers).
    pub machine_name: String,
    /// 1-based rank within (day, machine).
    pub sequence_in_day: u32,
    /// Atom classification.
    pub task_type: TaskType,
    /// Start hour within the day.
    pub start_hour: f64,
    /// End hour within the day; `end_hour - start_hour == used_hours`.
    pub end_hour: f64,
    /// Hours consumed against the day's capacity.
    pub used_hours: f64,
    /// `used_hours / (hours_per_day × efficiency)`, clamped to 1.0.
    pub utilization: f64,

    /// Produced component (PRODUCE only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    /// Produced component name (PRODUCE only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    /// Pieces produced in this run (PRODUCE only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produced_qty: Option<i64>,
    /// Mold used by the run (PRODUCE only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mold_id: Option<String>,
    /// Color of the run (PRODUCE only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Previous color, or `"none"` (CHANGE_COLOR only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_color: Option<String>,
    /// New color (CHANGE_COLOR only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_color: Option<String>,

    /// Previous mold, or `"none"` (CHANGE_MOLD only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_mold_id: Option<String>,
    /// New mold (CHANGE_MOLD only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_mold_id: Option<String>,
}

impl Assignment {
    fn common(
        day: u32,
        machine_id: &str,
        machine_name: &str,
        sequence_in_day: u32,
        task_type: TaskType,
        start_hour: f64,
        end_hour: f64,
        capacity: f64,
    ) -> Self {
        let used_hours = end_hour - start_hour;
        let utilization = if capacity > f64::EPSILON {
            (used_hours / capacity).min(1.0)
        } else {
            0.0
        };
        Self {
            day,
            machine_id: machine_id.to_string(),
            machine_name: machine_name.to_string(),
            sequence_in_day,
            task_type,
            start_hour,
            end_hour,
            used_hours,
            utilization,
            component_id: None,
            component_name: None,
            produced_qty: None,
            mold_id: None,
            color: None,
            from_color: None,
            to_color: None,
            from_mold_id: None,
            to_mold_id: None,
        }
    }

    /// Creates a production run atom.
    #[allow(clippy::too_many_arguments)]
    pub fn produce(
        day: u32,
        machine_id: &str,
        machine_name: &str,
        sequence_in_day: u32,
        start_hour: f64,
        end_hour: f64,
        capacity: f64,
        component_id: &str,
        component_name: &str,
        mold_id: &str,
        color: &str,
        produced_qty: i64,
    ) -> Self {
        let mut a = Self::common(
            day,
            machine_id,
            machine_name,
            sequence_in_day,
            TaskType::Produce,
            start_hour,
            end_hour,
            capacity,
        );
        a.component_id = Some(component_id.to_string());
        a.component_name = Some(component_name.to_string());
        a.mold_id = Some(mold_id.to_string());
        a.color = Some(color.to_string());
        a.produced_qty = Some(produced_qty);
        a
    }

    /// Creates a color changeover atom; `from` of `None` becomes `"none"`.
    #[allow(clippy::too_many_arguments)]
    pub fn change_color(
        day: u32,
        machine_id: &str,
        machine_name: &str,
        sequence_in_day: u32,
        start_hour: f64,
        end_hour: f64,
        capacity: f64,
        from: Option<&str>,
        to: &str,
    ) -> Self {
        let mut a = Self::common(
            day,
            machine_id,
            machine_name,
            sequence_in_day,
            TaskType::ChangeColor,
            start_hour,
            end_hour,
            capacity,
        );
        a.from_color = Some(from.unwrap_or(NO_PRIOR).to_string());
        a.to_color = Some(to.to_string());
        a
    }

    /// Creates a mold changeover atom; `from` of `None` becomes `"none"`.
    #[allow(clippy::too_many_arguments)]
    pub fn change_mold(
        day: u32,
        machine_id: &str,
        machine_name: &str,
        sequence_in_day: u32,
        start_hour: f64,
        end_hour: f64,
        capacity: f64,
        from: Option<&str>,
        to: &str,
    ) -> Self {
        let mut a = Self::common(
            day,
            machine_id,
            machine_name,
            sequence_in_day,
            TaskType::ChangeMold,
            start_hour,
            end_hour,
            capacity,
        );
        a.from_mold_id = Some(from.unwrap_or(NO_PRIOR).to_string());
        a.to_mold_id = Some(to.to_string());
        a
    }

    /// Creates a wait atom.
    pub fn wait(
        day: u32,
        machine_id: &str,
        machine_name: &str,
        sequence_in_day: u32,
        start_hour: f64,
        end_hour: f64,
        capacity: f64,
    ) -> Self {
        Self::common(
            day,
            machine_id,
            machine_name,
            sequence_in_day,
            TaskType::Wait,
            start_hour,
            end_hour,
            capacity,
        )
    }
}

/// A complete decoded schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Timeline atoms, ordered by (day, machine, sequence).
    pub assignments: Vec<Assignment>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn push(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Sorts assignments into presentation order (day, machine, sequence).
    pub fn sort(&mut self) {
        self.assignments.sort_by(|a, b| {
            (a.day, &a.machine_id, a.sequence_in_day).cmp(&(
                b.day,
                &b.machine_id,
                b.sequence_in_day,
            ))
        });
    }

    /// Assignments on a given (machine, day), in sequence order.
    pub fn for_machine_day(&self, machine_id: &str, day: u32) -> Vec<&Assignment> {
        let mut out: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.machine_id == machine_id && a.day == day)
            .collect();
        out.sort_by_key(|a| a.sequence_in_day);
        out
    }

    /// Total pieces produced for a component.
    pub fn produced_for(&self, component_id: &str) -> i64 {
        self.assignments
            .iter()
            .filter(|a| a.component_id.as_deref() == Some(component_id))
            .filter_map(|a| a.produced_qty)
            .sum()
    }

    /// Day of the last production run of a component, if any.
    pub fn last_produce_day(&self, component_id: &str) -> Option<u32> {
        self.assignments
            .iter()
            .filter(|a| {
                a.task_type == TaskType::Produce
                    && a.component_id.as_deref() == Some(component_id)
            })
            .map(|a| a.day)
            .max()
    }

    /// Counts atoms of the given type.
    pub fn count_of(&self, task_type: TaskType) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.task_type == task_type)
            .count()
    }

    /// Total hours spent in WAIT atoms.
    pub fn wait_hours(&self) -> f64 {
        self.assignments
            .iter()
            .filter(|a| a.task_type == TaskType::Wait)
            .map(|a| a.used_hours)
            .sum()
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the schedule has no assignments.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
