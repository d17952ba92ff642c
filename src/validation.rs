//! Request validation and normalization.
//!
//! Checks structural integrity of a scheduling request before any
//! search work starts. Detects:
//! - Empty or duplicate IDs within a kind
//! - Unknown mold or prerequisite references, self-prerequisites
//! - Cyclic prerequisite graphs (Kahn's algorithm)
//! - Out-of-range numerics (tonnage, hours, efficiency, quantity,
//!   cycle time, due day, GA parameters)
//!
//! Validation stops at the first offending item. On success it returns
//! a [`PlanningContext`]: id→index lookup tables, per-mold admitting
//! machine lists, the prerequisite graph in index form, and a
//! topological component order (ties broken by due day, then id).
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4

use std::collections::{HashMap, HashSet};

use crate::api::ScheduleRequest;
use crate::error::{ScheduleError, ValidationError, ValidationErrorKind};
use crate::models::{Component, Machine, Mold};

/// Normalized view of a validated request.
///
/// All cross-references are resolved to vector indices so the decoder
/// and the GA operate allocation-free on integers.
#[derive(Debug)]
pub struct PlanningContext<'a> {
    /// Machine fleet, as submitted.
    pub machines: &'a [Machine],
    /// Mold library, as submitted.
    pub molds: &'a [Mold],
    /// Component demands, as submitted.
    pub components: &'a [Component],
    /// Machine id → index.
    pub machine_index: HashMap<&'a str, usize>,
    /// Mold id → index.
    pub mold_index: HashMap<&'a str, usize>,
    /// Component id → index.
    pub component_index: HashMap<&'a str, usize>,
    /// Component index → mold index.
    pub component_mold: Vec<usize>,
    /// Component index → prerequisite component indices.
    pub prerequisites: Vec<Vec<usize>>,
    /// Mold index → admitting machine indices, sorted by (tonnage, id).
    pub admitting_machines: Vec<Vec<usize>>,
    /// Component indices in topological order (prerequisites first;
    /// ties broken by ascending due day, then ascending id).
    pub topo_order: Vec<usize>,
}

/// Validates a request and builds the normalized planning context.
///
/// # Errors
/// [`ScheduleError::Validation`] on the first structural defect;
/// [`ScheduleError::Infeasible`] when some component's mold cannot run
/// on any machine.
pub fn validate(request: &ScheduleRequest) -> Result<PlanningContext<'_>, ScheduleError> {
    validate_parameters(request)?;
    validate_machines(&request.machines)?;
    validate_molds(&request.molds)?;

    let machine_index = index_by_id(request.machines.iter().map(|m| m.id.as_str()));
    let mold_index = index_by_id(request.molds.iter().map(|m| m.id.as_str()));
    let component_index = index_by_id(request.components.iter().map(|c| c.id.as_str()));

    let component_mold =
        validate_components(&request.components, &mold_index, &component_index)?;
    let prerequisites = resolve_prerequisites(&request.components, &component_index)?;
    let topo_order = topological_order(&request.components, &prerequisites)?;

    let admitting_machines = admitting_machines(&request.machines, &request.molds);
    for (ci, component) in request.components.iter().enumerate() {
        if admitting_machines[component_mold[ci]].is_empty() {
            return Err(ScheduleError::Infeasible(format!(
                "component '{}' requires mold '{}' which no machine admits",
                component.id, component.mold_id
            )));
        }
    }

    Ok(PlanningContext {
        machines: &request.machines,
        molds: &request.molds,
        components: &request.components,
        machine_index,
        mold_index,
        component_index,
        component_mold,
        prerequisites,
        admitting_machines,
        topo_order,
    })
}

fn fail(kind: ValidationErrorKind, message: impl Into<String>) -> ScheduleError {
    ValidationError::new(kind, message).into()
}

fn validate_parameters(request: &ScheduleRequest) -> Result<(), ScheduleError> {
    if request.month_days < 1 {
        return Err(fail(
            ValidationErrorKind::OutOfRange,
            "month_days must be >= 1",
        ));
    }
    if !request.mold_change_time_hours.is_finite() || request.mold_change_time_hours < 0.0 {
        return Err(fail(
            ValidationErrorKind::OutOfRange,
            "mold_change_time_hours must be >= 0",
        ));
    }
    if !request.color_change_time_hours.is_finite() || request.color_change_time_hours < 0.0 {
        return Err(fail(
            ValidationErrorKind::OutOfRange,
            "color_change_time_hours must be >= 0",
        ));
    }
    if request.pop_size < 2 {
        return Err(fail(
            ValidationErrorKind::OutOfRange,
            "pop_size must be >= 2",
        ));
    }
    if request.n_generations < 1 {
        return Err(fail(
            ValidationErrorKind::OutOfRange,
            "n_generations must be >= 1",
        ));
    }
    if !(0.0..=1.0).contains(&request.mutation_rate) {
        return Err(fail(
            ValidationErrorKind::OutOfRange,
            "mutation_rate must be between 0 and 1",
        ));
    }
    if let Some(budget) = request.time_budget_seconds {
        if !budget.is_finite() || budget <= 0.0 {
            return Err(fail(
                ValidationErrorKind::OutOfRange,
                "time_budget_seconds must be > 0",
            ));
        }
    }
    Ok(())
}

fn validate_machines(machines: &[Machine]) -> Result<(), ScheduleError> {
    let mut seen = HashSet::new();
    for m in machines {
        if m.id.is_empty() {
            return Err(fail(ValidationErrorKind::EmptyId, "machine with empty ID"));
        }
        if !seen.insert(m.id.as_str()) {
            return Err(fail(
                ValidationErrorKind::DuplicateId,
                format!("duplicate machine ID: {}", m.id),
            ));
        }
        if !m.tonnage.is_finite() || m.tonnage <= 0.0 {
            return Err(fail(
                ValidationErrorKind::OutOfRange,
                format!("machine '{}': tonnage must be > 0", m.id),
            ));
        }
        if !m.hours_per_day.is_finite() || m.hours_per_day <= 0.0 {
            return Err(fail(
                ValidationErrorKind::OutOfRange,
                format!("machine '{}': hours_per_day must be > 0", m.id),
            ));
        }
        if !m.efficiency.is_finite() || m.efficiency <= 0.0 || m.efficiency > 1.5 {
            return Err(fail(
                ValidationErrorKind::OutOfRange,
                format!("machine '{}': efficiency must be in (0, 1.5]", m.id),
            ));
        }
    }
    Ok(())
}

fn validate_molds(molds: &[Mold]) -> Result<(), ScheduleError> {
    let mut seen = HashSet::new();
    for m in molds {
        if m.id.is_empty() {
            return Err(fail(ValidationErrorKind::EmptyId, "mold with empty ID"));
        }
        if !seen.insert(m.id.as_str()) {
            return Err(fail(
                ValidationErrorKind::DuplicateId,
                format!("duplicate mold ID: {}", m.id),
            ));
        }
        if !m.tonnage.is_finite() || m.tonnage <= 0.0 {
            return Err(fail(
                ValidationErrorKind::OutOfRange,
                format!("mold '{}': tonnage must be > 0", m.id),
            ));
        }
    }
    Ok(())
}

fn validate_components(
    components: &[Component],
    mold_index: &HashMap<&str, usize>,
    component_index: &HashMap<&str, usize>,
) -> Result<Vec<usize>, ScheduleError> {
    if component_index.len() < components.len() {
        // Re-walk to name the first duplicate.
        let mut seen = HashSet::new();
        for c in components {
            if !seen.insert(c.id.as_str()) {
                return Err(fail(
                    ValidationErrorKind::DuplicateId,
                    format!("duplicate component ID: {}", c.id),
                ));
            }
        }
    }

    let mut component_mold = Vec::with_capacity(components.len());
    for c in components {
        if c.id.is_empty() {
            return Err(fail(
                ValidationErrorKind::EmptyId,
                "component with empty ID",
            ));
        }
        if c.quantity <= 0 {
            return Err(fail(
                ValidationErrorKind::OutOfRange,
                format!("component '{}': quantity must be > 0", c.id),
            ));
        }
        if !c.cycle_time_sec.is_finite() || c.cycle_time_sec <= 0.0 {
            return Err(fail(
                ValidationErrorKind::OutOfRange,
                format!("component '{}': cycle_time_sec must be > 0", c.id),
            ));
        }
        if c.due_day < 1 {
            return Err(fail(
                ValidationErrorKind::OutOfRange,
                format!("component '{}': due_day must be >= 1", c.id),
            ));
        }
        match mold_index.get(c.mold_id.as_str()) {
            Some(&mi) => component_mold.push(mi),
            None => {
                return Err(fail(
                    ValidationErrorKind::UnknownMold,
                    format!(
                        "component '{}' references unknown mold '{}'",
                        c.id, c.mold_id
                    ),
                ))
            }
        }
    }
    Ok(component_mold)
}

fn resolve_prerequisites(
    components: &[Component],
    component_index: &HashMap<&str, usize>,
) -> Result<Vec<Vec<usize>>, ScheduleError> {
    let mut prerequisites = Vec::with_capacity(components.len());
    for c in components {
        let mut resolved = Vec::with_capacity(c.prerequisites.len());
        for p in &c.prerequisites {
            if p == &c.id {
                return Err(fail(
                    ValidationErrorKind::SelfPrerequisite,
                    format!("component '{}' lists itself as a prerequisite", c.id),
                ));
            }
            match component_index.get(p.as_str()) {
                Some(&pi) => resolved.push(pi),
                None => {
                    return Err(fail(
                        ValidationErrorKind::UnknownPrerequisite,
                        format!(
                            "component '{}' references unknown prerequisite '{}'",
                            c.id, p
                        ),
                    ))
                }
            }
        }
        prerequisites.push(resolved);
    }
    Ok(prerequisites)
}

/// Kahn topological sort; ready components are consumed in ascending
/// (due_day, id) order so the result is deterministic.
fn topological_order(
    components: &[Component],
    prerequisites: &[Vec<usize>],
) -> Result<Vec<usize>, ScheduleError> {
    let n = components.len();
    let mut indegree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (ci, prereqs) in prerequisites.iter().enumerate() {
        indegree[ci] = prereqs.len();
        for &pi in prereqs {
            dependents[pi].push(ci);
        }
    }

    let mut ready: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while !ready.is_empty() {
        let pick = ready
            .iter()
            .enumerate()
            .min_by_key(|&(_, &ci)| (components[ci].due_day, components[ci].id.as_str()))
            .map(|(pos, _)| pos)
            .unwrap();
        let ci = ready.swap_remove(pick);
        order.push(ci);
        for &di in &dependents[ci] {
            indegree[di] -= 1;
            if indegree[di] == 0 {
                ready.push(di);
            }
        }
    }

    if order.len() != n {
        let stuck = (0..n)
            .filter(|&i| indegree[i] > 0)
            .min_by_key(|&i| components[i].id.as_str())
            .unwrap();
        return Err(fail(
            ValidationErrorKind::CyclicPrerequisites,
            format!(
                "cyclic prerequisites detected involving component '{}'",
                components[stuck].id
            ),
        ));
    }
    Ok(order)
}

/// Per-mold admitting machines sorted by ascending (tonnage, id).
fn admitting_machines(machines: &[Machine], molds: &[Mold]) -> Vec<Vec<usize>> {
    molds
        .iter()
        .map(|mold| {
            let mut admits: Vec<usize> = machines
                .iter()
                .enumerate()
                .filter(|(_, m)| m.admits(mold))
                .map(|(i, _)| i)
                .collect();
            admits.sort_by(|&a, &b| {
                machines[a]
                    .tonnage
                    .total_cmp(&machines[b].tonnage)
                    .then_with(|| machines[a].id.cmp(&machines[b].id))
            });
            admits
        })
        .collect()
}

fn index_by_id<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        index.entry(id).or_insert(i);
    }
    index
}
