// End-to-end scheduling scenarios exercising the full
// validate -> search -> decode -> respond pipeline.

use taskalign_scheduler::api::{solve, ScheduleRequest, ScheduleResponse};
use taskalign_scheduler::error::{ScheduleError, ValidationErrorKind};
use taskalign_scheduler::models::{Component, Machine, MachineGroup, Mold, TaskType};

fn press(id: &str, tonnage: f64, hours: f64) -> Machine {
    Machine::new(id, MachineGroup::Small, tonnage)
        .with_name(format!("Press {id}"))
        .with_hours_per_day(hours)
        .with_efficiency(1.0)
}

fn request_shell(
    machines: Vec<Machine>,
    molds: Vec<Mold>,
    components: Vec<Component>,
    month_days: u32,
) -> ScheduleRequest {
    ScheduleRequest {
        month_days,
        mold_change_time_hours: 1.0,
        color_change_time_hours: 0.5,
        machines,
        molds,
        components,
        pop_size: 10,
        n_generations: 8,
        mutation_rate: 0.25,
        seed: Some(42),
        weights: None,
        time_budget_seconds: None,
    }
}

/// Checks the timeline laws on every (machine, day): consecutive
/// sequence numbers, contiguous intervals from hour 0, and the
/// capacity ceiling.
fn assert_timeline_invariants(response: &ScheduleResponse, request: &ScheduleRequest) {
    for machine in &request.machines {
        for day in 1..=request.month_days {
            let mut tasks: Vec<_> = response
                .assignments
                .iter()
                .filter(|a| a.machine_id == machine.id && a.day == day)
                .collect();
            tasks.sort_by_key(|a| a.sequence_in_day);

            let mut cursor = 0.0;
            for (i, task) in tasks.iter().enumerate() {
                assert_eq!(task.sequence_in_day, i as u32 + 1);
                assert!(
                    (task.start_hour - cursor).abs() < 1e-6,
                    "gap on {} day {day}",
                    machine.id
                );
                assert!(task.end_hour >= task.start_hour - 1e-9);
                assert!((task.used_hours - (task.end_hour - task.start_hour)).abs() < 1e-9);
                cursor = task.end_hour;
            }
            let capacity = machine.hours_per_day * machine.efficiency;
            assert!(
                cursor <= capacity + 1e-6,
                "capacity exceeded on {} day {day}: {cursor}",
                machine.id
            );
        }
    }
}

/// Checks that production + residual exactly covers every demand.
fn assert_demand_bound(response: &ScheduleResponse, request: &ScheduleRequest) {
    for component in &request.components {
        let produced: i64 = response
            .assignments
            .iter()
            .filter(|a| a.component_id.as_deref() == Some(component.id.as_str()))
            .filter_map(|a| a.produced_qty)
            .sum();
        let unmet = response.unmet.get(&component.id).copied().unwrap_or(0);
        assert_eq!(
            produced + unmet,
            component.quantity,
            "demand bound broken for {}",
            component.id
        );
    }
}

/// Checks mold exclusivity: PRODUCE and CHANGE_MOLD intervals of the
/// same mold never overlap across machines on the same day.
fn assert_mold_exclusivity(response: &ScheduleResponse, request: &ScheduleRequest) {
    for mold in &request.molds {
        for day in 1..=request.month_days {
            let spans: Vec<_> = response
                .assignments
                .iter()
                .filter(|a| a.day == day)
                .filter(|a| {
                    a.mold_id.as_deref() == Some(mold.id.as_str())
                        || a.to_mold_id.as_deref() == Some(mold.id.as_str())
                })
                .collect();
            for (i, a) in spans.iter().enumerate() {
                for b in &spans[i + 1..] {
                    if a.machine_id != b.machine_id {
                        assert!(
                            a.end_hour <= b.start_hour + 1e-9
                                || b.end_hour <= a.start_hour + 1e-9,
                            "mold {} shared across machines on day {day}",
                            mold.id
                        );
                    }
                }
            }
        }
    }
}

fn assert_all_invariants(response: &ScheduleResponse, request: &ScheduleRequest) {
    assert_timeline_invariants(response, request);
    assert_demand_bound(response, request);
    assert_mold_exclusivity(response, request);
}

#[test]
fn scenario_three_components_two_machines() {
    let request = request_shell(
        vec![press("M1", 120.0, 12.0), press("M2", 120.0, 12.0)],
        vec![
            Mold::new("MO1", MachineGroup::Small, 80.0).with_name("Mold 1"),
            Mold::new("MO2", MachineGroup::Small, 80.0).with_name("Mold 2"),
        ],
        vec![
            Component::new("C1", "MO1", 800, 40.0)
                .with_name("Body red")
                .with_color("red")
                .with_due_day(3)
                .with_lead_time_days(0),
            Component::new("C2", "MO2", 600, 30.0)
                .with_name("Cap blue")
                .with_color("blue")
                .with_due_day(3)
                .with_lead_time_days(0)
                .with_prerequisite("C1"),
            Component::new("C3", "MO1", 200, 20.0)
                .with_name("Body blue")
                .with_color("blue")
                .with_due_day(3)
                .with_lead_time_days(0),
        ],
        3,
    );

    let response = solve(&request).unwrap();
    assert_all_invariants(&response, &request);

    // All three demands met, nothing scheduled past day 2.
    assert!(response.unmet.is_empty());
    let last_day = response.assignments.iter().map(|a| a.day).max().unwrap();
    assert!(last_day <= 2, "plan should finish by day 2, ran to {last_day}");

    // C1 has no prerequisites and its mold is free: it completes day 1.
    let c1_days: Vec<u32> = response
        .assignments
        .iter()
        .filter(|a| a.component_id.as_deref() == Some("C1"))
        .map(|a| a.day)
        .collect();
    assert!(c1_days.iter().all(|&d| d == 1));
}

#[test]
fn scenario_capacity_starved() {
    let mut request = request_shell(
        vec![press("M1", 100.0, 8.0)],
        vec![Mold::new("MO1", MachineGroup::Small, 50.0)],
        vec![Component::new("C1", "MO1", 10_000, 60.0)
            .with_name("Bulk part")
            .with_color("red")
            .with_due_day(2)
            .with_lead_time_days(0)],
        2,
    );
    request.color_change_time_hours = 0.0;

    let response = solve(&request).unwrap();
    assert_all_invariants(&response, &request);

    // Day 1: 1 h mold change + 420 pieces; day 2: 480 pieces.
    assert_eq!(response.unmet.get("C1"), Some(&9_100));
    let produced: i64 = response
        .assignments
        .iter()
        .filter_map(|a| a.produced_qty)
        .sum();
    assert_eq!(produced, 900);

    // Every day is saturated to the capacity ceiling.
    for day in 1..=2 {
        let day_end = response
            .assignments
            .iter()
            .filter(|a| a.day == day)
            .map(|a| a.end_hour)
            .fold(0.0f64, f64::max);
        assert!((day_end - 8.0).abs() < 1e-6, "day {day} not saturated");
    }
}

#[test]
fn scenario_prerequisite_same_day_wait() {
    // Only C1 -> C2: every repaired genome is [C1, C2], so the
    // choreography is deterministic. C1 fills M1 late into day 1; C2
    // pre-sets up on M2 and waits for C1's finish.
    let request = request_shell(
        vec![press("M1", 120.0, 12.0), press("M2", 120.0, 12.0)],
        vec![
            Mold::new("MO1", MachineGroup::Small, 80.0),
            Mold::new("MO2", MachineGroup::Small, 80.0),
        ],
        vec![
            Component::new("C1", "MO1", 800, 40.0)
                .with_color("red")
                .with_due_day(3)
                .with_lead_time_days(0),
            Component::new("C2", "MO2", 600, 30.0)
                .with_color("blue")
                .with_due_day(3)
                .with_lead_time_days(0)
                .with_prerequisite("C1"),
        ],
        3,
    );

    let response = solve(&request).unwrap();
    assert_all_invariants(&response, &request);
    assert!(response.unmet.is_empty());

    let c1_finish = 1.5 + 800.0 / 90.0;
    let mut m2_day1: Vec<_> = response
        .assignments
        .iter()
        .filter(|a| a.machine_id == "M2" && a.day == 1)
        .collect();
    m2_day1.sort_by_key(|a| a.sequence_in_day);

    let kinds: Vec<TaskType> = m2_day1.iter().map(|a| a.task_type).collect();
    assert_eq!(
        kinds,
        vec![
            TaskType::ChangeColor,
            TaskType::ChangeMold,
            TaskType::Wait,
            TaskType::Produce
        ]
    );
    // The wait bridges exactly to the prerequisite's finish.
    assert!((m2_day1[2].end_hour - c1_finish).abs() < 1e-6);
    assert!((m2_day1[3].start_hour - c1_finish).abs() < 1e-6);
}

#[test]
fn scenario_mold_exclusivity_two_machines() {
    let request = request_shell(
        vec![press("M1", 120.0, 12.0), press("M2", 120.0, 12.0)],
        vec![Mold::new("MO1", MachineGroup::Small, 80.0)],
        vec![
            Component::new("C1", "MO1", 300, 60.0)
                .with_color("red")
                .with_due_day(3)
                .with_lead_time_days(0),
            Component::new("C2", "MO1", 300, 60.0)
                .with_color("red")
                .with_due_day(3)
                .with_lead_time_days(0),
        ],
        3,
    );

    let response = solve(&request).unwrap();
    assert_all_invariants(&response, &request);
    assert!(response.unmet.is_empty());
}

#[test]
fn scenario_cyclic_prerequisites_rejected() {
    let request = request_shell(
        vec![press("M1", 120.0, 12.0)],
        vec![Mold::new("MO1", MachineGroup::Small, 80.0)],
        vec![
            Component::new("C1", "MO1", 10, 60.0)
                .with_color("red")
                .with_due_day(1)
                .with_prerequisite("C2"),
            Component::new("C2", "MO1", 10, 60.0)
                .with_color("red")
                .with_due_day(1)
                .with_prerequisite("C1"),
        ],
        3,
    );

    match solve(&request).unwrap_err() {
        ScheduleError::Validation(e) => {
            assert_eq!(e.kind, ValidationErrorKind::CyclicPrerequisites)
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn scenario_no_admitting_machine_rejected() {
    let request = request_shell(
        vec![press("M1", 120.0, 12.0)],
        vec![Mold::new("MO1", MachineGroup::Large, 300.0)],
        vec![Component::new("C1", "MO1", 10, 60.0)
            .with_color("red")
            .with_due_day(1)],
        3,
    );

    match solve(&request).unwrap_err() {
        ScheduleError::Infeasible(msg) => {
            assert!(msg.contains("C1"));
            assert!(msg.contains("MO1"));
        }
        other => panic!("expected infeasible error, got {other}"),
    }
}

#[test]
fn scenario_deterministic_for_fixed_seed() {
    let request = request_shell(
        vec![press("M1", 120.0, 12.0), press("M2", 100.0, 10.0)],
        vec![
            Mold::new("MO1", MachineGroup::Small, 80.0),
            Mold::new("MO2", MachineGroup::Small, 90.0),
        ],
        vec![
            Component::new("C1", "MO1", 400, 45.0)
                .with_color("red")
                .with_due_day(2)
                .with_lead_time_days(0),
            Component::new("C2", "MO2", 300, 50.0)
                .with_color("blue")
                .with_due_day(3)
                .with_lead_time_days(1),
            Component::new("C3", "MO1", 250, 30.0)
                .with_color("green")
                .with_due_day(4)
                .with_lead_time_days(0)
                .with_prerequisite("C1"),
            Component::new("C4", "MO2", 150, 40.0)
                .with_color("blue")
                .with_due_day(4)
                .with_lead_time_days(0)
                .with_prerequisite("C2"),
        ],
        5,
    );

    let a = serde_json::to_vec(&solve(&request).unwrap()).unwrap();
    let b = serde_json::to_vec(&solve(&request).unwrap()).unwrap();
    assert_eq!(a, b, "same input and seed must be byte-identical");

    let response = solve(&request).unwrap();
    assert_all_invariants(&response, &request);
}

#[test]
fn scenario_group_tonnage_respected() {
    // A medium machine cannot take small-group work even with spare
    // tonnage; only the small press runs the small mold.
    let request = request_shell(
        vec![
            press("M1", 80.0, 12.0),
            Machine::new("M2", MachineGroup::Medium, 300.0)
                .with_name("Press M2")
                .with_hours_per_day(12.0)
                .with_efficiency(1.0),
        ],
        vec![Mold::new("MO1", MachineGroup::Small, 70.0)],
        vec![Component::new("C1", "MO1", 200, 60.0)
            .with_color("red")
            .with_due_day(3)
            .with_lead_time_days(0)],
        3,
    );

    let response = solve(&request).unwrap();
    assert_all_invariants(&response, &request);
    assert!(response
        .assignments
        .iter()
        .all(|a| a.machine_id == "M1"));
}
