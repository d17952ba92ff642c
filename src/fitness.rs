//! Schedule fitness evaluation.
//!
//! Scores a decoded schedule as a weighted sum of unmet demand,
//! changeover overhead, tardiness past due days, and wait time. Lower
//! is better. The weights are tuning constants; callers may override
//! them per request.

use serde::{Deserialize, Serialize};

use crate::decoder::DecodeOutcome;
use crate::validation::PlanningContext;

/// Weights of the fitness terms. Lower total score = better schedule.
///
/// Fields omitted from an override object keep their defaults, so a
/// request can tune a single weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FitnessWeights {
    /// Per unmet piece.
    #[serde(default = "default_unmet")]
    pub unmet: f64,
    /// Per changeover hour.
    #[serde(default = "default_setup")]
    pub setup: f64,
    /// Per piece-day of tardiness past the due day.
    #[serde(default = "default_tardy")]
    pub tardy: f64,
    /// Per wait hour.
    #[serde(default = "default_wait")]
    pub wait: f64,
}

fn default_unmet() -> f64 {
    100.0
}

fn default_setup() -> f64 {
    1.0
}

fn default_tardy() -> f64 {
    10.0
}

fn default_wait() -> f64 {
    0.5
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            unmet: default_unmet(),
            setup: default_setup(),
            tardy: default_tardy(),
            wait: default_wait(),
        }
    }
}

/// Scores a decoded schedule. Lower is better.
///
/// Tardiness charges each component `max(0, finish_day − due_day) ×
/// quantity`, where `finish_day` is the day of its last production run;
/// components that never produce carry no tardiness (their residual is
/// already priced through the unmet term).
pub fn score(
    outcome: &DecodeOutcome,
    ctx: &PlanningContext<'_>,
    weights: &FitnessWeights,
    mold_change_hours: f64,
    color_change_hours: f64,
) -> f64 {
    let unmet_pieces: i64 = outcome.unmet.values().sum();

    let setup_hours = outcome.summary.mold_changes as f64 * mold_change_hours
        + outcome.summary.color_changes as f64 * color_change_hours;

    let mut tardy_piece_days = 0.0;
    for component in ctx.components {
        if let Some(finish_day) = outcome.schedule.last_produce_day(&component.id) {
            if finish_day > component.due_day {
                tardy_piece_days +=
                    (finish_day - component.due_day) as f64 * component.quantity as f64;
            }
        }
    }

    weights.unmet * unmet_pieces as f64
        + weights.setup * setup_hours
        + weights.tardy * tardy_piece_days
        + weights.wait * outcome.summary.wait_hours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScheduleRequest;
    use crate::decoder::Decoder;
    use crate::models::{Component, Machine, MachineGroup, Mold};
    use crate::validation::validate;

    fn one_machine_request(due_day: u32) -> ScheduleRequest {
        ScheduleRequest {
            month_days: 3,
            mold_change_time_hours: 1.0,
            color_change_time_hours: 0.5,
            machines: vec![Machine::new("M1", MachineGroup::Small, 100.0)
                .with_hours_per_day(8.0)
                .with_efficiency(1.0)],
            molds: vec![Mold::new("MO1", MachineGroup::Small, 50.0)],
            components: vec![Component::new("C1", "MO1", 600, 60.0)
                .with_color("red")
                .with_due_day(due_day)
                .with_lead_time_days(0)],
            pop_size: 2,
            n_generations: 1,
            mutation_rate: 0.0,
            seed: Some(1),
            weights: None,
            time_budget_seconds: None,
        }
    }

    #[test]
    fn test_weight_defaults() {
        let w = FitnessWeights::default();
        assert!((w.unmet - 100.0).abs() < 1e-12);
        assert!((w.setup - 1.0).abs() < 1e-12);
        assert!((w.tardy - 10.0).abs() < 1e-12);
        assert!((w.wait - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_partial_weight_override_from_json() {
        let w: FitnessWeights = serde_json::from_str(r#"{"unmet": 500.0}"#).unwrap();
        assert!((w.unmet - 500.0).abs() < 1e-12);
        assert!((w.setup - 1.0).abs() < 1e-12); // untouched default
    }

    #[test]
    fn test_setup_and_tardiness_terms() {
        // 600 pieces at 1 min each = 10 h of work on an 8 h machine:
        // finishes day 2, one mold + one color change on day 1.
        let request = one_machine_request(1);
        let ctx = validate(&request).unwrap();
        let decoder = Decoder::new(&ctx, 3, 1.0, 0.5);
        let outcome = decoder.decode(&[0]).unwrap();
        assert!(outcome.unmet.is_empty());

        let weights = FitnessWeights::default();
        let s = score(&outcome, &ctx, &weights, 1.0, 0.5);
        // setup = 1*1.0 + 1*0.5 = 1.5; tardy = (2-1)*600 = 600 piece-days.
        assert!((s - (1.5 + 10.0 * 600.0)).abs() < 1e-6);
    }

    #[test]
    fn test_on_time_has_no_tardiness() {
        let request = one_machine_request(2);
        let ctx = validate(&request).unwrap();
        let decoder = Decoder::new(&ctx, 3, 1.0, 0.5);
        let outcome = decoder.decode(&[0]).unwrap();

        let s = score(&outcome, &ctx, &FitnessWeights::default(), 1.0, 0.5);
        assert!((s - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_unmet_dominates() {
        let mut request = one_machine_request(3);
        request.month_days = 1;
        let ctx = validate(&request).unwrap();
        let decoder = Decoder::new(&ctx, 1, 1.0, 0.5);
        let outcome = decoder.decode(&[0]).unwrap();

        // Day 1 fits 1.5 h of setup + 6.5 h of production = 390 pieces.
        assert_eq!(outcome.unmet.get("C1"), Some(&210));
        let s = score(&outcome, &ctx, &FitnessWeights::default(), 1.0, 0.5);
        assert!(s > 100.0 * 210.0 - 1e-6);
    }
}
