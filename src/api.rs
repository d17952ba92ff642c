//! Request/response contract and the scheduling entry point.
//!
//! [`solve`] is the single operation this crate exposes to callers:
//! validate the request, derive the prerequisite structure, run the
//! genetic search, and return the best decoded schedule. Transport
//! adapters (HTTP, CLI) are thin wrappers over this contract and never
//! influence it.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ScheduleError;
use crate::fitness::FitnessWeights;
use crate::ga::{GaDriver, GaParams};
use crate::models::{Assignment, Component, Machine, Mold};
use crate::prereq::PrereqEngine;
use crate::validation::validate;

/// A monthly scheduling request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Planning horizon in days (>= 1).
    #[serde(default = "default_month_days")]
    pub month_days: u32,
    /// Hours one mold changeover costs (>= 0).
    #[serde(default)]
    pub mold_change_time_hours: f64,
    /// Hours one color changeover costs (>= 0).
    #[serde(default)]
    pub color_change_time_hours: f64,
    /// Machine fleet.
    pub machines: Vec<Machine>,
    /// Mold library.
    pub molds: Vec<Mold>,
    /// Component demands.
    pub components: Vec<Component>,
    /// GA population size (>= 2).
    #[serde(default = "default_pop_size")]
    pub pop_size: u32,
    /// GA generation count (>= 1).
    #[serde(default = "default_n_generations")]
    pub n_generations: u32,
    /// Per-genome mutation probability, in [0, 1].
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Seed of the search's random stream; fixing it makes the
    /// response byte-identical across runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Fitness weight overrides; omitted fields keep their defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<FitnessWeights>,
    /// Optional wall-clock budget; on expiry the best-so-far schedule
    /// is returned with `partial` set, never an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget_seconds: Option<f64>,
}

fn default_month_days() -> u32 {
    30
}

fn default_pop_size() -> u32 {
    30
}

fn default_n_generations() -> u32 {
    80
}

fn default_mutation_rate() -> f64 {
    0.25
}

/// The scheduling result returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    /// Timeline atoms ordered by (day, machine, sequence).
    pub assignments: Vec<Assignment>,
    /// Component id → residual pieces; fully produced components are
    /// absent.
    pub unmet: BTreeMap<String, i64>,
    /// Fitness score of the returned schedule (lower is better).
    pub score: f64,
    /// True when the search stopped early on budget or cancellation.
    #[serde(default)]
    pub partial: bool,
}

/// Runs the scheduler on a request.
///
/// # Errors
/// [`ScheduleError::Validation`] for structural defects,
/// [`ScheduleError::Infeasible`] when some component's mold fits no
/// machine, [`ScheduleError::Internal`] on decoder invariant violations.
pub fn solve(request: &ScheduleRequest) -> Result<ScheduleResponse, ScheduleError> {
    solve_inner(request, None)
}

/// Like [`solve`], but cooperatively cancellable.
///
/// Raising `cancel` stops the search at the next generation boundary
/// and returns the best-so-far schedule with `partial` set.
pub fn solve_with_cancel(
    request: &ScheduleRequest,
    cancel: &AtomicBool,
) -> Result<ScheduleResponse, ScheduleError> {
    solve_inner(request, Some(cancel))
}

fn solve_inner(
    request: &ScheduleRequest,
    cancel: Option<&AtomicBool>,
) -> Result<ScheduleResponse, ScheduleError> {
    let ctx = validate(request)?;
    info!(
        machines = ctx.machines.len(),
        molds = ctx.molds.len(),
        components = ctx.components.len(),
        pop_size = request.pop_size,
        n_generations = request.n_generations,
        "scheduling request accepted"
    );

    if ctx.components.is_empty() {
        return Ok(ScheduleResponse {
            assignments: Vec::new(),
            unmet: BTreeMap::new(),
            score: 0.0,
            partial: false,
        });
    }

    let prereq = PrereqEngine::new(&ctx);
    let weights = request.weights.unwrap_or_default();
    let driver = GaDriver::new(
        &ctx,
        &prereq,
        weights,
        request.month_days,
        request.mold_change_time_hours,
        request.color_change_time_hours,
    );
    let params = GaParams {
        pop_size: request.pop_size as usize,
        n_generations: request.n_generations,
        mutation_rate: request.mutation_rate,
        seed: request.seed,
        time_budget: request.time_budget_seconds.map(Duration::from_secs_f64),
    };

    let outcome = driver.run(&params, cancel)?;
    info!(
        score = outcome.score,
        unmet_components = outcome.best.unmet.len(),
        generations = outcome.generations_run,
        partial = outcome.partial,
        "schedule complete"
    );

    Ok(ScheduleResponse {
        assignments: outcome.best.schedule.assignments,
        unmet: outcome.best.unmet,
        score: outcome.score,
        partial: outcome.partial,
    })
}
