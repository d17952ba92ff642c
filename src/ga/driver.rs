//! Generational GA driver.
//!
//! Owns the single seeded random stream of the whole search. Each
//! generation is produced atomically from the previous generation's
//! snapshot: tournament selection, order crossover, swap mutation, and
//! topological repair, with the generation's best genome carried over
//! unchanged. Fitness is pure, so a generation's genomes are evaluated
//! in parallel; scores are collected by genome index before selection,
//! which keeps the returned schedule deterministic for a fixed seed.
//!
//! The driver stops after `n_generations`, or earlier at a generation
//! boundary when the wall-clock budget is exceeded or the caller's
//! cancellation flag is raised; early stops return the best-so-far
//! schedule flagged as partial.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use super::genome::{self, Genome};
use super::operators;
use crate::decoder::{DecodeOutcome, Decoder};
use crate::error::ScheduleError;
use crate::fitness::{score, FitnessWeights};
use crate::prereq::PrereqEngine;
use crate::validation::PlanningContext;

/// Search parameters of one GA run.
#[derive(Debug, Clone)]
pub struct GaParams {
    /// Population size (>= 2).
    pub pop_size: usize,
    /// Number of complete generations (>= 1).
    pub n_generations: u32,
    /// Per-genome probability of one swap mutation, in [0, 1].
    pub mutation_rate: f64,
    /// Seed of the random stream; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Optional wall-clock budget checked at generation boundaries.
    pub time_budget: Option<Duration>,
}

/// Result of a GA run.
#[derive(Debug)]
pub struct GaOutcome {
    /// Decoded schedule of the best genome found.
    pub best: DecodeOutcome,
    /// Its fitness score (lower is better).
    pub score: f64,
    /// True when the run stopped early on budget or cancellation.
    pub partial: bool,
    /// Generations actually evaluated.
    pub generations_run: u32,
}

/// Fitness-driven search over component priority permutations.
pub struct GaDriver<'a> {
    ctx: &'a PlanningContext<'a>,
    prereq: &'a PrereqEngine,
    decoder: Decoder<'a>,
    weights: FitnessWeights,
    mold_change_hours: f64,
    color_change_hours: f64,
}

impl<'a> GaDriver<'a> {
    /// Creates a driver over a validated context.
    pub fn new(
        ctx: &'a PlanningContext<'a>,
        prereq: &'a PrereqEngine,
        weights: FitnessWeights,
        month_days: u32,
        mold_change_hours: f64,
        color_change_hours: f64,
    ) -> Self {
        Self {
            ctx,
            prereq,
            decoder: Decoder::new(ctx, month_days, mold_change_hours, color_change_hours),
            weights,
            mold_change_hours,
            color_change_hours,
        }
    }

    /// Runs the search and returns the best decoded schedule.
    ///
    /// `cancel` is polled at generation boundaries only; raising it
    /// never loses the best-so-far result.
    pub fn run(
        &self,
        params: &GaParams,
        cancel: Option<&AtomicBool>,
    ) -> Result<GaOutcome, ScheduleError> {
        let mut rng = match params.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let n = self.ctx.components.len();
        let started = Instant::now();

        // First half: level-biased shuffles (topologically valid by
        // construction). Second half: uniform shuffles repaired.
        let mut population: Vec<Genome> = Vec::with_capacity(params.pop_size);
        for k in 0..params.pop_size {
            if k < params.pop_size / 2 {
                population.push(self.prereq.biased_shuffle(&mut rng));
            } else {
                let mut g = genome::random_genome(n, &mut rng);
                genome::repair(&mut g, &self.ctx.prerequisites);
                population.push(g);
            }
        }

        let mut best_genome: Option<Genome> = None;
        let mut best_score = f64::INFINITY;
        let mut partial = false;
        let mut generations_run = 0;

        for generation in 0..params.n_generations {
            let scores = self.evaluate_generation(&population)?;

            let mut gen_best = 0usize;
            for (i, &s) in scores.iter().enumerate() {
                if s < scores[gen_best] {
                    gen_best = i;
                }
            }
            if scores[gen_best] < best_score {
                best_score = scores[gen_best];
                best_genome = Some(population[gen_best].clone());
            }
            generations_run = generation + 1;
            debug!(
                generation,
                generation_best = scores[gen_best],
                best_so_far = best_score,
                "generation evaluated"
            );

            if generation + 1 == params.n_generations {
                break;
            }
            let over_budget = params
                .time_budget
                .is_some_and(|budget| started.elapsed() >= budget);
            let cancelled = cancel.is_some_and(|flag| flag.load(Ordering::Relaxed));
            if over_budget || cancelled {
                partial = true;
                debug!(
                    generation,
                    over_budget, cancelled, "stopping at generation boundary"
                );
                break;
            }

            let mut next = Vec::with_capacity(params.pop_size);
            next.push(population[gen_best].clone()); // elitism
            while next.len() < params.pop_size {
                let p1 = operators::tournament(&scores, &mut rng);
                let p2 = operators::tournament(&scores, &mut rng);
                let mut child =
                    operators::ox_crossover(&population[p1], &population[p2], &mut rng);
                genome::repair(&mut child, &self.ctx.prerequisites);
                if n >= 2 && rng.random_bool(params.mutation_rate) {
                    operators::swap_mutation(&mut child, &mut rng);
                    genome::repair(&mut child, &self.ctx.prerequisites);
                }
                next.push(child);
            }
            population = next;
        }

        let best_genome = best_genome.expect("at least one generation is evaluated");
        let best = self.decoder.decode(&best_genome)?;
        Ok(GaOutcome {
            best,
            score: best_score,
            partial,
            generations_run,
        })
    }

    /// Scores a generation in parallel, collecting by genome index.
    fn evaluate_generation(&self, population: &[Genome]) -> Result<Vec<f64>, ScheduleError> {
        population
            .par_iter()
            .map(|genome| {
                let outcome = self.decoder.decode(genome)?;
                Ok(score(
                    &outcome,
                    self.ctx,
                    &self.weights,
                    self.mold_change_hours,
                    self.color_change_hours,
                ))
            })
            .collect()
    }
}
