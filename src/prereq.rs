//! Prerequisite engine.
//!
//! Derives the topological structure of the component dependency graph:
//! per-component *levels* (prerequisite-free components at level 0, each
//! dependent one level above its deepest prerequisite) and the latest
//! acceptable finish day per component. Levels seed the genetic
//! algorithm's initial population through a bias-preserving shuffle that
//! never interleaves a higher-level component before a lower one.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::validation::PlanningContext;

/// Topological structure of the prerequisite graph.
#[derive(Debug)]
pub struct PrereqEngine {
    /// Component index → topological level (leaves at 0).
    pub level: Vec<u32>,
    /// Component indices grouped by level, ascending.
    pub by_level: Vec<Vec<usize>>,
    /// Component index → `due_day − lead_time_days`, clamped to day 1.
    pub required_finish_day: Vec<u32>,
}

impl PrereqEngine {
    /// Computes levels and finish-day targets from a validated context.
    ///
    /// Walks components in topological order, so every prerequisite's
    /// level is known when its dependents are visited.
    pub fn new(ctx: &PlanningContext<'_>) -> Self {
        let n = ctx.components.len();
        let mut level = vec![0u32; n];
        for &ci in &ctx.topo_order {
            level[ci] = ctx.prerequisites[ci]
                .iter()
                .map(|&pi| level[pi] + 1)
                .max()
                .unwrap_or(0);
        }

        let max_level = level.iter().copied().max().unwrap_or(0);
        let mut by_level: Vec<Vec<usize>> = vec![Vec::new(); max_level as usize + 1];
        // Fill in topological order so each level bucket stays in the
        // validator's deterministic (due_day, id) order.
        for &ci in &ctx.topo_order {
            by_level[level[ci] as usize].push(ci);
        }
        if n == 0 {
            by_level.clear();
        }

        let required_finish_day = ctx
            .components
            .iter()
            .map(|c| c.due_day.saturating_sub(c.lead_time_days).max(1))
            .collect();

        Self {
            level,
            by_level,
            required_finish_day,
        }
    }

    /// A permutation that shuffles within each level but keeps all of
    /// level k before any of level k+1. Topologically valid by
    /// construction.
    pub fn biased_shuffle<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let mut genome = Vec::new();
        for bucket in &self.by_level {
            let mut slice: Vec<usize> = bucket.clone();
            slice.shuffle(rng);
            genome.extend(slice);
        }
        genome
    }
}
