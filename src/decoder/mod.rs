//! Permutation decoder.
//!
//! Turns a component priority permutation (the GA genome) into a
//! concrete day-by-day, per-machine schedule. The decoder is fully
//! deterministic: all randomness lives in the GA driver.
//!
//! # Algorithm
//!
//! Components are placed one at a time in permutation order. For each
//! component the decoder projects, on every admitting machine, the
//! earliest production block that respects setups, per-day capacity,
//! mold exclusivity across the fleet, and prerequisite completion. The
//! lowest-cost machine wins (earliest start, then no mold change, then
//! no color change, then tighter packing, then ascending machine id),
//! and the component is drained onto it day by day until the demand is
//! met or the month ends. Whatever cannot be placed is reported in the
//! `unmet` map.
//!
//! Changeovers always precede production within a block; when both are
//! needed the color change comes first, then the mold change. A
//! prerequisite finishing later the same day is bridged with an
//! explicit WAIT between the setups and the production run; waits count
//! against the day's capacity, and a mounted mold stays reserved
//! through them.

mod intervals;

use std::collections::BTreeMap;

use intervals::MoldBusy;

use crate::error::ScheduleError;
use crate::models::{Assignment, Schedule};
use crate::validation::PlanningContext;

const EPS: f64 = 1e-9;
/// Tolerance on per-day capacity sums.
const CAPACITY_EPS: f64 = 1e-6;

/// Aggregates reported alongside a decoded schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeSummary {
    /// Total hours consumed across all assignments.
    pub total_used_hours: f64,
    /// Number of CHANGE_MOLD tasks.
    pub mold_changes: u32,
    /// Number of CHANGE_COLOR tasks.
    pub color_changes: u32,
    /// Total hours spent in WAIT tasks.
    pub wait_hours: f64,
}

impl DecodeSummary {
    /// Total changeover task count.
    #[inline]
    pub fn changeovers(&self) -> u32 {
        self.mold_changes + self.color_changes
    }
}

/// Result of decoding one permutation.
#[derive(Debug, Clone)]
pub struct DecodeOutcome {
    /// The concrete timeline, sorted by (day, machine, sequence).
    pub schedule: Schedule,
    /// Component id → residual pieces. Fully produced components are
    /// absent.
    pub unmet: BTreeMap<String, i64>,
    /// Aggregates for scoring.
    pub summary: DecodeSummary,
}

/// Deterministic permutation → schedule constructor.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    ctx: &'a PlanningContext<'a>,
    month_days: u32,
    mold_change_hours: f64,
    color_change_hours: f64,
}

/// Carry-over state of one machine during simulation.
#[derive(Debug, Clone)]
struct MachineSim {
    day: u32,
    /// Hours consumed today; doubles as the cursor for the next task.
    used: f64,
    /// Next 1-based sequence number within the current day.
    seq: u32,
    mold: Option<usize>,
    color: Option<String>,
}

impl MachineSim {
    fn fresh() -> Self {
        Self {
            day: 1,
            used: 0.0,
            seq: 1,
            mold: None,
            color: None,
        }
    }
}

/// A feasible production block found by the projection step: optional
/// leading wait (mold window slide), optional setups, optional
/// prerequisite wait, then one production run.
#[derive(Debug, Clone)]
struct BlockPlan {
    day: u32,
    pre_wait: Option<(f64, f64)>,
    color_change: Option<(f64, f64)>,
    mold_change: Option<(f64, f64)>,
    gate_wait: Option<(f64, f64)>,
    produce_start: f64,
    produce_end: f64,
    qty: i64,
    need_color: bool,
    need_mold: bool,
}

/// Lexicographic machine-choice cost for a component's first block.
#[derive(Debug, Clone)]
struct PlacementCost<'a> {
    day: u32,
    produce_start: f64,
    mold_change: bool,
    color_change: bool,
    remaining_capacity: f64,
    machine_id: &'a str,
}

impl PlacementCost<'_> {
    fn better_than(&self, other: &Self) -> bool {
        if self.day != other.day {
            return self.day < other.day;
        }
        match self.produce_start.total_cmp(&other.produce_start) {
            std::cmp::Ordering::Less => return true,
            std::cmp::Ordering::Greater => return false,
            std::cmp::Ordering::Equal => {}
        }
        if self.mold_change != other.mold_change {
            return !self.mold_change;
        }
        if self.color_change != other.color_change {
            return !self.color_change;
        }
        match self.remaining_capacity.total_cmp(&other.remaining_capacity) {
            std::cmp::Ordering::Less => return true,
            std::cmp::Ordering::Greater => return false,
            std::cmp::Ordering::Equal => {}
        }
        self.machine_id < other.machine_id
    }
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over a validated planning context.
    pub fn new(
        ctx: &'a PlanningContext<'a>,
        month_days: u32,
        mold_change_hours: f64,
        color_change_hours: f64,
    ) -> Self {
        Self {
            ctx,
            month_days,
            mold_change_hours,
            color_change_hours,
        }
    }

    /// Decodes a permutation of component indices into a schedule.
    ///
    /// # Errors
    /// [`ScheduleError::Internal`] if an emitted task would violate a
    /// timeline invariant; this indicates a decoder bug, never bad
    /// input.
    pub fn decode(&self, permutation: &[usize]) -> Result<DecodeOutcome, ScheduleError> {
        debug_assert_eq!(permutation.len(), self.ctx.components.len());
        let mut run = Run::new(self);

        for &ci in permutation {
            let Some(gate) = run.prereq_gate(ci) else {
                // Some prerequisite never completed: the component
                // cannot start at all and stays unmet in full.
                continue;
            };

            let mold = self.ctx.component_mold[ci];
            let mut best: Option<(PlacementCost<'_>, usize, BlockPlan)> = None;
            for &mi in &self.ctx.admitting_machines[mold] {
                let Some(plan) = run.find_block(mi, ci, gate) else {
                    continue;
                };
                let machine = &self.ctx.machines[mi];
                let day_used = if plan.day == run.sims[mi].day {
                    run.sims[mi].used
                } else {
                    0.0
                };
                let cost = PlacementCost {
                    day: plan.day,
                    produce_start: plan.produce_start,
                    mold_change: plan.need_mold,
                    color_change: plan.need_color,
                    remaining_capacity: machine.capacity() - day_used,
                    machine_id: &machine.id,
                };
                match &best {
                    Some((incumbent, _, _)) if !cost.better_than(incumbent) => {}
                    _ => best = Some((cost, mi, plan)),
                }
            }

            let Some((_, mi, first_plan)) = best else {
                continue; // no machine can fit this component this month
            };
            run.commit(mi, ci, first_plan)?;

            while run.remaining[ci] > 0 {
                match run.find_block(mi, ci, gate) {
                    Some(plan) => run.commit(mi, ci, plan)?,
                    None => break, // month exhausted; residual stays unmet
                }
            }
        }

        Ok(run.finish())
    }
}

/// Mutable state of one decode pass.
struct Run<'a, 'd> {
    dec: &'d Decoder<'a>,
    sims: Vec<MachineSim>,
    busy: MoldBusy,
    remaining: Vec<i64>,
    /// (day, hour) at which each component reached full quantity.
    completion: Vec<Option<(u32, f64)>>,
    schedule: Schedule,
    summary: DecodeSummary,
}

impl<'a, 'd> Run<'a, 'd> {
    fn new(dec: &'d Decoder<'a>) -> Self {
        let ctx = dec.ctx;
        Self {
            dec,
            sims: vec![MachineSim::fresh(); ctx.machines.len()],
            busy: MoldBusy::new(ctx.molds.len(), dec.month_days),
            remaining: ctx.components.iter().map(|c| c.quantity).collect(),
            completion: vec![None; ctx.components.len()],
            schedule: Schedule::new(),
            summary: DecodeSummary::default(),
        }
    }

    /// Earliest (day, hour) at which all prerequisites of `ci` are fully
    /// produced, or `None` if some prerequisite never completes.
    fn prereq_gate(&self, ci: usize) -> Option<(u32, f64)> {
        let mut gate = (1u32, 0.0f64);
        for &pi in &self.dec.ctx.prerequisites[ci] {
            if self.remaining[pi] > 0 {
                return None;
            }
            let (day, hour) = self.completion[pi].expect("completed component has a finish time");
            if day > gate.0 || (day == gate.0 && hour > gate.1) {
                gate = (day, hour);
            }
        }
        Some(gate)
    }

    /// Projects the next feasible production block of `ci` on machine
    /// `mi`, starting from the machine's current (day, cursor). Pure:
    /// commits nothing.
    fn find_block(&self, mi: usize, ci: usize, gate: (u32, f64)) -> Option<BlockPlan> {
        let dec = self.dec;
        let ctx = dec.ctx;
        let machine = &ctx.machines[mi];
        let component = &ctx.components[ci];
        let mold = ctx.component_mold[ci];
        let cap = machine.capacity();
        let h = component.piece_hours();
        let sim = &self.sims[mi];

        let need_color = sim.color.as_deref() != Some(component.color.as_str());
        let need_mold = sim.mold != Some(mold);
        let color_cost = if need_color { dec.color_change_hours } else { 0.0 };
        let mold_cost = if need_mold { dec.mold_change_hours } else { 0.0 };

        let mut day = sim.day.max(gate.0);
        let mut cursor = if day == sim.day { sim.used } else { 0.0 };

        while day <= dec.month_days {
            let gate_hour = if day == gate.0 { gate.1 } else { 0.0 };
            let busy = self.busy.day(mold, day);

            // Slide the block start past mold conflicts within the day.
            let mut b = cursor;
            loop {
                let color_start = b;
                let mold_start = color_start + color_cost;
                let after_setup = mold_start + mold_cost;
                let produce_start = after_setup.max(gate_hour);
                if produce_start + h > cap + EPS {
                    break; // setups + one piece don't fit today
                }

                // The mold is held from mount (or from the block start
                // when it is already on this machine) through at least
                // the first piece.
                let hold_start = if need_mold && mold_cost > 0.0 {
                    mold_start
                } else {
                    b
                };
                if !busy.is_free(hold_start, produce_start + h) {
                    let width = produce_start + h - hold_start;
                    match busy.next_free_window(hold_start, width, cap) {
                        Some(t) if t > hold_start + EPS => {
                            b += t - hold_start;
                            continue;
                        }
                        _ => break, // no window wide enough today
                    }
                }

                // Never run into a later reservation of the same mold.
                let hard_end = busy
                    .next_busy_start(produce_start)
                    .map_or(cap, |s| s.min(cap));
                let avail = hard_end - produce_start;
                let qty = self.remaining[ci].min(((avail + EPS) / h).floor() as i64);
                if qty <= 0 {
                    break;
                }
                let produce_end = produce_start + qty as f64 * h;

                return Some(BlockPlan {
                    day,
                    pre_wait: (b > cursor + EPS).then_some((cursor, b)),
                    color_change: (need_color && color_cost > 0.0)
                        .then_some((color_start, color_start + color_cost)),
                    mold_change: (need_mold && mold_cost > 0.0)
                        .then_some((mold_start, mold_start + mold_cost)),
                    gate_wait: (produce_start > after_setup + EPS)
                        .then_some((after_setup, produce_start)),
                    produce_start,
                    produce_end,
                    qty,
                    need_color,
                    need_mold,
                });
            }

            day += 1;
            cursor = 0.0;
        }
        None
    }

    /// Commits a planned block: emits its tasks, reserves mold
    /// occupancy, and advances machine and demand state.
    fn commit(&mut self, mi: usize, ci: usize, plan: BlockPlan) -> Result<(), ScheduleError> {
        let ctx = self.dec.ctx;
        let machine = &ctx.machines[mi];
        let component = &ctx.components[ci];
        let mold = ctx.component_mold[ci];
        let cap = machine.capacity();

        if plan.day > self.sims[mi].day {
            let sim = &mut self.sims[mi];
            sim.day = plan.day;
            sim.used = 0.0;
            sim.seq = 1;
        }

        if let Some((start, end)) = plan.pre_wait {
            let seq = self.sims[mi].seq;
            self.emit(
                mi,
                Assignment::wait(plan.day, &machine.id, &machine.name, seq, start, end, cap),
                cap,
            )?;
            self.summary.wait_hours += end - start;
        }

        if plan.need_color {
            if let Some((start, end)) = plan.color_change {
                let seq = self.sims[mi].seq;
                let from = self.sims[mi].color.clone();
                self.emit(
                    mi,
                    Assignment::change_color(
                        plan.day,
                        &machine.id,
                        &machine.name,
                        seq,
                        start,
                        end,
                        cap,
                        from.as_deref(),
                        &component.color,
                    ),
                    cap,
                )?;
                self.summary.color_changes += 1;
            }
            self.sims[mi].color = Some(component.color.clone());
        }

        if plan.need_mold {
            if let Some((start, end)) = plan.mold_change {
                let seq = self.sims[mi].seq;
                let from = self.sims[mi].mold.map(|m| ctx.molds[m].id.clone());
                self.emit(
                    mi,
                    Assignment::change_mold(
                        plan.day,
                        &machine.id,
                        &machine.name,
                        seq,
                        start,
                        end,
                        cap,
                        from.as_deref(),
                        &component.mold_id,
                    ),
                    cap,
                )?;
                self.busy.reserve(mold, plan.day, start, end);
                self.summary.mold_changes += 1;
            }
            self.sims[mi].mold = Some(mold);
        }

        if let Some((start, end)) = plan.gate_wait {
            let seq = self.sims[mi].seq;
            self.emit(
                mi,
                Assignment::wait(plan.day, &machine.id, &machine.name, seq, start, end, cap),
                cap,
            )?;
            // The mounted mold stays with this machine through the wait.
            self.busy.reserve(mold, plan.day, start, end);
            self.summary.wait_hours += end - start;
        }

        let seq = self.sims[mi].seq;
        self.emit(
            mi,
            Assignment::produce(
                plan.day,
                &machine.id,
                &machine.name,
                seq,
                plan.produce_start,
                plan.produce_end,
                cap,
                &component.id,
                &component.name,
                &component.mold_id,
                &component.color,
                plan.qty,
            ),
            cap,
        )?;
        self.busy
            .reserve(mold, plan.day, plan.produce_start, plan.produce_end);

        self.remaining[ci] -= plan.qty;
        if self.remaining[ci] <= 0 {
            self.completion[ci] = Some((plan.day, plan.produce_end));
        }
        Ok(())
    }

    /// Emits one task, guarding the timeline invariants at commit time.
    fn emit(&mut self, mi: usize, assignment: Assignment, cap: f64) -> Result<(), ScheduleError> {
        let sim = &mut self.sims[mi];
        if assignment.start_hour < -EPS
            || assignment.end_hour < assignment.start_hour - EPS
            || assignment.end_hour > cap + CAPACITY_EPS
            || (assignment.start_hour - sim.used).abs() > CAPACITY_EPS
            || assignment.day < 1
            || assignment.day > self.dec.month_days
        {
            return Err(ScheduleError::Internal(format!(
                "invalid task emitted on machine '{}' day {}: [{:.6}, {:.6}) with cursor {:.6}",
                assignment.machine_id,
                assignment.day,
                assignment.start_hour,
                assignment.end_hour,
                sim.used,
            )));
        }
        sim.used = assignment.end_hour;
        sim.seq += 1;
        self.summary.total_used_hours += assignment.used_hours;
        self.schedule.push(assignment);
        Ok(())
    }

    fn finish(mut self) -> DecodeOutcome {
        self.schedule.sort();
        let unmet = self
            .dec
            .ctx
            .components
            .iter()
            .zip(&self.remaining)
            .filter(|(_, &r)| r > 0)
            .map(|(c, &r)| (c.id.clone(), r))
            .collect();
        DecodeOutcome {
            schedule: self.schedule,
            unmet,
            summary: self.summary,
        }
    }
}
