//! Per-(mold, day) busy-interval store.
//!
//! Molds are shared across the fleet: at most one machine may hold a
//! given mold at any instant. Occupancy is tracked as ordered lists of
//! half-open `[start, end)` hour intervals, one list per (mold, day).
//! Queries are linear scans; production sizes (tens of molds × tens of
//! days × tens of intervals) don't warrant anything heavier.

const EPS: f64 = 1e-9;

#[inline]
fn overlaps(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> bool {
    !(a_end <= b_start + EPS || b_end <= a_start + EPS)
}

/// An ordered list of disjoint half-open busy intervals within one day.
#[derive(Debug, Clone, Default)]
pub struct IntervalSet {
    intervals: Vec<(f64, f64)>,
}

impl IntervalSet {
    /// Whether `[start, end)` overlaps no recorded interval.
    pub fn is_free(&self, start: f64, end: f64) -> bool {
        self.intervals
            .iter()
            .all(|&(s, e)| !overlaps(s, e, start, end))
    }

    /// Records `[start, end)`, preserving start order.
    ///
    /// Zero-width spans are ignored.
    pub fn reserve(&mut self, start: f64, end: f64) {
        if end - start <= EPS {
            return;
        }
        let pos = self
            .intervals
            .iter()
            .position(|&(s, _)| s > start)
            .unwrap_or(self.intervals.len());
        self.intervals.insert(pos, (start, end));
    }

    /// Earliest `t >= after` such that `[t, t + width)` is fully free
    /// and `t + width <= cap`. Jumps over each blocking interval to its
    /// end, so the result is the first gap wide enough for the whole
    /// window rather than the first instant the mold is momentarily
    /// idle.
    pub fn next_free_window(&self, after: f64, width: f64, cap: f64) -> Option<f64> {
        let width = width.max(0.0);
        let mut t = after;
        while t + width <= cap + EPS {
            let blocking = self
                .intervals
                .iter()
                .filter(|&&(s, e)| overlaps(s, e, t, t + width))
                .map(|&(_, e)| e)
                .fold(None::<f64>, |acc, e| Some(acc.map_or(e, |a| a.max(e))));
            match blocking {
                None => return Some(t),
                Some(end) => {
                    if end <= t + EPS {
                        return None;
                    }
                    t = end;
                }
            }
        }
        None
    }

    /// Start of the first interval beginning strictly after `after`.
    pub fn next_busy_start(&self, after: f64) -> Option<f64> {
        self.intervals
            .iter()
            .map(|&(s, _)| s)
            .filter(|&s| s >= after + EPS)
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.min(s))))
    }

    /// Number of recorded intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether no interval is recorded.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Busy intervals for every (mold, day) pair of the planning month.
#[derive(Debug)]
pub struct MoldBusy {
    month_days: u32,
    // mold-major: slots[mold][day - 1]
    slots: Vec<Vec<IntervalSet>>,
}

impl MoldBusy {
    /// Creates an empty store for `n_molds` molds over `month_days` days.
    pub fn new(n_molds: usize, month_days: u32) -> Self {
        Self {
            month_days,
            slots: vec![vec![IntervalSet::default(); month_days as usize]; n_molds],
        }
    }

    /// The interval set for `(mold, day)`; `day` is 1-based.
    pub fn day(&self, mold: usize, day: u32) -> &IntervalSet {
        debug_assert!(day >= 1 && day <= self.month_days);
        &self.slots[mold][day as usize - 1]
    }

    /// Records a busy span for `(mold, day)`.
    pub fn reserve(&mut self, mold: usize, day: u32, start: f64, end: f64) {
        debug_assert!(day >= 1 && day <= self.month_days);
        self.slots[mold][day as usize - 1].reserve(start, end);
    }
}
