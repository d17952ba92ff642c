//! Monthly production scheduler for injection-molding plants.
//!
//! Given a machine fleet, a mold library, and component demands with
//! due dates and prerequisites, produces a day-by-day per-machine
//! timeline of mold changes, color changes, waits, and production runs.
//! A genetic algorithm searches over component priority permutations; a
//! deterministic decoder turns each permutation into a schedule that
//! honors mold exclusivity across machines, group/tonnage
//! compatibility, prerequisite completion, and per-day capacity.
//!
//! The result is a *draft* plan: unmet demand is reported, never
//! silently dropped, and human planners finalize the output.
//!
//! # Modules
//!
//! - **`models`**: domain types — `Machine`, `Mold`, `Component`,
//!   `Schedule`, `Assignment`
//! - **`validation`**: request integrity checks and the normalized
//!   planning context
//! - **`prereq`**: topological levels and GA seeding bias
//! - **`decoder`**: the deterministic permutation → schedule constructor
//! - **`fitness`**: weighted schedule scoring
//! - **`ga`**: the genetic search driver and operators
//! - **`api`**: request/response contract and [`api::solve`]
//! - **`server`**: thin axum surface over the contract
//!
//! # Quick Start
//!
//! ```no_run
//! use taskalign_scheduler::api::{solve, ScheduleRequest};
//!
//! let request: ScheduleRequest = serde_json::from_str(r#"{
//!     "month_days": 3,
//!     "mold_change_time_hours": 1.0,
//!     "color_change_time_hours": 0.5,
//!     "machines": [{"id": "M1", "name": "Press 1", "group": "small",
//!                   "tonnage": 120, "hours_per_day": 12, "efficiency": 1.0}],
//!     "molds": [{"id": "MO1", "name": "Lid", "group": "small", "tonnage": 80}],
//!     "components": [{"id": "C1", "name": "Lid red", "quantity": 800,
//!                     "cycle_time_sec": 40, "mold_id": "MO1", "color": "red",
//!                     "due_day": 3, "lead_time_days": 0}],
//!     "seed": 42
//! }"#).unwrap();
//!
//! let response = solve(&request).unwrap();
//! println!("score {} with {} tasks", response.score, response.assignments.len());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"

pub mod api;
pub mod decoder;
pub mod error;
pub mod fitness;
pub mod ga;
pub mod logging;
pub mod models;
pub mod prereq;
pub mod server;
pub mod validation;

pub use api::{solve, solve_with_cancel, ScheduleRequest, ScheduleResponse};
pub use error::{ScheduleError, ValidationError, ValidationErrorKind};
