#![warn(missing_docs)]

//! Clearance rules, severity classification and resolution advice.
//!
//! This crate is pure policy: no geometry of its own. Given a signed
//! penetration from the narrow phase and a required clearance from the
//! table, [`classify`] grades the pair and [`recommend`] attaches the
//! advisory mitigation options. Both are deterministic, order-independent
//! functions, so a re-run over the same geometry always reproduces the
//! same records — the output is reviewed by engineers of record and must
//! be explainable.
//!
//! Severity thresholds are configurable policy with documented defaults,
//! not physical law.

mod classify;
mod clearance;
mod kind;
mod recommend;

pub use classify::{classify, Classification, Severity, SeverityPolicy};
pub use clearance::{ClearanceTable, ConfigError};
pub use kind::{trade_for, ElementKind, Trade};
pub use recommend::{recommend, CostImpact, Feasibility, RecommendationOption};
