//! Trajectory analysis and CASA motility metrics.
//!
//! Pure domain logic with no I/O: validate a tracked object's samples
//! ([`trajectory`]), compute its kinematic metrics ([`casa`]), and aggregate
//! a run ([`motility`], [`summary`]). Every function here is synchronous and
//! free of shared mutable state, so callers may fan trajectories out across
//! threads or tasks freely.

pub mod calibration;
pub mod casa;
pub mod decimal;
pub mod error;
pub mod motility;
pub mod quality;
pub mod summary;
pub mod threshold_validation;
pub mod trajectory;
pub mod types;
