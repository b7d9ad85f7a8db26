//! Checkout planning
//!
//! Switching to another commit rewrites the working tree under the tracked
//! namespace so it matches the commit's tree. Planning is pure; the
//! workspace applies the plan and collects per-file failures.

pub mod migration;
