//! SmartSave: compound-growth projection for a monthly savings plan.
//!
//! [`core`] holds the projection engine and outcome tiers, [`present`] the
//! display formatting and chart snapshots, [`report`] the printable report,
//! and [`api`] the HTTP server and command line.

pub mod api;
pub mod core;
pub mod present;
pub mod report;
