//! Behavioral affect monitor: eye closure, facial emotion, typing cadence
//! and scroll bursts fused into periodic study-state reports with
//! threshold-based alerts.

pub mod affect;
pub mod config;
pub mod constants;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod vision;
pub mod workers;
