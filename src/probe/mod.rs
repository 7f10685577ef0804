pub mod reachability;
pub mod target;

pub use reachability::{CheckResult, ReachabilityChecker};
pub use target::{plan_targets, OriginAddr, ProbeTarget};
