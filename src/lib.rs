pub mod config;
pub mod error;
pub mod http_client;
pub mod concurrent;
pub mod sites;
pub mod probe;
pub mod waf;
pub mod output;

pub use crate::config::{Credentials, Options};
pub use crate::probe::{CheckResult, ReachabilityChecker};
pub use crate::sites::{Site, SiteLister};
