// Provider site listing

pub mod lister;
pub mod model;

pub use lister::SiteLister;
pub use model::{extract_sites, Site};
