// WAF edge fingerprinting for direct origin responses

pub mod detector;

pub use detector::{detect, WafSignature, SIGNATURES};
