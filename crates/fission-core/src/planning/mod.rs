//! Decomposition planning: inheritance/completeness duplication, boundary
//! detection, API-class aggregation, and transitive proxy planning.

pub mod boundaries;
pub mod inheritance;
pub mod preprocessing;
pub mod proxies;
