//! Core business logic - framework-agnostic budget, catalog and report operations.
//!
//! Every function takes a database connection and returns structured data. The view
//! layer decides how results and errors reach the user.

/// Budget creation, update and listing
pub mod budget;
/// Price database search, import and seeding
pub mod catalog;
/// Chapter creation and lookup
pub mod chapter;
/// Budget rollups and display formatting
pub mod report;
/// Service creation and lookup
pub mod service;
/// Form field parsing
pub mod validation;
