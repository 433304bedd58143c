/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Catalog loading and normalization (catalog.rs)
/// - The filtered, sorted view list (filter.rs)

pub mod catalog;
pub mod data;
pub mod filter;
