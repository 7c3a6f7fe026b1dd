//! dotmap - Dot-density population maps from region boundaries
//!
//! Dots are placed by rejection sampling inside each region's polygons,
//! split across multi-part regions by area, and cached per (region, count).

pub mod api;
pub mod batch;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod render;
pub mod sampling;
