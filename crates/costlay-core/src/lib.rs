//! Core library for costlay: usage table extraction, hourly aggregation,
//! chart / fallback / summary rendering and the reactive observation loop.

pub mod config;
pub mod dom;
pub mod monitor;
pub mod page;
pub mod patch;
pub mod render;
pub mod usage;
