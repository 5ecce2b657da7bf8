//! Data models for the exporter.
//!
//! - [`PackConfig`]: settings for `pack` mode, one consolidated content pack
//! - [`BatchConfig`]: settings for `json` mode, one descriptor per export target
//! - [`SingleTarget`] / [`BatchTarget`]: the fixed sets of export targets
//! - [`BatchReport`]: per-target outcomes collected by the batch orchestrator
//!
//! Defaults for every configuration field live in the `Default` impls and named
//! constants of [`config`], never inline at the call sites.

pub mod config;
pub mod target;

pub use config::{
    BatchConfig, MapStructureExport, PackConfig, PlayerExport, SpatialFilter, StructureExport,
    TamedExport, TribeExport, WildExport,
};
pub use target::{
    BatchReport, BatchTarget, FailurePolicy, SingleTarget, TargetOutcome, TargetStatus,
};
