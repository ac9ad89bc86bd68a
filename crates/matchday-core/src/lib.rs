//! Core types and the reconciliation engine for the matchday pipeline.
//!
//! This crate is deliberately free of HTTP and filesystem dependencies.
//! Collaborators hand it flat lists of [`Fixture`] records; it hands back the
//! canonical, windowed view that gets published.

pub mod collapse;
pub mod competition;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod placeholder;
pub mod reconcile;
pub mod tables;
pub mod window;

pub use engine::{Engine, Publication};
pub use error::{Error, Result};
pub use model::{Competition, Fixture, Source, Status};
pub use reconcile::SourcePriority;
pub use tables::Tables;
pub use window::WindowConfig;

#[cfg(test)]
mod tests;
