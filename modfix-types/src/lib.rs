//! Shared DTOs for the modfix workspace.
//!
//! # Design constraints
//! - Everything here is request-scoped data; nothing holds process-wide state.
//! - Cross references are arena indices (`UnitId`, `DeclId`, `GroupId`), never pointers.
//! - All types serialize, so a front end can hand over a snapshot as JSON.

pub mod ast;
pub mod diagnostic;
pub mod ops;
pub mod plan;
pub mod proposal;

#[cfg(feature = "fixtures")]
pub mod fixture;
