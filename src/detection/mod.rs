//! Detection collaborator interface.
//!
//! The generation pipeline does not know how stacks are recognised or how
//! artifacts are rendered. It talks to a [`Detector`], which returns a
//! [`StackPack`] for the project; the pack analyzes the project and writes
//! each artifact. Built-in packs live in [`crate::packs`].

pub mod types;

pub use types::{Artifact, Detector, StackPack};
