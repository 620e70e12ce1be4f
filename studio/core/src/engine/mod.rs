//! Poster engine implementations.
//!
//! [`traits`] defines the boundary contract the generation pipeline speaks;
//! [`command`] drives a real engine executable as a subprocess. Tests
//! substitute in-memory stubs.

pub mod command;
pub mod traits;

pub use command::CommandEngine;
pub use traits::{Coordinates, PosterEngine, RenderError, RenderJob, ResolveError};
