//! 3-SAT instance model and prompt rendering.
//!
//! Holds the clauses of a 3-SAT problem, derives its variable set, and renders
//! the canonical natural-language problem statement handed to a language model.
//!
//! # Key types
//!
//! - [`Literal`] — a variable or its negation
//! - [`Clause`] — exactly three literals; the arity is structural
//! - [`Instance`] — an ordered list of clauses
//! - [`render_prompt`] — deterministic problem text for an instance
//! - [`parse_dimacs`] / [`random_instance`] — alternative instance sources

pub mod dimacs;
pub mod generate;
pub mod render;
pub mod types;

pub use dimacs::{load_dimacs, parse_dimacs};
pub use generate::random_instance;
pub use render::render_prompt;
pub use types::{Clause, Instance, InstanceError, Literal};
