//! Aggregate module — combined scene view
//!
//! Joins the fragment, prompt and image sequences by position at read time.

pub mod composite;
pub mod handler;

pub use composite::{Aggregator, Composite, CompositeLengths, CompositeRecord};
pub use handler::{aggregate_router, AggregateState};
