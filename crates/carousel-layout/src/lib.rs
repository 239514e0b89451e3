// ABOUTME: Declarative view layout for carousel.
// ABOUTME: Views are placed by linear constraints resolved in batch layout passes.

mod constraint;
mod engine;
mod error;
mod tree;

pub use constraint::{Attribute, Constraint, ConstraintBatch, ConstraintId, Relation};
pub use engine::{LayoutEngine, LayoutReport};
pub use error::LayoutError;
pub use tree::{ScrollState, View, ViewId, ViewKind, ViewTree};
