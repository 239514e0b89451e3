// ABOUTME: Errors raised when a view or constraint descriptor is malformed.
// ABOUTME: Conflicting but well-formed constraints are logged by the engine instead.

use crate::{Attribute, ViewId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("Unknown view {0:?}")]
    UnknownView(ViewId),

    #[error("View {0:?} is not a scroll view")]
    NotAScrollView(ViewId),

    #[error("Cannot relate {0:?} to {1:?}")]
    IncompatibleAttributes(Attribute, Attribute),

    #[error("{0:?} needs a target view")]
    MissingTarget(Attribute),

    #[error("Multiplier and constant must be finite")]
    NonFinite,

    #[error("Views {0:?} and {1:?} share no common ancestor")]
    NoCommonAncestor(ViewId, ViewId),
}
