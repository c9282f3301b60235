//! Traversal engine
//!
//! A walk visits every place of a card or dashboard document that can hold
//! a reference or a label, depth-first, keeping a [`ContextStack`] of where
//! it is. What happens at each place is up to the [`Visitor`]; the same walk
//! drives reference rewriting, label collection and label replacement.

mod accumulate;
mod stack;
mod visitor;
mod walk;

pub use accumulate::Accumulate;
pub use stack::{ContextStack, Frame, StackElement, StackGuard};
pub use visitor::Visitor;
pub use walk::{walk_card, walk_dashboard};
