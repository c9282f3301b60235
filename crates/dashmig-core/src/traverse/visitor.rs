//! Visitor seam of the traversal engine

use super::accumulate::Accumulate;
use super::stack::ContextStack;
use serde_json::Value;

/// Work applied at every node a traversal reaches
///
/// The node may be mutated in place. The stack tells where the node is; its
/// top frame names the node's kind.
pub trait Visitor {
    /// Merged result of the whole traversal
    type Output: Accumulate;
    /// Error aborting the traversal
    type Error;

    /// Visit one node
    ///
    /// # Errors
    /// Any error aborts the traversal and is returned to its caller.
    fn visit(&mut self, node: &mut Value, stack: &ContextStack) -> Result<Self::Output, Self::Error>;
}

impl<V: Visitor + ?Sized> Visitor for &mut V {
    type Output = V::Output;
    type Error = V::Error;

    fn visit(&mut self, node: &mut Value, stack: &ContextStack) -> Result<Self::Output, Self::Error> {
        (**self).visit(node, stack)
    }
}
