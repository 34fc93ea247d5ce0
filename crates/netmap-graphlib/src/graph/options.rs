//! Graph configuration options.

#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    /// Allows nodes to own child nodes (see [`Graph::set_parent`](super::Graph::set_parent)).
    pub compound: bool,
    /// Removing a parent also removes every node it owns.
    pub cascade_children: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            compound: true,
            cascade_children: true,
        }
    }
}
