//! Graph container backing the netmap topology model.
//!
//! The container is a directed multigraph: every edge carries a name (the link id), so two
//! physical links between the same pair of nodes coexist. Compound mode lets a node own child
//! nodes; the map model uses it to embed badges inside the node they decorate.

mod graph;

pub use graph::{EdgeKey, Graph, GraphOptions};
