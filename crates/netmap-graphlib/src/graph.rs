//! Core `Graph` container.
//!
//! Nodes and edges are stored in insertion order, which keeps iteration (and therefore any
//! serialized output) deterministic. Lookups go through Fx-hashed indices.

mod edge_key;
mod options;

pub use edge_key::EdgeKey;
pub use options::GraphOptions;

use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone)]
struct NodeEntry<N> {
    id: String,
    label: N,
}

/// A link stored under its unique name.
#[derive(Debug, Clone)]
struct EdgeEntry<E> {
    key: EdgeKey,
    label: E,
}

pub struct Graph<N, E> {
    options: GraphOptions,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<String, usize>,

    parent: HashMap<String, String>,
    children: HashMap<String, Vec<String>>,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new(GraphOptions::default())
    }
}

impl<N, E> Graph<N, E> {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            parent: HashMap::default(),
            children: HashMap::default(),
        }
    }

    /// Drops every node and edge while keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.node_index.clear();
        self.edges.clear();
        self.edge_index.clear();
        self.parent.clear();
        self.children.clear();
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
        });
        self.node_index.insert(id, idx);
        self
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].label)
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut N),
    {
        for n in &mut self.nodes {
            f(&n.id, &mut n.label);
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_entries(&self) -> impl Iterator<Item = (&str, &N)> {
        self.nodes.iter().map(|n| (n.id.as_str(), &n.label))
    }

    pub fn edge_entries(&self) -> impl Iterator<Item = (&EdgeKey, &E)> {
        self.edges.iter().map(|e| (&e.key, &e.label))
    }

    pub fn edge_names(&self) -> Vec<String> {
        self.edges.iter().map(|e| e.key.name.clone()).collect()
    }

    /// Inserts (or relabels) the edge called `name` between `v` and `w`.
    ///
    /// Returns `false` without touching the graph when either endpoint is missing: edges never
    /// implicitly create nodes.
    pub fn set_edge(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: impl Into<String>,
        label: E,
    ) -> bool {
        let key = EdgeKey::new(v, w, name);
        if !self.has_node(&key.v) || !self.has_node(&key.w) {
            return false;
        }
        if let Some(&idx) = self.edge_index.get(&key.name) {
            self.edges[idx] = EdgeEntry { key, label };
            return true;
        }
        let idx = self.edges.len();
        self.edge_index.insert(key.name.clone(), idx);
        self.edges.push(EdgeEntry { key, label });
        true
    }

    pub fn edge(&self, name: &str) -> Option<&E> {
        self.edge_index.get(name).map(|&idx| &self.edges[idx].label)
    }

    pub fn edge_mut(&mut self, name: &str) -> Option<&mut E> {
        self.edge_index
            .get(name)
            .copied()
            .map(move |idx| &mut self.edges[idx].label)
    }

    /// Removes a node, its incident edges and (in cascading compound graphs) every node it owns.
    pub fn remove_node(&mut self, id: &str) -> bool {
        if !self.has_node(id) {
            return false;
        }

        let owned = self.children.remove(id).unwrap_or_default();
        for child in owned {
            self.parent.remove(&child);
            if self.options.cascade_children {
                self.remove_node(&child);
            }
        }

        let Some(idx) = self.node_index.remove(id) else {
            return false;
        };
        self.nodes.remove(idx);
        for i in idx..self.nodes.len() {
            let node_id = self.nodes[i].id.as_str();
            if let Some(v) = self.node_index.get_mut(node_id) {
                *v = i;
            }
        }

        let before = self.edges.len();
        self.edges.retain(|e| !e.key.touches(id));
        if self.edges.len() != before {
            self.edge_index.clear();
            for (i, e) in self.edges.iter().enumerate() {
                self.edge_index.insert(e.key.name.clone(), i);
            }
        }

        if let Some(parent) = self.parent.remove(id) {
            if let Some(ch) = self.children.get_mut(&parent) {
                ch.retain(|c| c != id);
            }
        }

        true
    }

    /// Makes `parent` own `child`. Both nodes must already exist.
    pub fn set_parent(&mut self, child: &str, parent: &str) -> bool {
        if !self.options.compound || !self.has_node(child) || !self.has_node(parent) {
            return false;
        }
        if let Some(prev) = self.parent.insert(child.to_string(), parent.to_string()) {
            if let Some(ch) = self.children.get_mut(&prev) {
                ch.retain(|c| c != child);
            }
        }
        let entry = self.children.entry(parent.to_string()).or_default();
        if !entry.iter().any(|c| c == child) {
            entry.push(child.to_string());
        }
        true
    }

    pub fn children(&self, parent: &str) -> Vec<&str> {
        self.children
            .get(parent)
            .map(|v| v.iter().map(|s| s.as_str()).collect::<Vec<_>>())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph<u32, &'static str> {
        let mut g = Graph::default();
        g.set_node("a", 1).set_node("b", 2).set_node("c", 3);
        assert!(g.set_edge("a", "b", "l1", "ab"));
        assert!(g.set_edge("a", "b", "l2", "ab-2"));
        assert!(g.set_edge("b", "c", "l3", "bc"));
        g
    }

    #[test]
    fn parallel_edges_are_kept_apart_by_name() {
        let g = sample();
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.edge("l1"), Some(&"ab"));
        assert_eq!(g.edge("l2"), Some(&"ab-2"));
    }

    #[test]
    fn edges_require_existing_endpoints() {
        let mut g = sample();
        assert!(!g.set_edge("a", "zz", "l9", "dangling"));
        assert!(g.edge("l9").is_none());
        assert!(!g.has_node("zz"));
    }

    #[test]
    fn removing_a_node_drops_incident_edges_and_reindexes() {
        let mut g = sample();
        assert!(g.remove_node("a"));
        assert_eq!(g.edge_names(), vec!["l3".to_string()]);
        let (key, label) = g.edge_entries().next().expect("remaining edge");
        assert_eq!((key.v.as_str(), *label), ("b", "bc"));
        assert_eq!(g.node("c"), Some(&3));
    }

    #[test]
    fn owned_children_are_removed_with_their_parent() {
        let mut g = sample();
        g.set_node("a:badge", 10);
        assert!(g.set_parent("a:badge", "a"));
        assert_eq!(g.children("a"), vec!["a:badge"]);

        g.remove_node("a");
        assert!(!g.has_node("a:badge"));
        assert_eq!(g.node_entries().count(), 2);
    }

    #[test]
    fn removing_a_child_detaches_it_from_the_parent() {
        let mut g = sample();
        g.set_node("b:badge", 11);
        g.set_parent("b:badge", "b");
        assert!(g.remove_node("b:badge"));
        assert!(g.children("b").is_empty());
        assert!(g.has_node("b"));
    }
}
