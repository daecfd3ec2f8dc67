use crate::scene::NodeId;
use ahash::{HashMap, HashMapExt};
use std::collections::hash_map::Entry;

/// Maps node names to the transform node created for them. The scene graph
/// owns the nodes; this only holds ids.
#[derive(Clone, Debug, Default)]
pub struct NameIndex {
    map: HashMap<String, NodeId>,
}

impl NameIndex {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Binds `name` to `id` unless the name is already bound. Returns false
    /// for a duplicate, in which case the existing binding is unchanged.
    pub fn register(&mut self, name: &str, id: NodeId) -> bool {
        match self.map.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(id);
                true
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.map.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.map.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the names from `names` that have no binding, in the order
    /// given. Useful for callers that want to audit rig coverage.
    pub fn unbound<'a, I>(&self, names: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().filter(|n| !self.contains(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeKind, SceneGraph};

    #[test]
    fn first_binding_wins() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let first = graph.add_child(root, NodeKind::Group(None));
        let second = graph.add_child(root, NodeKind::Group(None));

        let mut index = NameIndex::new();
        assert!(index.register("Arm", first));
        assert!(!index.register("Arm", second));
        assert_eq!(index.get("Arm"), Some(first));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn unbound_names_in_order() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let arm = graph.add_child(root, NodeKind::Group(None));
        let mut index = NameIndex::new();
        index.register("Arm", arm);
        let missing = index.unbound(["Ghost", "Arm", "Leg"]);
        assert_eq!(missing, vec!["Ghost", "Leg"]);
        assert!(index.get("Ghost").is_none());
    }
}
