//! Scene graph: an arena of [`SceneNode`]s addressed by [`NodeId`] handles
//!
//! Parents own an ordered child list; the parent link on each node is a plain
//! handle. All matrices follow the column-vector convention:
//!
//! - `local = T · R · S`
//! - `world = parent.world · local`
//!
//! Nothing is recomputed implicitly. After mutating a node's transform call
//! [`SceneGraph::compute_world_matrix`] (or [`SceneGraph::update_world_matrices`]
//! for the whole tree).

mod node;
mod serialize;

pub use node::{Material, MaterialKind, Mesh, NodeId, NodeKind, SceneNode};
pub use serialize::SerializedNode;

use std::collections::{HashMap, HashSet};

use crate::error::{SceneError, SceneResult};
use crate::geometry::Geometry;
use crate::math::SquareMatrix;

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<SceneNode>,
}

/// One mesh ready for the rendering backend
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub id: NodeId,
    pub name: String,
    /// World matrix, column-major
    pub world_matrix: [f32; 16],
    pub geometry: Geometry,
    pub material: Material,
}

/// Arena-backed node tree with a fixed root
#[derive(Debug, Clone)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl SceneGraph {
    /// Empty graph whose root is a scene node
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_root(SceneNode::scene(name))
    }

    pub fn with_root(root: SceneNode) -> Self {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        graph.root = graph.spawn(root);
        graph.refresh(graph.root);
        graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, attached or not
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a detached node; its links are cleared
    pub fn spawn(&mut self, mut node: SceneNode) -> NodeId {
        node.parent = None;
        node.children.clear();

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// Spawn a node and attach it under `parent`
    pub fn spawn_child(&mut self, parent: NodeId, node: SceneNode) -> SceneResult<NodeId> {
        self.get(parent)?;
        let id = self.spawn(node);
        self.add(parent, id)?;
        Ok(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_ok()
    }

    pub fn get(&self, id: NodeId) -> SceneResult<&SceneNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or_else(|| SceneError::NodeNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: NodeId) -> SceneResult<&mut SceneNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or_else(|| SceneError::NodeNotFound(id.to_string()))
    }

    pub fn parent(&self, id: NodeId) -> SceneResult<Option<NodeId>> {
        Ok(self.get(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> SceneResult<&[NodeId]> {
        Ok(&self.get(id)?.children)
    }

    /// `id` and every node below it, pre-order
    pub fn descendants(&self, id: NodeId) -> SceneResult<Vec<NodeId>> {
        self.get(id)?;
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Ok(node) = self.get(current) {
                out.push(current);
                stack.extend(node.children.iter().rev());
            }
        }
        Ok(out)
    }

    /// First node named `name` under the root, pre-order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .ok()?
            .into_iter()
            .find(|id| self.get(*id).map(|n| n.name == name).unwrap_or(false))
    }

    /// Name → handle for every node under the root; the first occurrence wins
    pub fn name_index(&self) -> HashMap<String, NodeId> {
        let mut index = HashMap::new();
        for id in self.descendants(self.root).unwrap_or_default() {
            if let Ok(node) = self.get(id) {
                index.entry(node.name.clone()).or_insert(id);
            }
        }
        index
    }

    /// True when `ancestor` is `node` or lies on its parent chain
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).ok().and_then(|n| n.parent);
        }
        false
    }

    fn label(&self, id: NodeId) -> String {
        self.get(id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }

    fn detach(&mut self, child: NodeId) -> SceneResult<()> {
        if let Some(old_parent) = self.get_mut(child)?.parent.take() {
            if let Ok(parent) = self.get_mut(old_parent) {
                parent.children.retain(|c| *c != child);
            }
        }
        Ok(())
    }

    /// Attach `child` as the last child of `parent`, detaching it from any
    /// previous parent first, then refresh its subtree.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.get(parent)?;
        self.get(child)?;
        if self.is_ancestor(child, parent) {
            return Err(SceneError::CycleDetected {
                parent: self.label(parent),
                child: self.label(child),
            });
        }

        self.detach(child)?;
        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        log::trace!("attached {} under {}", self.label(child), self.label(parent));

        self.compute_world_matrix(child, false, true)
    }

    /// Detach `child` from `parent`.
    ///
    /// The child stays alive as a root-less node so it can be re-added
    /// elsewhere. Its slot is only reclaimed by [`Self::despawn`] or
    /// [`Self::prune_detached`].
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        if self.get(child)?.parent != Some(parent) {
            return Err(SceneError::NotAChild {
                parent: self.label(parent),
                child: self.label(child),
            });
        }
        self.detach(child)?;
        self.compute_world_matrix(child, false, true)
    }

    pub fn remove_from_parent(&mut self, id: NodeId) -> SceneResult<()> {
        match self.get(id)?.parent {
            Some(parent) => self.remove(parent, id),
            None => Ok(()),
        }
    }

    /// Detach and free `id` together with its whole subtree
    pub fn despawn(&mut self, id: NodeId) -> SceneResult<()> {
        if id == self.root {
            return Err(SceneError::RootNode);
        }
        let subtree = self.descendants(id)?;
        self.detach(id)?;
        for node in subtree {
            let slot = &mut self.slots[node.index as usize];
            slot.node = None;
            self.free.push(node.index);
        }
        Ok(())
    }

    /// Free every node not reachable from the root; returns how many went
    pub fn prune_detached(&mut self) -> usize {
        let reachable: HashSet<u32> = match self.descendants(self.root) {
            Ok(ids) => ids.into_iter().map(|id| id.index).collect(),
            Err(err) => {
                log::warn!("cannot walk the scene root: {err}");
                return 0;
            }
        };

        let mut pruned = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let index = index as u32;
            if slot.node.is_some() && !reachable.contains(&index) {
                slot.node = None;
                self.free.push(index);
                pruned += 1;
            }
        }
        if pruned > 0 {
            log::debug!("pruned {pruned} detached nodes");
        }
        pruned
    }

    pub fn compute_local_matrix(&mut self, id: NodeId) -> SceneResult<()> {
        let node = self.get_mut(id)?;
        node.local_matrix = node.transform.matrix();
        Ok(())
    }

    /// Recompute `id`'s world matrix.
    ///
    /// With `update_parent` the ancestor chain is refreshed first (without
    /// touching the ancestors' other children). With `update_children` every
    /// descendant is refreshed afterwards. A child that fails is logged and
    /// skipped so its siblings still update.
    pub fn compute_world_matrix(
        &mut self,
        id: NodeId,
        update_parent: bool,
        update_children: bool,
    ) -> SceneResult<()> {
        let parent = self.get(id)?.parent;
        if let (Some(parent), true) = (parent, update_parent) {
            self.compute_world_matrix(parent, true, false)?;
        }

        let parent_world = match parent {
            Some(parent) => Some(self.get(parent)?.world_matrix),
            None => None,
        };

        let node = self.get_mut(id)?;
        node.local_matrix = node.transform.matrix();
        node.world_matrix = match parent_world {
            Some(parent_world) => parent_world.multiply(&node.local_matrix),
            None => node.local_matrix,
        };

        if update_children {
            let children = node.children.clone();
            for child in children {
                if let Err(err) = self.compute_world_matrix(child, false, true) {
                    log::warn!("skipping world update of child {child}: {err}");
                }
            }
        }
        Ok(())
    }

    /// Refresh the whole tree from the root
    pub fn update_world_matrices(&mut self) {
        self.refresh(self.root);
    }

    fn refresh(&mut self, id: NodeId) {
        if let Err(err) = self.compute_world_matrix(id, false, true) {
            log::warn!("world update of {id} failed: {err}");
        }
    }

    /// Every visible mesh under `root`, pre-order. Hidden nodes hide their
    /// subtree.
    pub fn draw_list(&self, root: NodeId) -> Vec<DrawItem> {
        let mut items = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Ok(node) = self.get(id) else {
                log::warn!("draw list skipped stale node {id}");
                continue;
            };
            if !node.visible {
                continue;
            }
            if let Some(mesh) = node.as_mesh() {
                items.push(DrawItem {
                    id,
                    name: node.name.clone(),
                    world_matrix: node.world_matrix.to_column_major(),
                    geometry: mesh.geometry,
                    material: mesh.material,
                });
            }
            stack.extend(node.children.iter().rev());
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::transform::Transform;

    fn offset(name: &str, x: f64) -> SceneNode {
        SceneNode::new(name).with_transform(Transform::from_position(Vector3::new(x, 0.0, 0.0)))
    }

    #[test]
    fn test_hierarchy_composition() {
        let mut graph = SceneGraph::new("scene");
        let a = graph.spawn_child(graph.root(), offset("A", 10.0)).unwrap();
        let b = graph.spawn_child(a, offset("B", 5.0)).unwrap();
        let c = graph.spawn_child(b, offset("C", 2.0)).unwrap();

        graph.compute_world_matrix(c, true, true).unwrap();
        let world = graph.get(c).unwrap().world_matrix();
        let p = world.transform_point(&Vector3::zero());
        assert!((p.x - 17.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_parent_refreshes_ancestors_only() {
        let mut graph = SceneGraph::new("scene");
        let a = graph.spawn_child(graph.root(), offset("A", 0.0)).unwrap();
        let b = graph.spawn_child(a, offset("B", 1.0)).unwrap();
        let sibling = graph.spawn_child(a, offset("Sibling", 0.0)).unwrap();

        graph.get_mut(a).unwrap().transform.position.x = 100.0;
        graph.compute_world_matrix(b, true, false).unwrap();

        assert_eq!(graph.get(b).unwrap().world_matrix().rows[0][3], 101.0);
        // The sibling was not cascaded into
        assert_eq!(graph.get(sibling).unwrap().world_matrix().rows[0][3], 0.0);
    }

    #[test]
    fn test_update_children_cascades() {
        let mut graph = SceneGraph::new("scene");
        let a = graph.spawn_child(graph.root(), offset("A", 0.0)).unwrap();
        let b = graph.spawn_child(a, offset("B", 1.0)).unwrap();
        let c = graph.spawn_child(b, offset("C", 1.0)).unwrap();

        graph.get_mut(a).unwrap().transform.position.x = 10.0;
        graph.compute_world_matrix(a, false, true).unwrap();
        assert_eq!(graph.get(c).unwrap().world_matrix().rows[0][3], 12.0);
    }

    #[test]
    fn test_reparenting_invariant() {
        let mut graph = SceneGraph::new("scene");
        let root = graph.root();
        let parent_a = graph.spawn_child(root, SceneNode::new("A")).unwrap();
        let parent_b = graph.spawn_child(root, SceneNode::new("B")).unwrap();
        let node = graph.spawn(SceneNode::new("node"));

        graph.add(parent_a, node).unwrap();
        graph.add(parent_b, node).unwrap();

        assert_eq!(graph.parent(node).unwrap(), Some(parent_b));
        let in_b = graph.children(parent_b).unwrap().iter().filter(|c| **c == node).count();
        assert_eq!(in_b, 1);
        assert!(!graph.children(parent_a).unwrap().contains(&node));
    }

    #[test]
    fn test_add_twice_to_same_parent_moves_to_end() {
        let mut graph = SceneGraph::new("scene");
        let root = graph.root();
        let first = graph.spawn_child(root, SceneNode::new("first")).unwrap();
        let second = graph.spawn_child(root, SceneNode::new("second")).unwrap();
        graph.add(root, first).unwrap();
        assert_eq!(graph.children(root).unwrap(), &[second, first]);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut graph = SceneGraph::new("scene");
        let a = graph.spawn_child(graph.root(), SceneNode::new("A")).unwrap();
        let b = graph.spawn_child(a, SceneNode::new("B")).unwrap();

        assert!(matches!(graph.add(b, a), Err(SceneError::CycleDetected { .. })));
        assert!(matches!(graph.add(a, a), Err(SceneError::CycleDetected { .. })));
        // Nothing moved
        assert_eq!(graph.parent(a).unwrap(), Some(graph.root()));
    }

    #[test]
    fn test_remove_and_remove_from_parent() {
        let mut graph = SceneGraph::new("scene");
        let root = graph.root();
        let a = graph.spawn_child(root, offset("A", 3.0)).unwrap();
        let b = graph.spawn_child(root, SceneNode::new("B")).unwrap();

        assert!(matches!(graph.remove(b, a), Err(SceneError::NotAChild { .. })));
        graph.remove(root, a).unwrap();
        assert_eq!(graph.parent(a).unwrap(), None);
        assert_eq!(graph.children(root).unwrap(), &[b]);

        graph.remove_from_parent(b).unwrap();
        assert!(graph.children(root).unwrap().is_empty());
        // Detached nodes are still alive
        assert!(graph.contains(a));
        assert_eq!(graph.get(a).unwrap().world_matrix().rows[0][3], 3.0);
    }

    #[test]
    fn test_prune_detached_reclaims_removed_nodes() {
        let mut graph = SceneGraph::new("scene");
        let root = graph.root();
        let kept = graph.spawn_child(root, SceneNode::new("Kept")).unwrap();

        for _ in 0..3 {
            let a = graph.spawn_child(root, SceneNode::new("A")).unwrap();
            graph.spawn_child(a, SceneNode::new("B")).unwrap();
            graph.remove(root, a).unwrap();
            assert_eq!(graph.prune_detached(), 2);
            assert!(!graph.contains(a));
        }

        assert_eq!(graph.len(), 2);
        assert!(graph.contains(kept));
        // Freed slots are reused instead of growing the arena
        assert_eq!(graph.slots.len(), 4);
        assert_eq!(graph.prune_detached(), 0);
    }

    #[test]
    fn test_despawn_frees_subtree_and_invalidates_handles() {
        let mut graph = SceneGraph::new("scene");
        let a = graph.spawn_child(graph.root(), SceneNode::new("A")).unwrap();
        let b = graph.spawn_child(a, SceneNode::new("B")).unwrap();

        graph.despawn(a).unwrap();
        assert!(!graph.contains(a));
        assert!(!graph.contains(b));
        assert_eq!(graph.len(), 1);

        // Reused slot gets a new generation
        let c = graph.spawn(SceneNode::new("C"));
        assert!(graph.contains(c));
        assert!(!graph.contains(a) && !graph.contains(b));
        assert!(matches!(graph.get(b), Err(SceneError::NodeNotFound(_))));

        assert!(matches!(graph.despawn(graph.root()), Err(SceneError::RootNode)));
    }

    #[test]
    fn test_find_by_name_and_descendants_order() {
        let mut graph = SceneGraph::new("scene");
        let root = graph.root();
        let a = graph.spawn_child(root, SceneNode::new("A")).unwrap();
        let a1 = graph.spawn_child(a, SceneNode::new("A1")).unwrap();
        let b = graph.spawn_child(root, SceneNode::new("B")).unwrap();

        assert_eq!(graph.descendants(root).unwrap(), vec![root, a, a1, b]);
        assert_eq!(graph.find_by_name("A1"), Some(a1));
        assert_eq!(graph.find_by_name("missing"), None);
    }

    #[test]
    fn test_draw_list_skips_hidden_subtrees() {
        let mut graph = SceneGraph::new("scene");
        let root = graph.root();
        let shown = graph
            .spawn_child(root, SceneNode::mesh("shown", Mesh::default()))
            .unwrap();
        let hidden = graph
            .spawn_child(root, SceneNode::mesh("hidden", Mesh::default()))
            .unwrap();
        graph
            .spawn_child(hidden, SceneNode::mesh("under-hidden", Mesh::default()))
            .unwrap();
        graph.get_mut(hidden).unwrap().visible = false;

        let items = graph.draw_list(root);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, shown);
    }
}
