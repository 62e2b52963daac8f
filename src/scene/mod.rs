//! Runtime scene model and selection state.
//!
//! The loaded asset is flattened into [`MeshNode`]s: the name used for
//! area lookup, world-space triangles retained for picking, and the index
//! the renderer uses to address the node's GPU state. Selection holds the
//! single highlighted node; at most one node carries the selected color.

use crate::assets::ModelAsset;
use crate::render::pick::{self, PickHit, Ray};
use glam::Vec3;

/// Fixed highlight color for the picked area (#B01C12).
pub const SELECTED_COLOR: [f32; 4] = [0.690, 0.110, 0.071, 1.0];
/// Color a node is restored to when it loses the highlight.
pub const UNSELECTED_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

pub struct MeshNode {
    pub name: String,
    /// World-space vertex positions, kept on the CPU for ray tests.
    positions: Vec<Vec3>,
    indices: Vec<u32>,
}

pub struct SceneModel {
    nodes: Vec<MeshNode>,
    pub center: [f32; 3],
    pub extent: [f32; 3],
}

impl SceneModel {
    pub fn from_asset(asset: &ModelAsset) -> Self {
        let nodes = asset
            .meshes
            .iter()
            .map(|mesh| {
                let positions = mesh
                    .positions
                    .iter()
                    .map(|p| mesh.transform.transform_point3(Vec3::from_array(*p)))
                    .collect();
                MeshNode {
                    name: mesh.name.clone(),
                    positions,
                    indices: mesh.indices.clone(),
                }
            })
            .collect();
        Self {
            nodes,
            center: asset.center,
            extent: asset.extent,
        }
    }

    pub fn node_name(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(|node| node.name.as_str())
    }

    /// Nearest node the ray intersects, if any.
    pub fn pick(&self, ray: &Ray) -> Option<PickHit> {
        let mut nearest: Option<PickHit> = None;
        for (index, node) in self.nodes.iter().enumerate() {
            let Some(distance) = pick::intersect_mesh(ray, &node.positions, &node.indices) else {
                continue;
            };
            let closer = nearest
                .as_ref()
                .map(|hit| distance < hit.distance)
                .unwrap_or(true);
            if closer {
                nearest = Some(PickHit {
                    node_index: index,
                    distance,
                });
            }
        }
        nearest
    }

    #[cfg(test)]
    pub fn from_test_nodes(nodes: Vec<MeshNode>) -> Self {
        Self {
            nodes,
            center: [0.0; 3],
            extent: [1.0; 3],
        }
    }
}

#[cfg(test)]
impl MeshNode {
    pub fn test_triangle(name: &str, z: f32) -> Self {
        Self {
            name: name.to_string(),
            positions: vec![
                Vec3::new(-1.0, -1.0, z),
                Vec3::new(1.0, -1.0, z),
                Vec3::new(0.0, 1.0, z),
            ],
            indices: vec![0, 1, 2],
        }
    }
}

/// What a new pick changed: the node to restore, and the node now current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub previous: Option<usize>,
    pub current: usize,
}

/// The single "last picked node" reference.
#[derive(Debug, Default)]
pub struct Selection {
    current: Option<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Record a pick. `previous` is only reported when it differs from the
    /// new node, so re-picking the same node never resets its color.
    pub fn select(&mut self, node_index: usize) -> SelectionChange {
        let previous = self.current.filter(|&prev| prev != node_index);
        self.current = Some(node_index);
        SelectionChange {
            previous,
            current: node_index,
        }
    }

    pub fn clear(&mut self) -> Option<usize> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::{MeshNode, SceneModel, Selection, SelectionChange};
    use crate::render::pick::Ray;
    use glam::Vec3;

    fn toward_negative_z() -> Ray {
        Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        }
    }

    #[test]
    fn pick_returns_nearest_of_two_stacked_triangles() {
        let scene = SceneModel::from_test_nodes(vec![
            MeshNode::test_triangle("far", -3.0),
            MeshNode::test_triangle("near", 0.0),
        ]);
        let hit = scene.pick(&toward_negative_z()).unwrap();
        assert_eq!(hit.node_index, 1);
        assert!((hit.distance - 5.0).abs() < 1e-4);
    }

    #[test]
    fn pick_misses_empty_space() {
        let scene = SceneModel::from_test_nodes(vec![MeshNode::test_triangle("only", 0.0)]);
        let ray = Ray {
            origin: Vec3::new(10.0, 10.0, 5.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        };
        assert!(scene.pick(&ray).is_none());
    }

    #[test]
    fn selecting_a_second_node_reports_the_first_for_restore() {
        let mut selection = Selection::new();
        assert_eq!(
            selection.select(0),
            SelectionChange {
                previous: None,
                current: 0
            }
        );
        assert_eq!(
            selection.select(2),
            SelectionChange {
                previous: Some(0),
                current: 2
            }
        );
        assert_eq!(selection.current(), Some(2));
    }

    #[test]
    fn reselecting_the_same_node_reports_no_previous() {
        let mut selection = Selection::new();
        selection.select(1);
        let change = selection.select(1);
        assert_eq!(change.previous, None);
        assert_eq!(change.current, 1);
    }

    #[test]
    fn clear_empties_the_selection() {
        let mut selection = Selection::new();
        selection.select(3);
        assert_eq!(selection.clear(), Some(3));
        assert_eq!(selection.current(), None);
    }
}
