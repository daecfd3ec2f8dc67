use super::types::{ImportChannel, ImportError, ImportNode, ImportScene};
use itertools::Itertools;
use log::error;

impl ImportScene {
    /// Checks the preconditions the binding pass relies on: every mesh
    /// attachment points into `meshes`, and every channel has its keys in
    /// time order. Nothing is re-sorted or repaired here.
    ///
    /// # Errors
    /// Returns the first `ImportError` found
    pub fn validate(&self) -> Result<(), ImportError> {
        check_attachments(&self.root, self.meshes.len())?;
        for animation in &self.animations {
            for channel in &animation.channels {
                if !keys_in_order(channel) {
                    error!(
                        "animation {:?} channel {:?} keys out of order",
                        animation.name, channel.node_name
                    );
                    return Err(ImportError::UnsortedKeys {
                        animation: animation.name.clone(),
                        channel: channel.node_name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn check_attachments(
    node: &ImportNode,
    mesh_count: usize,
) -> Result<(), ImportError> {
    if let Some(&index) = node.meshes.iter().find(|&&i| i >= mesh_count) {
        error!(
            "node {:?} attaches mesh {} but there are only {}",
            node.name, index, mesh_count
        );
        return Err(ImportError::MeshIndexOutOfRange {
            node: node.name.clone(),
            index,
        });
    }
    node.children
        .iter()
        .try_for_each(|child| check_attachments(child, mesh_count))
}

// Equal times are allowed, only a decrease is rejected
fn keys_in_order(channel: &ImportChannel) -> bool {
    channel
        .rotation_keys
        .iter()
        .tuple_windows()
        .all(|(a, b)| a.time <= b.time)
        && channel
            .position_keys
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.time <= b.time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{
        ImportAnimation, ImportMesh, PositionKey, RotationKey,
    };
    use nalgebra_glm as glm;

    fn scene_with_channel(channel: ImportChannel) -> ImportScene {
        let mut scene = ImportScene::new(ImportNode::new("root"));
        scene.animations.push(ImportAnimation {
            name: "walk".to_string(),
            duration: 1.0,
            ticks_per_second: 25.0,
            channels: vec![channel],
        });
        scene
    }

    #[test]
    fn accepts_repeated_times() {
        let key = |time| RotationKey {
            time,
            value: glm::Quat::identity(),
        };
        let scene = scene_with_channel(ImportChannel {
            node_name: "Leg".to_string(),
            rotation_keys: vec![key(0.0), key(0.5), key(0.5), key(1.0)],
            position_keys: Vec::new(),
        });
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn rejects_decreasing_position_keys() {
        let key = |time| PositionKey {
            time,
            value: glm::Vec3::zeros(),
        };
        let scene = scene_with_channel(ImportChannel {
            node_name: "Leg".to_string(),
            rotation_keys: Vec::new(),
            position_keys: vec![key(0.0), key(2.0), key(1.0)],
        });
        assert!(matches!(
            scene.validate(),
            Err(ImportError::UnsortedKeys { channel, .. }) if channel == "Leg"
        ));
    }

    #[test]
    fn rejects_missing_mesh_deep_in_tree() {
        let root = ImportNode::new("root").with_child(
            ImportNode::new("a")
                .with_meshes(&[0])
                .with_child(ImportNode::new("b").with_meshes(&[3])),
        );
        let mut scene = ImportScene::new(root);
        scene.meshes.push(ImportMesh::default());
        assert!(matches!(
            scene.validate(),
            Err(ImportError::MeshIndexOutOfRange { node, index: 3 }) if node == "b"
        ));
    }
}
