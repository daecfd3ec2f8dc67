use super::{
    diagnostics::{Diagnostic, Diagnostics},
    name_index::NameIndex,
};
use crate::{
    anim::{
        AnimatedTransformation, Animation, AnimationRoot, PositionKey,
        RotationKey,
    },
    import::{ImportAnimation, ImportChannel, ImportOptions},
    scene::NodeId,
    types::MICROS_PER_SECOND,
};
use log::{debug, info};

/// Converts a source time to microseconds
fn to_micros(time: f64, options: &ImportOptions) -> f64 {
    time * options.time_scale * MICROS_PER_SECOND
}

/// Binds every channel of every animation to its transform node. Returns
/// `None` when there are no animations at all.
///
/// Channels whose target has no transform node are skipped with a
/// diagnostic. Keys are copied in source order and are not re-sorted.
pub fn bind_animations(
    animations: &[ImportAnimation],
    names: &NameIndex,
    options: &ImportOptions,
    diagnostics: &mut Diagnostics,
) -> Option<AnimationRoot> {
    if animations.is_empty() {
        return None;
    }
    let mut root = AnimationRoot::default();
    for source in animations {
        let mut animation = Animation {
            name: source.name.clone(),
            duration: to_micros(source.duration, options),
            ticks_per_second: source.ticks_per_second,
            transformations: Vec::with_capacity(source.channels.len()),
        };
        for channel in &source.channels {
            let Some(target) = names.get(&channel.node_name) else {
                diagnostics.record(Diagnostic::UnknownChannelTarget {
                    animation: source.name.clone(),
                    node: channel.node_name.clone(),
                });
                continue;
            };
            animation
                .transformations
                .push(bind_channel(channel, target, options));
        }
        info!(
            "animation {:?}: duration={}us, {} of {} channels bound",
            animation.name,
            animation.duration,
            animation.transformations.len(),
            source.channels.len(),
        );
        root.animations.push(animation);
    }
    Some(root)
}

fn bind_channel(
    channel: &ImportChannel,
    target: NodeId,
    options: &ImportOptions,
) -> AnimatedTransformation {
    debug!(
        "channel {:?}: rotation keys={}, position keys={}",
        channel.node_name,
        channel.rotation_keys.len(),
        channel.position_keys.len(),
    );
    AnimatedTransformation {
        target,
        name: channel.node_name.clone(),
        rotations: channel
            .rotation_keys
            .iter()
            .map(|k| RotationKey {
                time: to_micros(k.time, options),
                value: k.value,
            })
            .collect(),
        positions: channel
            .position_keys
            .iter()
            .map(|k| PositionKey {
                time: to_micros(k.time, options),
                value: k.value,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import;
    use crate::scene::{NodeKind, SceneGraph};
    use nalgebra_glm as glm;

    fn channel(name: &str, times: &[f64]) -> ImportChannel {
        ImportChannel {
            node_name: name.to_string(),
            rotation_keys: times
                .iter()
                .map(|&time| import::RotationKey {
                    time,
                    value: glm::Quat::identity(),
                })
                .collect(),
            position_keys: times
                .iter()
                .map(|&time| import::PositionKey {
                    time,
                    value: glm::vec3(0.0, 1.0, 0.0),
                })
                .collect(),
        }
    }

    #[test]
    fn no_animations_no_root() {
        let mut diagnostics = Diagnostics::default();
        let root = bind_animations(
            &[],
            &NameIndex::new(),
            &ImportOptions::default(),
            &mut diagnostics,
        );
        assert!(root.is_none());
    }

    #[test]
    fn unknown_targets_are_skipped() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let leg = graph.add_child(root, NodeKind::Group(None));
        let mut names = NameIndex::new();
        names.register("Leg", leg);

        let source = ImportAnimation {
            name: "walk".to_string(),
            duration: 2.0,
            ticks_per_second: 30.0,
            channels: vec![
                channel("Leg", &[0.0, 0.5]),
                channel("Tail", &[0.0]),
                channel("Wing", &[0.0]),
            ],
        };
        let mut diagnostics = Diagnostics::default();
        let bound = bind_animations(
            &[source],
            &names,
            &ImportOptions::default(),
            &mut diagnostics,
        )
        .unwrap();

        let animation = &bound.animations[0];
        assert_eq!(animation.transformations.len(), 1);
        assert_eq!(animation.transformations[0].target, leg);
        assert_eq!(animation.duration, 2_000_000.0);
        assert_eq!(animation.ticks_per_second, 30.0);
        assert_eq!(diagnostics.as_slice().len(), 2);
        let positions = &animation.transformations[0].positions;
        assert_eq!(positions[1].time, 500_000.0);
        assert_eq!(positions[1].value, glm::vec3(0.0, 1.0, 0.0));
    }

    #[test]
    fn time_scale_applies_before_conversion() {
        let options = ImportOptions {
            time_scale: 0.5,
            ..Default::default()
        };
        assert_eq!(to_micros(3.0, &options), 1_500_000.0);
    }
}
