use log::warn;
use std::fmt;

/// Something that was skipped during binding. None of these stop the pass,
/// they only mean the result is less complete than the source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Diagnostic {
    /// A second node used a name that was already bound. The first binding
    /// is kept.
    DuplicateName { name: String },
    /// An animation channel names a node with no transform node
    UnknownChannelTarget { animation: String, node: String },
    /// A bone names a node with no transform node
    UnknownBone { mesh: usize, bone: String },
    /// There is no built mesh object for an import mesh index
    MissingMesh { mesh: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => {
                write!(f, "duplicate node name {name:?}, keeping the first")
            }
            Self::UnknownChannelTarget { animation, node } => write!(
                f,
                "animation {animation:?} targets unknown node {node:?}, \
                 channel skipped"
            ),
            Self::UnknownBone { mesh, bone } => write!(
                f,
                "mesh {mesh} has bone for unknown node {bone:?}, bone skipped"
            ),
            Self::MissingMesh { mesh } => {
                write!(f, "no mesh object for mesh {mesh}, skipped")
            }
        }
    }
}

/// Collects diagnostics for one pass and logs each as it arrives
#[derive(Debug, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn record(&mut self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.0.push(diagnostic);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}
