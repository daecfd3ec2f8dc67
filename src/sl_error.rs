use std::{error, fmt};

/// Unified error type
///
/// Only failures that abort an ingestion pass end up here. Problems that just
/// degrade the bound result (unknown bone names and the like) are reported as
/// `bind::Diagnostic` values instead.
///
/// Some third party error types are very large so are boxed.
#[derive(Debug)]
pub enum SlError {
    IndexTooLarge,
    StdIoError(std::io::Error),
    SerdeYamlError(Box<serde_yaml::Error>),
    TObjLoadError(tobj::LoadError),
    GltfError(Box<gltf::Error>),
    ImportError(crate::import::ImportError),
}

impl error::Error for SlError {}

impl fmt::Display for SlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::IndexTooLarge => write!(f, "index does not fit in 32 bits"),
            Self::StdIoError(e) => write!(f, "std::io::Error: {}", e.kind()),
            Self::SerdeYamlError(e) => {
                write!(f, "serde_yaml::Error: {e}")
            }
            Self::TObjLoadError(e) => write!(f, "tobj crate LoadError: {e}"),
            Self::GltfError(e) => {
                write!(f, "gltf Error: {e}")
            }
            Self::ImportError(e) => write!(f, "import error: {e}"),
        }
    }
}

impl From<serde_yaml::Error> for SlError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::SerdeYamlError(Box::new(e))
    }
}

impl From<std::io::Error> for SlError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}

impl From<tobj::LoadError> for SlError {
    fn from(e: tobj::LoadError) -> Self {
        Self::TObjLoadError(e)
    }
}

impl From<gltf::Error> for SlError {
    fn from(e: gltf::Error) -> Self {
        Self::GltfError(Box::new(e))
    }
}

impl From<crate::import::ImportError> for SlError {
    fn from(e: crate::import::ImportError) -> Self {
        Self::ImportError(e)
    }
}
