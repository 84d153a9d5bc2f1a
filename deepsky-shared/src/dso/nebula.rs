use std::path::{Path, PathBuf};

use crate::fields::{FieldBlock, FieldError};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Nebula {
    mesh: Option<PathBuf>,
}

impl Nebula {
    /// Reads `Mesh`, resolving it against `resource_path`.
    ///
    /// The mesh itself is not loaded.
    pub(crate) fn from_fields(fields: FieldBlock, resource_path: &Path) -> Result<Self, FieldError> {
        Ok(Self {
            mesh: fields
                .string("Mesh")?
                .map(|mesh| resource_path.join(mesh)),
        })
    }

    /// The path to the geometry of this nebula, if any.
    pub fn mesh(&self) -> Option<&Path> {
        self.mesh.as_deref()
    }
}
