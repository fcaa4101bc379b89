//! Named collections of operations.
//!
//! Two catalogs ship with snowrun, one per demo project. Any other catalog is
//! loaded from a YAML operations file.

use log::debug;

use crate::error::{Error, Result};
use crate::file_handling;
use crate::operation_definitions::OperationDefinition;

/// Iceberg + DuckDB demo
pub const HIRC: &str = "hirc";
/// Smart Crowd Counter demo
pub const SCC: &str = "scc";

const HIRC_YAML: &str = include_str!("../catalogs/hirc.yml");
const SCC_YAML: &str = include_str!("../catalogs/scc.yml");

#[derive(Debug, Clone)]
pub struct Catalog {
    pub name: String,
    pub operations: Vec<OperationDefinition>,
}

impl Catalog {
    /// Loads one of the catalogs compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogNotFound`] for an unknown name.
    pub fn builtin(name: &str) -> Result<Self> {
        let yaml = match name {
            HIRC => HIRC_YAML,
            SCC => SCC_YAML,
            _ => return Err(Error::CatalogNotFound(name.to_string())),
        };

        Ok(Self {
            name: name.to_string(),
            operations: file_handling::parse_operation_definitions(yaml, name)?,
        })
    }

    /// Every built-in catalog, in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in catalog fails validation.
    pub fn builtins() -> Result<Vec<Self>> {
        [HIRC, SCC].into_iter().map(Self::builtin).collect()
    }

    /// Loads a catalog from a YAML operations file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn from_file(path: &str) -> Result<Self> {
        Ok(Self {
            name: path.to_string(),
            operations: file_handling::get_operation_definitions(path)?,
        })
    }

    /// Finds an operation by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationNotFound`] if no operation has that id.
    pub fn find(&self, id: &str) -> Result<&OperationDefinition> {
        debug!("Looking up operation `{id}` in catalog `{}`", self.name);
        self.operations
            .iter()
            .find(|operation| operation.id == id)
            .ok_or_else(|| Error::OperationNotFound(id.to_string()))
    }
}
