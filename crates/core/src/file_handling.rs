//! Loading and validation of operation definitions.
//!
//! Operation catalogs are YAML lists of [`OperationDefinition`]. The built-in
//! catalogs and user supplied `--operations-file` catalogs go through the same
//! parsing and validation.

use std::collections::HashSet;
use std::fs::File;

use log::debug;

use crate::error::Error::{
    ConnectionSettingNotRequired, EmptyId, IdWithColon, IdWithSpace, NonUniqueOperationId,
    NonUniqueParameterId, NumericId, UnresolvedToken,
};
use crate::error::{Error, Result};
use crate::operation_definitions::OperationDefinition;

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    File::open(path).map_err(|e| Error::io_error(file_description.to_string(), path.to_string(), e))
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(EmptyId);
    }

    if id.contains(' ') {
        return Err(IdWithSpace(id.to_string()));
    }

    if id.contains(':') {
        return Err(IdWithColon(id.to_string()));
    }

    if id.chars().all(char::is_numeric) {
        return Err(NumericId(id.to_string()));
    }

    Ok(())
}

fn validate_parameters(operation: &OperationDefinition) -> Result<()> {
    let mut ids = HashSet::new();
    for parameter in &operation.parameters {
        validate_id(&parameter.id)?;

        if !ids.insert(parameter.id.as_str()) {
            return Err(NonUniqueParameterId(
                operation.id.clone(),
                parameter.id.clone(),
            ));
        }
    }

    for token in operation.get_ordered_tokens()? {
        let is_parameter = ids.contains(token.as_str());
        let is_setting = operation.required_settings.contains(&token);

        if !is_parameter && !is_setting {
            return Err(UnresolvedToken(operation.id.clone(), token));
        }
    }

    Ok(())
}

/// Validates ids, parameters, template tokens and the connection setting of
/// every operation.
///
/// # Errors
///
/// Returns the first validation failure found.
pub fn validate_operations(operations: &[OperationDefinition]) -> Result<()> {
    let mut ids = HashSet::new();

    for operation in operations {
        validate_id(&operation.id)?;

        if !ids.insert(operation.id.as_str()) {
            return Err(NonUniqueOperationId(operation.id.clone()));
        }

        if !operation
            .required_settings
            .contains(&operation.connection_setting)
        {
            return Err(ConnectionSettingNotRequired(
                operation.id.clone(),
                operation.connection_setting.clone(),
            ));
        }

        validate_parameters(operation)?;
    }

    Ok(())
}

/// Parses and validates operation definitions from YAML text.
///
/// `origin` names the source in error messages.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, empty, or fails validation.
pub fn parse_operation_definitions(yaml: &str, origin: &str) -> Result<Vec<OperationDefinition>> {
    let operations: Vec<OperationDefinition> = serde_yaml::from_str(yaml).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "operations".to_string(),
            origin.to_string(),
            e,
        )
    })?;

    finish_loading(operations, origin)
}

/// Loads and validates operation definitions from a YAML file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The YAML is malformed or doesn't match the expected structure
/// - The file defines no operations
/// - Operation or parameter IDs are invalid or non-unique
/// - A variable template references something that is neither a parameter nor
///   a required setting
///
/// # Examples
///
/// ```no_run
/// use snowrun_core::file_handling::get_operation_definitions;
///
/// let operations = get_operation_definitions("ops.yml")?;
/// println!("Loaded {} operations", operations.len());
/// # Ok::<(), snowrun_core::error::Error>(())
/// ```
pub fn get_operation_definitions(path: &str) -> Result<Vec<OperationDefinition>> {
    let reader = get_reader("operations", path)?;

    let operations: Vec<OperationDefinition> = serde_yaml::from_reader(reader).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "operations".to_string(),
            path.to_string(),
            e,
        )
    })?;

    finish_loading(operations, path)
}

fn finish_loading(operations: Vec<OperationDefinition>, origin: &str) -> Result<Vec<OperationDefinition>> {
    if operations.is_empty() {
        return Err(Error::EmptyOperationDefinition {
            path: origin.to_string(),
        });
    }

    validate_operations(&operations)?;
    debug!("Loaded {} operations from `{origin}`", operations.len());

    Ok(operations)
}
