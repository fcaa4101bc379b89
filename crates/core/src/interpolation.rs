use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;

use crate::error::Error::{MissingParameter, UnknownParameter};
use crate::error::Result;
use crate::operation_definitions::OperationDefinition;

/// Fills in parameter values, falling back to each parameter's default.
///
/// # Arguments
///
/// * `definition` - The operation whose parameters are being filled in
/// * `provided` - Values given on the command line, by parameter id
///
/// # Returns
///
/// One value per declared parameter, in declaration order
///
/// # Errors
///
/// Returns an error if a provided name is not a parameter of the operation, or
/// if a parameter without a default was not provided.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use snowrun_core::interpolation::resolve_parameters;
/// use snowrun_core::operation_definitions::{OperationDefinition, ParameterDefinition};
///
/// let definition = OperationDefinition {
///     id: "create-warehouse".to_string(),
///     description: None,
///     sql_file: "create_warehouse.sql".to_string(),
///     required_settings: Vec::new(),
///     connection_setting: "SNOWFLAKE_DEFAULT_CONNECTION_NAME".to_string(),
///     parameters: vec![ParameterDefinition {
///         id: "warehouse".to_string(),
///         default: Some("DEMO_WH".to_string()),
///         description: None,
///     }],
///     variables: IndexMap::new(),
/// };
///
/// let resolved = resolve_parameters(&definition, &IndexMap::new())?;
/// assert_eq!(resolved["warehouse"], "DEMO_WH");
/// # Ok::<(), snowrun_core::error::Error>(())
/// ```
pub fn resolve_parameters(
    definition: &OperationDefinition,
    provided: &IndexMap<String, String>,
) -> Result<IndexMap<String, String>> {
    if let Some(unknown) = provided
        .keys()
        .find(|name| definition.get_parameter(name).is_none())
    {
        return Err(UnknownParameter(unknown.clone()));
    }

    let mut resolved = IndexMap::new();

    for parameter in &definition.parameters {
        let value = provided
            .get(&parameter.id)
            .or(parameter.default.as_ref())
            .ok_or_else(|| MissingParameter(parameter.id.clone()))?;
        resolved.insert(parameter.id.clone(), value.clone());
    }

    Ok(resolved)
}

/// Merges resolved settings and parameters into one rendering context.
///
/// Parameters shadow settings of the same name.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use snowrun_core::interpolation::build_context;
///
/// let settings = IndexMap::from([("DEMO_ROLE".to_string(), "FROM_ENV".to_string())]);
/// let parameters = IndexMap::from([("DEMO_ROLE".to_string(), "FROM_CLI".to_string())]);
///
/// assert_eq!(build_context(&settings, &parameters)["DEMO_ROLE"], "FROM_CLI");
/// ```
#[must_use]
pub fn build_context(
    settings: &IndexMap<String, String>,
    parameters: &IndexMap<String, String>,
) -> HashMap<String, String> {
    settings
        .iter()
        .chain(parameters.iter())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Renders the operation's template variable map against `context`.
///
/// # Arguments
///
/// * `definition` - The operation whose `variables` are rendered
/// * `context` - Settings and parameters, as built by [`build_context`]
///
/// # Returns
///
/// The placeholder values to pass to `snow sql`, in declaration order
///
/// # Errors
///
/// Returns an error if a value template is malformed or references a name
/// missing from `context`.
pub fn render_variables(
    definition: &OperationDefinition,
    context: &HashMap<String, String>,
) -> Result<IndexMap<String, String>> {
    let mut variables = IndexMap::new();

    for (name, template) in definition.get_templates()? {
        let value = template.render(context)?;
        debug!("Template variable `{name}` resolved");
        variables.insert(name.to_string(), value);
    }

    Ok(variables)
}
