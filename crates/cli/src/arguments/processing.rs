use indexmap::IndexMap;
use log::debug;
use snowrun_core::error::Error::{ParameterCountMismatch, ParameterFormat, UnknownParameter};
use snowrun_core::error::Result;
use snowrun_core::operation_definitions::OperationDefinition;

use crate::arguments::style::Style;

/// Turns command-line parameter values into a map keyed by parameter id.
///
/// Parameters left out of the map fall back to their defaults later, when the
/// operation is prepared.
///
/// # Errors
///
/// Returns an error if:
/// - A named value is not in `key=value` form
/// - A name is not a parameter of the operation
/// - The number of positional values differs from the number of parameters
pub fn process_command_line(
    argument_style: Style,
    definition: &OperationDefinition,
) -> Result<IndexMap<String, String>> {
    let values = match argument_style {
        Style::None => IndexMap::new(),
        Style::Named(named_params) => process_named_parameters(&named_params, definition)?,
        Style::Positional(positional_params) => {
            process_positional_parameters(&positional_params, definition)?
        }
    };

    debug!("Parameters for `{}` from the command line: {values:?}", definition.id);
    Ok(values)
}

fn process_named_parameters(
    named_params: &[String],
    definition: &OperationDefinition,
) -> Result<IndexMap<String, String>> {
    let mut values = IndexMap::new();

    for param_str in named_params {
        let Some((key, value)) = param_str.split_once('=') else {
            return Err(ParameterFormat(param_str.to_string()));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ParameterFormat(param_str.to_string()));
        }

        if definition.get_parameter(key).is_none() {
            return Err(UnknownParameter(key.to_string()));
        }

        values.insert(key.to_string(), value.to_string());
    }

    Ok(values)
}

fn process_positional_parameters(
    positional_params: &[String],
    definition: &OperationDefinition,
) -> Result<IndexMap<String, String>> {
    if positional_params.len() != definition.parameters.len() {
        return Err(ParameterCountMismatch(
            definition.parameters.len(),
            positional_params.len(),
        ));
    }

    Ok(definition
        .parameters
        .iter()
        .zip(positional_params)
        .map(|(parameter, value)| (parameter.id.clone(), value.clone()))
        .collect())
}
