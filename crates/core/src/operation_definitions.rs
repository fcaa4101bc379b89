use std::fmt::{Display, Formatter};

use indexmap::{IndexMap, IndexSet};
use leon::Template;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_CONNECTION_SETTING;
use crate::error::Result;

/// A value the caller may supply when running an operation.
///
/// A parameter without a `default` must be provided.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    pub id: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Display for ParameterDefinition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        // Always show the id
        write!(formatter, "`{}`", self.id)?;

        if let Some(desc) = &self.description {
            write!(formatter, " ({desc})")?;
        }

        if let Some(default) = &self.default {
            write!(formatter, " [default: {default}]")?;
        }

        Ok(())
    }
}

fn default_connection_setting() -> String {
    DEFAULT_CONNECTION_SETTING.to_string()
}

/// One named operation: a SQL template file plus the values fed into it.
///
/// `variables` maps each template placeholder handed to `snow sql` to a value
/// template. `{NAME}` in a value template is replaced by the parameter or
/// required setting called `NAME`; anything else is taken literally.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OperationDefinition {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub sql_file: String,
    #[serde(default)]
    pub required_settings: Vec<String>,
    #[serde(default = "default_connection_setting")]
    pub connection_setting: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    pub variables: IndexMap<String, String>,
}

impl OperationDefinition {
    /// Parses every variable value template, keeping the placeholder name.
    ///
    /// # Errors
    ///
    /// Returns an error if a value template is malformed.
    pub fn get_templates(&self) -> Result<Vec<(&str, Template<'_>)>> {
        let mut templates = Vec::with_capacity(self.variables.len());

        for (name, value) in &self.variables {
            templates.push((name.as_str(), Template::parse(value)?));
        }

        Ok(templates)
    }

    /// Every `{token}` referenced by the variable templates, in order of first
    /// appearance.
    ///
    /// Catalog validation uses this to check that each token names a
    /// parameter or a required setting.
    ///
    /// # Errors
    ///
    /// Returns an error if a value template is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexmap::IndexMap;
    /// use snowrun_core::operation_definitions::OperationDefinition;
    ///
    /// let definition = OperationDefinition {
    ///     id: "setup".to_string(),
    ///     description: None,
    ///     sql_file: "setup.sql".to_string(),
    ///     required_settings: vec!["DEMO_ROLE".to_string()],
    ///     connection_setting: "SNOWFLAKE_DEFAULT_CONNECTION_NAME".to_string(),
    ///     parameters: Vec::new(),
    ///     variables: IndexMap::from([
    ///         ("role".to_string(), "{DEMO_ROLE}".to_string()),
    ///         ("grantee".to_string(), "{DEMO_ROLE}_{DEMO_DATABASE}".to_string()),
    ///     ]),
    /// };
    ///
    /// let tokens: Vec<String> = definition.get_ordered_tokens()?.into_iter().collect();
    /// assert_eq!(tokens, vec!["DEMO_ROLE", "DEMO_DATABASE"]);
    /// # Ok::<(), snowrun_core::error::Error>(())
    /// ```
    pub fn get_ordered_tokens(&self) -> Result<IndexSet<String>> {
        let mut tokens = IndexSet::new();

        for (_, template) in self.get_templates()? {
            for key in template.keys() {
                tokens.insert((*key).to_string());
            }
        }

        Ok(tokens)
    }

    /// Looks up a declared parameter by id.
    #[must_use]
    pub fn get_parameter(&self, id: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|parameter| parameter.id == id)
    }
}

impl Display for OperationDefinition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(desc) => write!(formatter, "{} ({})", self.id, desc),
            None => formatter.write_str(&self.id),
        }
    }
}
