//! Which of the two parameter styles an invocation uses.

use snowrun_core::error::Error::MixedParameterMode;
use snowrun_core::error::Result;

#[derive(PartialEq, Clone, Debug)]
pub enum Style {
    /// No values given, every parameter falls back to its default
    None,
    /// `key=value` pairs from `-p`/`--param`
    Named(Vec<String>),
    /// Trailing values in declaration order
    Positional(Vec<String>),
}

/// Implemented by argument structs that carry operation parameters.
pub trait Provider {
    /// # Errors
    ///
    /// Returns an error if named and positional values are mixed.
    fn get_style(&self) -> Result<Style>;
}

/// Picks the style from the two argument lists.
///
/// # Errors
///
/// Returns [`MixedParameterMode`] if both lists are non-empty.
///
/// # Examples
///
/// ```rust
/// use snowrun_cli::arguments::{determine, Style};
///
/// let style = determine(&["schema=SALES".to_string()], &[]).unwrap();
/// assert_eq!(style, Style::Named(vec!["schema=SALES".to_string()]));
/// ```
pub fn determine(named_args: &[String], positional_args: &[String]) -> Result<Style> {
    match (named_args.is_empty(), positional_args.is_empty()) {
        (false, false) => Err(MixedParameterMode),
        (false, true) => Ok(Style::Named(named_args.to_vec())),
        (true, false) => Ok(Style::Positional(positional_args.to_vec())),
        (true, true) => Ok(Style::None),
    }
}
