//! Parameter values for operations from YAML catalogs.
//!
//! Values can be given in one of two ways, never both at once:
//! - **Named**: repeated `-p key=value` flags
//! - **Positional**: trailing values in the order the parameters are declared

pub mod processing;
pub mod style;

pub use processing::process_command_line;
pub use style::determine;
pub use style::Provider;
pub use style::Style;
