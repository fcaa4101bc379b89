use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::PathBuf;

use indexmap::IndexMap;

/// A single `snow sql` run against one template file.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub executable: String,
    pub connection: String,
    pub sql_path: PathBuf,
    /// Template variables, passed as `--variable key=value` in this order.
    pub variables: IndexMap<String, String>,
    /// Extra environment for the child process.
    pub environment: IndexMap<String, String>,
}

impl Invocation {
    /// Arguments passed to the executable, excluding the executable itself.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "sql".to_string(),
            "-c".to_string(),
            self.connection.clone(),
            "-f".to_string(),
            self.sql_path.display().to_string(),
            "--enable-templating".to_string(),
            "ALL".to_string(),
        ];

        for (key, value) in &self.variables {
            args.push("--variable".to_string());
            args.push(format!("{key}={value}"));
        }

        args
    }

    /// File name of the SQL template, for progress messages.
    #[must_use]
    pub fn sql_file_name(&self) -> String {
        self.sql_path
            .file_name()
            .map_or_else(|| self.sql_path.display().to_string(), |name| name.to_string_lossy().to_string())
    }

    /// Writes the dry-run preview: the command line, then one line per
    /// template variable.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn write_preview<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "Would run:")?;
        writeln!(
            out,
            "  {} sql -c {} -f {}",
            self.executable,
            self.connection,
            self.sql_path.display()
        )?;
        for (key, value) in &self.variables {
            writeln!(out, "    --variable {key}={value}")?;
        }

        Ok(())
    }

    /// Writes the progress line printed before a real run.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn write_progress<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "Running: {} sql -f {}", self.executable, self.sql_file_name())
    }
}

impl Display for Invocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{} {}", self.executable, self.to_args().join(" "))
    }
}
