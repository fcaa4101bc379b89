use std::path::Path;
use std::time::Duration;

use crate::dashboard::analytics::ViewRow;
use crate::error::Result;

/// Stage created when none is configured
pub const DEFAULT_STAGE_NAME: &str = "SNAPS";
/// AI-powered view over the stage directory
pub const VIEW_NAME: &str = "SMART_CROWD_COUNTER";
/// Presigned URLs stay valid for seven days
pub const PRESIGNED_URL_EXPIRY: Duration = Duration::from_secs(604_800);

/// Where uploaded images live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageLocation {
    pub database: String,
    pub schema: String,
    pub stage: String,
}

impl StageLocation {
    /// `DB.SCHEMA.STAGE`
    #[must_use]
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.stage)
    }

    /// `@DB.SCHEMA.STAGE`
    #[must_use]
    pub fn stage_ref(&self) -> String {
        format!("@{}", self.fqn())
    }

    /// `@DB.SCHEMA.STAGE/<file_name>`
    #[must_use]
    pub fn file_ref(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.stage_ref())
    }

    /// `DB.SCHEMA.SMART_CROWD_COUNTER`
    #[must_use]
    pub fn view_fqn(&self) -> String {
        format!("{}.{}.{VIEW_NAME}", self.database, self.schema)
    }
}

/// The managed storage, query and AI service behind the dashboard.
///
/// Every method may fail; the dashboard turns failures into notices.
pub trait StageService {
    /// Creates the stage with server-side encryption and an auto-refreshing
    /// directory table, leaving an existing stage untouched.
    fn create_stage_if_not_exists(&mut self, location: &StageLocation) -> Result<()>;

    /// Uploads a local file to the stage under its own file name, overwriting
    /// and without compression.
    fn put_file(&mut self, local_path: &Path, location: &StageLocation) -> Result<()>;

    /// Refreshes the stage's directory table.
    fn refresh_stage(&mut self, location: &StageLocation) -> Result<()>;

    /// A time-limited URL for a staged file, if the service produced one.
    fn presigned_url(
        &mut self,
        stage: &str,
        relative_path: &str,
        expiry: Duration,
    ) -> Result<Option<String>>;

    /// Every row of the given view.
    fn query_view(&mut self, view_fqn: &str) -> Result<Vec<ViewRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_location_names() {
        let location = StageLocation {
            database: "DEMO".to_string(),
            schema: "PUBLIC".to_string(),
            stage: DEFAULT_STAGE_NAME.to_string(),
        };

        assert_eq!(location.fqn(), "DEMO.PUBLIC.SNAPS");
        assert_eq!(location.stage_ref(), "@DEMO.PUBLIC.SNAPS");
        assert_eq!(location.file_ref("a.jpg"), "@DEMO.PUBLIC.SNAPS/a.jpg");
        assert_eq!(location.view_fqn(), "DEMO.PUBLIC.SMART_CROWD_COUNTER");
    }
}
