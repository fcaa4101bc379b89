//! Crowd counter dashboard: uploads images to a stage, keeps the stage's
//! directory table fresh and reads analysed rows back from the view.

pub mod analytics;
pub mod metadata;
pub mod service;
pub mod session;
pub mod snow_cli;
pub mod state;

pub use analytics::{visible_columns, CrowdObservation, RatioSlice, ViewRow};
pub use metadata::FileMetadata;
pub use service::{StageLocation, StageService, DEFAULT_STAGE_NAME, PRESIGNED_URL_EXPIRY, VIEW_NAME};
pub use session::{Dashboard, Notice, NoticeLevel, RowDetails, UploadReport, DEFAULT_SETTLE_DELAY};
pub use snow_cli::SnowCliService;
pub use state::{DashboardEvent, DashboardState};
