//! vidpng core: pure task-lifecycle state machine and view-model helpers.
mod effect;
mod file_set;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, SubmissionFile};
pub use file_set::{media_type_for_path, FileEntry, FileSet, VIDEO_EXTENSIONS};
pub use msg::Msg;
pub use state::{
    AppState, DownloadState, DropStats, FailureRecord, RemotePhase, RequestStage, StatusReport,
    SubmissionId, TaskModel, TaskPhase,
};
pub use update::update;
pub use view_model::{
    format_file_size, AppViewModel, DownloadView, FileListView, FileRowView, FpsFieldView,
    StatusView,
};
