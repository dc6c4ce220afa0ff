pub const IDLE_BADGE: &str = "IDLE";
pub const SUBMIT_LABEL: &str = "Convert to 3D interior";
pub const UPLOADING_LABEL: &str = "Uploading...";

/// Visual emphasis of the status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeTone {
    #[default]
    Neutral,
    Running,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub file_name: Option<String>,
    pub badge_text: String,
    pub badge_tone: BadgeTone,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    pub job_id: Option<String>,
    pub error: Option<String>,
    pub scene_url: Option<String>,
    pub video_url: Option<String>,
    pub is_terminal: bool,
}
