use studio_core::{AppViewModel, BadgeTone};

pub const SCENE_PLACEHOLDER: &str = "Preview image will appear here.";
pub const VIDEO_PLACEHOLDER: &str = "Video walkthrough will appear here.";

/// Renders the view model as the lines of one terminal frame.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![status_line(view)];

    if let Some(error) = &view.error {
        lines.push(format!("  error: {error}"));
    }

    if view.is_terminal || view.scene_url.is_some() || view.video_url.is_some() {
        lines.push(asset_line(
            "3D preview",
            view.scene_url.as_deref(),
            SCENE_PLACEHOLDER,
        ));
        lines.push(asset_line(
            "Walkthrough video",
            view.video_url.as_deref(),
            VIDEO_PLACEHOLDER,
        ));
    }

    lines
}

fn status_line(view: &AppViewModel) -> String {
    let file = view.file_name.as_deref().unwrap_or("no file selected");
    let mut line = format!(
        "{marker} Job status: {badge} | {file}",
        marker = tone_marker(view.badge_tone),
        badge = view.badge_text,
    );
    if let Some(job_id) = &view.job_id {
        line.push_str(&format!(" | Job ID: {job_id}"));
    }
    if !view.submit_enabled && view.file_name.is_some() {
        line.push_str(&format!(" | {}", view.submit_label));
    }
    line
}

fn asset_line(title: &str, url: Option<&str>, placeholder: &str) -> String {
    format!("  {title}: {}", url.unwrap_or(placeholder))
}

fn tone_marker(tone: BadgeTone) -> &'static str {
    match tone {
        BadgeTone::Neutral => "[ ]",
        BadgeTone::Running => "[~]",
        BadgeTone::Done => "[+]",
        BadgeTone::Failed => "[!]",
    }
}
