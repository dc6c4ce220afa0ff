use sha2::{Digest, Sha256};

use crate::AssetKind;

/// Filesystem-safe, deterministic name: `{job_id}-{kind}--{short_hash(url)}.{ext}`.
///
/// The extension is taken from the URL path when it looks like one,
/// otherwise the asset kind's default is used.
pub fn asset_filename(job_id: &str, kind: AssetKind, url: &str) -> String {
    let sanitized = sanitize_component(job_id);
    let hash = short_hash(url);
    let ext = url_extension(url).unwrap_or_else(|| kind.default_extension().to_string());
    format!("{sanitized}-{}--{hash}.{ext}", kind.label())
}

fn sanitize_component(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);
    if cleaned.is_empty() {
        return "job".to_string();
    }

    // Collapse runs of underscores.
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let mut end = compacted.len().min(64);
    while !compacted.is_char_boundary(end) {
        end -= 1;
    }
    compacted.truncate(end);
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn url_extension(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    let valid = !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
