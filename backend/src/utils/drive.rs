//! Normalizes Google Drive share links into directly loadable image URLs
//! and probes stored links for reachability.

use url::Url;

const THUMBNAIL_WIDTH: u32 = 400;

/// Rewrites a Google Drive share URL into its thumbnail endpoint, which
/// serves the image without the interstitial viewer page. Non-Drive URLs
/// and unrecognized formats pass through unchanged.
///
/// Recognized share formats:
/// - `https://drive.google.com/file/d/<id>/view`
/// - `https://drive.google.com/uc?export=view&id=<id>`
/// - `https://drive.google.com/open?id=<id>`
pub fn normalize_drive_url(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    if !parsed
        .host_str()
        .is_some_and(|host| host.ends_with("drive.google.com"))
    {
        return raw.to_string();
    }

    let file_id = file_id_from_path(&parsed).or_else(|| {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned())
    });

    match file_id {
        Some(id) if !id.is_empty() => format!(
            "https://drive.google.com/thumbnail?id={}&sz=w{}",
            id, THUMBNAIL_WIDTH
        ),
        _ => raw.to_string(),
    }
}

fn file_id_from_path(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == "d" {
            return segments.next().map(|id| id.to_string());
        }
    }
    None
}

/// Checks whether an image link answers with a success status.
pub async fn probe_image_url(client: &reqwest::Client, raw: &str) -> bool {
    match client.get(raw).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}
