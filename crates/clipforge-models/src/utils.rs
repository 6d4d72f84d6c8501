//! Small shared utilities for formatting and output naming.

/// Format seconds into HH:MM:SS or HH:MM:SS.mmm string.
pub fn format_seconds(total_secs: f64) -> String {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    // Include milliseconds if present
    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// Sanitize a name for use in filenames.
///
/// Only allows ASCII alphanumeric, hyphen, underscore, and space; whitespace
/// runs collapse to a single underscore and the result is lowercased.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
        .chars()
        .take(50) // Limit length
        .collect()
}

/// Output filename for a (scene, platform) clip.
pub fn clip_filename(scene_id: u32, platform_id: &str) -> String {
    format!("clip_{:02}_{}.mp4", scene_id, sanitize_filename(platform_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00:00");
        assert_eq!(format_seconds(90.0), "00:01:30");
        assert_eq!(format_seconds(3661.0), "01:01:01");
        assert_eq!(format_seconds(30.5), "00:00:30.500");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Amazing Scene!"), "my_amazing_scene");
        assert_eq!(sanitize_filename("café många"), "caf_mnga");
    }

    #[test]
    fn test_clip_filename() {
        assert_eq!(clip_filename(3, "tiktok"), "clip_03_tiktok.mp4");
        assert_eq!(
            clip_filename(12, "instagram-reels"),
            "clip_12_instagram-reels.mp4"
        );
    }
}
