//! File naming, thumbnail saving, brief files, and reference images.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;

use crate::error::GenerationError;
use crate::ports::{GeneratedBrief, ReferenceImage, ThumbnailResult};

/// Where a thumbnail ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailOutput {
    /// Inline bytes written to this file.
    Saved(PathBuf),
    /// Hosted by the provider; nothing written.
    Hosted(String),
}

/// Generate an output filename from a topic and extension.
///
/// Sanitizes the first 50 characters of the topic to kebab-case and
/// appends a unix timestamp.
#[must_use]
pub fn auto_filename(topic: &str, extension: &str) -> String {
    let sanitized = sanitize_for_filename(topic, 50);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    format!("{sanitized}-{timestamp}.{extension}")
}

/// Sanitize a string for use in a filename.
///
/// Lowercases, turns runs of non-alphanumeric characters into one hyphen,
/// and trims to `max_len`.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true;

    for ch in input.chars() {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "thumbnail".to_string()
    } else {
        result
    }
}

/// Split a base64 `data:` URI into its MIME type and bytes.
///
/// # Errors
///
/// Returns an error if the URI is not a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), GenerationError> {
    let invalid = || GenerationError::InvalidArgument("Thumbnail is not a base64 data URI".into());

    let rest = uri.strip_prefix("data:").ok_or_else(invalid)?;
    let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let mime = header.strip_suffix(";base64").ok_or_else(invalid)?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| GenerationError::InvalidArgument(format!("Thumbnail base64 is invalid: {e}")))?;
    Ok((mime.to_string(), bytes))
}

/// File extension for image bytes, sniffed from the content first.
fn extension_for(bytes: &[u8], mime: &str) -> String {
    if let Some(ext) = image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
    {
        return ext.to_string();
    }
    match mime.strip_prefix("image/") {
        Some("jpeg") => "jpg".to_string(),
        Some(subtype) if !subtype.is_empty() => subtype.to_string(),
        _ => "png".to_string(),
    }
}

/// Write an inline thumbnail to disk, or pass a hosted URL through.
///
/// Without an explicit path the file is named after the topic.
///
/// # Errors
///
/// Returns an error if the data URI is malformed or the file cannot be written.
pub fn save_thumbnail(
    thumbnail: &ThumbnailResult,
    explicit: Option<&Path>,
    topic: &str,
) -> Result<ThumbnailOutput, GenerationError> {
    if !thumbnail.is_inline() {
        return Ok(ThumbnailOutput::Hosted(thumbnail.image_uri.clone()));
    }

    let (mime, bytes) = decode_data_uri(&thumbnail.image_uri)?;
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(auto_filename(topic, &extension_for(&bytes, &mime))),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &bytes)?;
    Ok(ThumbnailOutput::Saved(path))
}

/// Write a brief as pretty JSON in the provider's field naming.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_brief(brief: &GeneratedBrief, path: &Path) -> Result<(), GenerationError> {
    let json = serde_json::to_string_pretty(brief)
        .map_err(|e| GenerationError::InvalidArgument(format!("Failed to encode brief: {e}")))?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a brief saved by [`save_brief`].
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a brief, or has an
/// empty prompt.
pub fn load_brief(path: &Path) -> Result<GeneratedBrief, GenerationError> {
    let contents = std::fs::read_to_string(path)?;
    let brief: GeneratedBrief = serde_json::from_str(&contents).map_err(|e| {
        GenerationError::InvalidArgument(format!("Failed to parse brief {}: {e}", path.display()))
    })?;
    if brief.narrative_prompt.trim().is_empty() {
        return Err(GenerationError::InvalidArgument(format!(
            "Brief {} has an empty prompt",
            path.display()
        )));
    }
    Ok(brief)
}

/// Read a reference image, detecting its MIME type from the content.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a recognized image.
pub fn load_reference_image(path: &Path) -> Result<ReferenceImage, GenerationError> {
    let bytes = std::fs::read(path)?;
    let format = image::guess_format(&bytes).map_err(|_| {
        GenerationError::InvalidArgument(format!("{} is not a recognized image", path.display()))
    })?;
    Ok(ReferenceImage { bytes, mime_type: format.to_mime_type().to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn brief() -> GeneratedBrief {
        GeneratedBrief {
            target_model_name: "veo-3".into(),
            duration_seconds: 12.0,
            aspect_ratio: "9:16".into(),
            narrative_prompt: "A raccoon chef plates spaghetti".into(),
            sound_design: "Knife shing".into(),
            visual_style: "Arcane".into(),
            twist: "Vermeer".into(),
        }
    }

    #[test]
    fn sanitize_basic() {
        assert_eq!(sanitize_for_filename("A raccoon DJ, neon glasses!", 50), "a-raccoon-dj-neon-glasses");
    }

    #[test]
    fn sanitize_truncates() {
        let long = "a".repeat(100);
        assert_eq!(sanitize_for_filename(&long, 10).len(), 10);
    }

    #[test]
    fn sanitize_empty() {
        assert_eq!(sanitize_for_filename("", 50), "thumbnail");
        assert_eq!(sanitize_for_filename("!!!", 50), "thumbnail");
    }

    #[test]
    fn auto_filename_shape() {
        let name = auto_filename("a cat", "png");
        assert!(name.starts_with("a-cat-"));
        assert_eq!(Path::new(&name).extension().unwrap(), "png");
    }

    #[test]
    fn decodes_data_uri() {
        let (mime, bytes) = decode_data_uri(&format!("data:image/png;base64,{PNG_1X1}")).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn rejects_non_base64_uri() {
        assert!(decode_data_uri("https://cdn.example/x.png").is_err());
        assert!(decode_data_uri("data:image/png,raw").is_err());
        assert!(decode_data_uri("data:image/png;base64,***").is_err());
    }

    #[test]
    fn extension_sniffed_from_bytes() {
        let (_, bytes) = decode_data_uri(&format!("data:image/png;base64,{PNG_1X1}")).unwrap();
        assert_eq!(extension_for(&bytes, "image/jpeg"), "png");
        assert_eq!(extension_for(b"not an image", "image/jpeg"), "jpg");
        assert_eq!(extension_for(b"not an image", "application/octet-stream"), "png");
    }

    #[test]
    fn hosted_thumbnail_passes_through() {
        let thumb = ThumbnailResult { image_uri: "https://cdn.example/t.png".into() };
        assert_eq!(
            save_thumbnail(&thumb, None, "ignored").unwrap(),
            ThumbnailOutput::Hosted("https://cdn.example/t.png".into())
        );
    }

    #[test]
    fn inline_thumbnail_saved_to_explicit_path() {
        let dir = std::env::temp_dir().join("promptreel_output_thumb_test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("thumb.png");

        let thumb = ThumbnailResult::from_base64("image/png", PNG_1X1);
        let saved = save_thumbnail(&thumb, Some(&path), "ignored").unwrap();

        assert_eq!(saved, ThumbnailOutput::Saved(path.clone()));
        assert!(image::open(&path).is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn reference_image_mime_detected() {
        let dir = std::env::temp_dir().join("promptreel_output_reference_test");
        std::fs::create_dir_all(&dir).unwrap();
        let image_path = dir.join("reference.bin");
        let (_, bytes) = decode_data_uri(&format!("data:image/png;base64,{PNG_1X1}")).unwrap();
        std::fs::write(&image_path, &bytes).unwrap();
        let text_path = dir.join("notes.txt");
        std::fs::write(&text_path, "just words").unwrap();

        let reference = load_reference_image(&image_path).unwrap();
        assert_eq!(reference.mime_type, "image/png");
        assert_eq!(reference.bytes, bytes);
        assert!(load_reference_image(&text_path).unwrap_err().to_string().contains("not a recognized image"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn brief_file_round_trip() {
        let dir = std::env::temp_dir().join("promptreel_output_brief_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("brief.json");

        save_brief(&brief(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"prompt\": \"A raccoon chef plates spaghetti\""));
        assert_eq!(load_brief(&path).unwrap(), brief());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_brief_rejects_other_json() {
        let dir = std::env::temp_dir().join("promptreel_output_bad_brief_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("brief.json");
        std::fs::write(&path, r#"{"topic":"cats"}"#).unwrap();

        let err = load_brief(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse brief"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
