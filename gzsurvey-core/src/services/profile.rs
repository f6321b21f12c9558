// File: gzsurvey-core/src/services/profile.rs

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use gzsurvey_common::models::ProfileUpdate;
use crate::Error;

pub const MAX_DISPLAY_NAME_CHARS: usize = 100;
pub const MAX_PICTURE_URL_LEN: usize = 2048;
pub const MAX_PICTURE_BYTES: usize = 512 * 1024;

const DATA_URL_TYPES: &[&str] = &["png", "jpeg", "webp"];

/// Validates a self-service profile change. At least one field must be set.
pub fn validate_profile_update(
    display_name: Option<&str>,
    profile_pic: Option<&str>,
) -> Result<ProfileUpdate, Error> {
    if display_name.is_none() && profile_pic.is_none() {
        return Err(Error::InvalidInput("Nothing to update".into()));
    }

    let display_name = display_name.map(validate_display_name).transpose()?;
    let profile_pic = profile_pic.map(validate_profile_pic).transpose()?;
    Ok(ProfileUpdate { display_name, profile_pic })
}

fn validate_display_name(raw: &str) -> Result<String, Error> {
    let name = raw.trim();
    let chars = name.chars().count();
    if chars == 0 || chars > MAX_DISPLAY_NAME_CHARS {
        return Err(Error::InvalidInput(format!(
            "Display name must be 1 to {} characters",
            MAX_DISPLAY_NAME_CHARS
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(Error::InvalidInput("Display name contains invalid characters".into()));
    }
    Ok(name.to_string())
}

fn validate_profile_pic(raw: &str) -> Result<String, Error> {
    let pic = raw.trim();

    if let Some(rest) = pic.strip_prefix("data:image/") {
        let (kind, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| Error::InvalidInput("Profile picture must be base64 encoded".into()))?;
        if !DATA_URL_TYPES.contains(&kind) {
            return Err(Error::InvalidInput("Profile picture must be PNG, JPEG or WebP".into()));
        }
        // Cheap upper bound before decoding.
        if payload.len() > (MAX_PICTURE_BYTES / 3 + 1) * 4 {
            return Err(Error::InvalidInput("Profile picture is too large".into()));
        }
        let decoded = BASE64
            .decode(payload)
            .map_err(|_| Error::InvalidInput("Profile picture is not valid base64".into()))?;
        if decoded.is_empty() || decoded.len() > MAX_PICTURE_BYTES {
            return Err(Error::InvalidInput("Profile picture is too large".into()));
        }
        return Ok(pic.to_string());
    }

    if pic.starts_with("https://") && pic.len() > "https://".len() {
        if pic.len() > MAX_PICTURE_URL_LEN || pic.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::InvalidInput("Profile picture URL is invalid".into()));
        }
        return Ok(pic.to_string());
    }

    Err(Error::InvalidInput(
        "Profile picture must be an https URL or an image data URL".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_at_least_one_field() {
        assert!(matches!(validate_profile_update(None, None), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn display_name_is_trimmed_and_bounded() {
        let u = validate_profile_update(Some("  Ana  "), None).unwrap();
        assert_eq!(u.display_name.as_deref(), Some("Ana"));
        assert!(u.profile_pic.is_none());

        assert!(validate_profile_update(Some("   "), None).is_err());
        assert!(validate_profile_update(Some(&"x".repeat(101)), None).is_err());
        assert!(validate_profile_update(Some(&"é".repeat(100)), None).is_ok());
        assert!(validate_profile_update(Some("Ana\u{0007}"), None).is_err());
    }

    #[test]
    fn accepts_https_and_small_data_urls() {
        assert!(validate_profile_update(None, Some("https://cdn.example.com/a.png")).is_ok());
        let small = format!("data:image/png;base64,{}", BASE64.encode([0u8; 64]));
        assert!(validate_profile_update(None, Some(&small)).is_ok());
    }

    #[test]
    fn rejects_other_schemes_types_and_oversized_images() {
        assert!(validate_profile_update(None, Some("http://example.com/a.png")).is_err());
        assert!(validate_profile_update(None, Some("javascript:alert(1)")).is_err());
        let gif = format!("data:image/gif;base64,{}", BASE64.encode([0u8; 8]));
        assert!(validate_profile_update(None, Some(&gif)).is_err());
        let svg = format!("data:image/svg+xml;base64,{}", BASE64.encode(b"<svg/>"));
        assert!(validate_profile_update(None, Some(&svg)).is_err());
        let big = format!("data:image/jpeg;base64,{}", BASE64.encode(vec![0u8; MAX_PICTURE_BYTES + 1]));
        assert!(validate_profile_update(None, Some(&big)).is_err());
        let long_url = format!("https://example.com/{}", "a".repeat(MAX_PICTURE_URL_LEN));
        assert!(validate_profile_update(None, Some(&long_url)).is_err());
    }
}
