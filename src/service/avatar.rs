use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::HomeMatchError;

pub const AVATAR_DIR: &str = "avatars";

/// File extension for an accepted avatar content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Subject ids may carry provider prefixes like `auth0|123`; keep file names tame.
fn file_stem(user_id: &str) -> String {
    user_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Write the avatar under `{storage_dir}/avatars/` and return its path
/// relative to `storage_dir`.
pub async fn store_avatar(
    storage_dir: &Path,
    user_id: &str,
    extension: &str,
    bytes: &[u8],
) -> Result<String, HomeMatchError> {
    let dir = storage_dir.join(AVATAR_DIR);
    tokio::fs::create_dir_all(&dir).await?;
    let file_name = format!(
        "{}-{}.{extension}",
        file_stem(user_id),
        Utc::now().timestamp_millis()
    );
    tokio::fs::write(dir.join(&file_name), bytes).await?;
    debug!(user_id, file = %file_name, size = bytes.len(), "avatar stored");
    Ok(format!("{AVATAR_DIR}/{file_name}"))
}

/// Local path of a previously issued avatar URL, if it points into our storage.
pub fn local_path_for(cfg: &Config, url: &str) -> Option<PathBuf> {
    let prefix = cfg.storage_url(&format!("{AVATAR_DIR}/"));
    let name = url.strip_prefix(&prefix)?;
    if name.is_empty() || name.contains('/') || name.contains("..") {
        return None;
    }
    Some(cfg.storage_dir.join(AVATAR_DIR).join(name))
}

/// Best-effort cleanup of a replaced avatar.
pub async fn remove_previous(cfg: &Config, previous_url: Option<&str>) {
    let Some(path) = previous_url.and_then(|url| local_path_for(cfg, url)) else {
        return;
    };
    if let Err(e) = tokio::fs::remove_file(&path).await {
        warn!(path = %path.display(), error = %e, "failed to remove previous avatar");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types() {
        assert_eq!(extension_for("image/PNG"), Some("png"));
        assert_eq!(extension_for("image/jpeg; charset=binary"), Some("jpg"));
        assert_eq!(extension_for("application/pdf"), None);
    }

    #[test]
    fn only_our_own_urls_map_to_local_files() {
        let cfg = Config::default();
        let ours = cfg.storage_url("avatars/u_1-5.png");
        assert_eq!(
            local_path_for(&cfg, &ours),
            Some(cfg.storage_dir.join("avatars").join("u_1-5.png"))
        );
        assert_eq!(local_path_for(&cfg, "https://gravatar.com/x.png"), None);
        assert_eq!(local_path_for(&cfg, &cfg.storage_url("avatars/../secret")), None);
    }

    #[test]
    fn provider_prefixed_subjects_are_sanitized() {
        assert_eq!(file_stem("auth0|abc.def"), "auth0_abc_def");
    }
}
