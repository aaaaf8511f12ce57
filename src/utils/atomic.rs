//! Atomic file replacement.
//!
//! The content goes to a temp file next to the target which is then renamed
//! over it, so readers see either the old file or the new one. The temp file
//! is removed if any step fails.

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `content` to `path` atomically.
///
/// The file ends up readable and writable by the owner only on Unix.
///
/// # Errors
///
/// Returns an `io::Error` if the path has no parent directory, the temp file
/// cannot be created or written, or the final rename fails.
pub async fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new(".").to_path_buf(),
        Some(p) => p.to_path_buf(),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        }
    };
    let target_path = path.to_path_buf();
    let content_owned = content.to_string();

    tokio::task::spawn_blocking(move || -> io::Result<()> {
        use std::io::Write;

        // Same directory as the target, or the rename is not atomic
        let mut temp_file = NamedTempFile::new_in(&parent)?;
        temp_file.write_all(content_owned.as_bytes())?;
        temp_file.flush()?;
        temp_file.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp_file
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        temp_file.persist(&target_path)?;
        Ok(())
    })
    .await
    .map_err(io::Error::other)?
}
