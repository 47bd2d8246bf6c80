use std::io::Write;

/// Writes `chunks` to `path` so that readers see either the old file or the
/// complete new one, never a partial write.
///
/// The data goes to a temporary file in the *same directory* first (a rename
/// across filesystems would not be atomic), is synced, and is then renamed
/// over `path`.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written, or
/// if the final rename fails.
pub fn write_atomically<'a, I>(path: impl AsRef<std::path::Path>, chunks: I) -> std::io::Result<()>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let path = path.as_ref();
    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => std::path::Path::new("."),
    };
    let mut temp_save_file = tempfile::Builder::new()
        .prefix(".save_tmp_")
        .tempfile_in(parent_dir)?;
    let mut written = 0usize;

    for chunk in chunks {
        temp_save_file.write_all(chunk)?;
        written += chunk.len();
    }

    // Flush all bytes to the drive before the rename makes them visible.
    temp_save_file.as_file().sync_all()?;
    temp_save_file.persist(path).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), bytes = written, "saved file");

    Ok(())
}
