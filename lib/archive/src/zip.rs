use std::fs::{self, File};
use std::io::{self, Cursor, Write};
use std::path::Path;

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::ArchiveError;

/// Zip-package `source_dir` into `dest_file`.
///
/// The tree is walked recursively; only regular files for which `filter`
/// returns `Some(name)` are included, stored under that archive-relative
/// name (forward-slash separated). Unix file modes are recorded so that
/// [`unarchive`] can restore them.
pub fn archive(
    source_dir: &Path,
    dest_file: &Path,
    filter: &dyn Fn(&Path) -> Option<String>,
) -> Result<(), ArchiveError> {
    let file = File::create(dest_file)?;
    let mut writer = ZipWriter::new(file);

    add_dir(&mut writer, source_dir, filter)?;

    writer
        .finish()
        .map_err(|e| ArchiveError::Io(e.to_string()))?;
    Ok(())
}

fn add_dir(
    writer: &mut ZipWriter<File>,
    dir: &Path,
    filter: &dyn Fn(&Path) -> Option<String>,
) -> Result<(), ArchiveError> {
    // Sort entries so the archive layout is deterministic.
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            add_dir(writer, &path, filter)?;
            continue;
        }
        if !path.is_file() {
            continue;
        }
        let Some(name) = filter(&path) else {
            continue;
        };

        let mut options = SimpleFileOptions::default();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options = options.unix_permissions(entry.metadata()?.permissions().mode());
        }

        debug!("archiving {} as {name}", path.display());
        writer
            .start_file(name, options)
            .map_err(|e| ArchiveError::Io(e.to_string()))?;
        writer.write_all(&fs::read(&path)?)?;
    }
    Ok(())
}

/// Extract a zip archive into `dest_dir`.
///
/// Parent directories are created as needed, existing files are
/// overwritten in place, and unix file modes are restored. Entries whose
/// names would escape `dest_dir` fail the whole extraction.
pub fn unarchive(bytes: &[u8], dest_dir: &Path) -> Result<(), ArchiveError> {
    let cursor = Cursor::new(bytes);
    let mut reader =
        ZipArchive::new(cursor).map_err(|e| ArchiveError::Malformed(e.to_string()))?;

    for i in 0..reader.len() {
        let mut entry = reader
            .by_index(i)
            .map_err(|e| ArchiveError::Malformed(e.to_string()))?;
        let Some(rel) = entry.enclosed_name() else {
            return Err(ArchiveError::Malformed(format!(
                "unsafe entry name: {:?}",
                entry.name()
            )));
        };
        let dest = dest_dir.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&dest)?;
            continue;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&dest)?;
        io::copy(&mut entry, &mut out)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dest, fs::Permissions::from_mode(mode))?;
        }
    }
    Ok(())
}
