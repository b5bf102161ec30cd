//! Retention copies of input workbooks.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use crate::error::{IngestError, IngestResult};

/// Copies `source` into `destination_dir` under its own file name, keeping
/// its permissions and modification time. Returns the copy's path.
pub fn archive_file(source: &Path, destination_dir: &Path) -> IngestResult<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| {
        IngestError::io(
            source,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let destination = destination_dir.join(file_name);
    fs::copy(source, &destination).map_err(|err| IngestError::io(source, err))?;

    let modified = fs::metadata(source)
        .and_then(|meta| meta.modified())
        .map_err(|err| IngestError::io(source, err))?;
    File::options()
        .write(true)
        .open(&destination)
        .and_then(|file| file.set_modified(modified))
        .map_err(|err| IngestError::io(&destination, err))?;
    Ok(destination)
}
