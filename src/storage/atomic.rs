//! Write-then-rename file replacement

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Replace `path` with `data` so a crash never leaves a half-written file.
///
/// Data goes to `<path>.tmp`, is synced, then renamed over `path`.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let mut file = File::create(tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(tmp_path, path)?;
    Ok(())
}
