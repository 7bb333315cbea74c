use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes data atomically through a `<name>.tmp` sibling followed by rename. The parent
/// directory must already exist.  
/// 透過同目錄的 `<name>.tmp` 暫存檔再 rename 實現原子寫入；父目錄必須已存在。
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp_path = tmp_sibling(path);
    fs::write(&tmp_path, data)?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
