use std::path::Path;

pub const UNTITLED_TITLE: &str = "Untitled";

/// Window title for a project: the directory name (or "Untitled"), starred when modified.  
/// 專案標題：目錄名稱（或 "Untitled"），有未儲存變更時前綴 `*`。
pub fn project_title(dir: Option<&Path>, modified: bool) -> String {
    let name = dir
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNTITLED_TITLE.to_string());
    if modified {
        format!("*{name}")
    } else {
        name
    }
}
