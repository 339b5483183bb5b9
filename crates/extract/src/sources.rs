//! 源文件发现

use crate::error::{ExtractError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 跳过的目录
const SKIP_DIRS: &[&str] = &["vendor", ".git", "testdata", "node_modules"];

/// 检查是否是 Go 源文件
pub fn is_go_file(path: &Path) -> bool {
    path.extension().map(|e| e == "go").unwrap_or(false)
}

/// 收集待分析的源文件 (排序后返回)
///
/// 文件路径直接返回自身; 目录递归收集 `.go` 文件
pub fn discover_sources(path: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    collect_go_files(path, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_go_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let io_err = |source| ExtractError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();

        if path.is_dir() {
            let skipped = path
                .file_name()
                .map(|n| SKIP_DIRS.iter().any(|&s| n == s))
                .unwrap_or(false);
            if !skipped {
                collect_go_files(&path, files)?;
            }
        } else if is_go_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}
