//! File tree walking and confined source reads

use crate::Result;
use crate::constants::files;
use crate::errors::ReadgoError;
use crate::interfaces::SourceReader;
use crate::syntax::{parse_source, strip_comments};
use crate::types::{
    FileContent, FileTreeNode, FunctionPosition, NodeKind, ReadOptions, TreeOptions,
};
use crate::utils::filesystem::{absolutize, clean_path, relative_slash, resolve_within};
use crate::utils::filters::{NameFilter, matches_file_type};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Reader confined to one working directory
#[derive(Debug, Clone)]
pub struct DefaultReader {
    work_dir: PathBuf,
}

impl DefaultReader {
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        let work_dir = work_dir.as_ref();
        Self {
            work_dir: absolutize(work_dir).unwrap_or_else(|_| clean_path(work_dir)),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Resolve a caller path, refusing anything outside the working directory
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        resolve_within(&self.work_dir, path)
    }

    /// Read a regular source file of an allowed type and bounded size
    pub fn safe_read(&self, path: &str) -> Result<Vec<u8>> {
        let abs = self.resolve(path)?;
        let metadata = std::fs::metadata(&abs).map_err(|e| not_found_or(e, path))?;

        if !metadata.is_file() {
            return Err(ReadgoError::invalid_input(format!("not a regular file: {}", path)).into());
        }
        if metadata.len() > files::MAX_FILE_SIZE {
            return Err(ReadgoError::invalid_input(format!("file too large: {}", path)).into());
        }

        let ext = abs
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !files::ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(
                ReadgoError::invalid_input(format!("unsupported file type: .{}", ext)).into(),
            );
        }

        Ok(std::fs::read(&abs)?)
    }

    fn file_tree(&self, root: &str, opts: &TreeOptions) -> Result<FileTreeNode> {
        let abs_root = self.resolve(root)?;
        if !abs_root.is_dir() {
            return Err(ReadgoError::not_found(format!("directory {}", root)).into());
        }
        let filter = NameFilter::new(&opts.exclude_patterns, &opts.include_patterns)?;

        let mut tree = FileTreeNode {
            name: abs_root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| root.to_string()),
            path: relative_slash(&self.work_dir, &abs_root),
            kind: NodeKind::Directory,
            size: 0,
            mod_time: modified(&abs_root),
            children: Vec::new(),
        };

        let walker = WalkDir::new(&abs_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !filter.is_excluded(&entry.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = entry?;
            if entry.depth() == 0 {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().is_dir();
            if !is_dir
                && (!filter.is_included(&name) || !matches_file_type(entry.path(), opts.file_types))
            {
                continue;
            }

            let metadata = entry.metadata()?;
            let node = FileTreeNode {
                name,
                path: relative_slash(&self.work_dir, entry.path()),
                kind: if is_dir {
                    NodeKind::Directory
                } else {
                    NodeKind::File
                },
                size: if is_dir { 0 } else { metadata.len() },
                mod_time: metadata.modified().ok().map(DateTime::<Local>::from),
                children: Vec::new(),
            };

            let parent = entry
                .path()
                .parent()
                .map(|p| relative_slash(&self.work_dir, p))
                .unwrap_or_default();
            if let Some(parent) = tree.find_dir_mut(&parent) {
                parent.children.push(node);
                parent.children.sort_by(|a, b| a.name.cmp(&b.name));
            }
        }

        Ok(tree)
    }

    /// File nodes under `root`, depth first
    pub fn file_nodes(&self, root: &str, opts: &TreeOptions) -> Result<Vec<FileTreeNode>> {
        Ok(self.file_tree(root, opts)?.files().into_iter().cloned().collect())
    }

    fn functions_of(&self, path: &str, content: &[u8]) -> Result<Vec<FunctionPosition>> {
        let file = parse_source(Path::new(path), &String::from_utf8_lossy(content))?;
        let mut functions: Vec<FunctionPosition> = file
            .functions
            .iter()
            .map(|func| FunctionPosition {
                name: match &func.receiver_base {
                    Some(receiver) => format!("{}.{}", receiver, func.name),
                    None => func.name.clone(),
                },
                start_line: func.line,
                end_line: func.end_line,
            })
            .collect();
        functions.sort_by_key(|f| f.start_line);
        Ok(functions)
    }
}

impl Default for DefaultReader {
    fn default() -> Self {
        Self::new(crate::constants::defaults::WORK_DIR)
    }
}

fn modified(path: &Path) -> Option<DateTime<Local>> {
    crate::utils::filesystem::modified_time(path).map(DateTime::<Local>::from)
}

fn not_found_or(err: std::io::Error, path: &str) -> anyhow::Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        ReadgoError::not_found(format!("file {}", path)).into()
    } else {
        err.into()
    }
}

fn strip_line_spaces(content: &str) -> String {
    content
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl SourceReader for DefaultReader {
    async fn get_file_tree(&self, root: &str, opts: &TreeOptions) -> Result<FileTreeNode> {
        self.file_tree(root, opts)
    }

    async fn read_source_file(&self, path: &str, opts: &ReadOptions) -> Result<Vec<u8>> {
        let content = self.safe_read(path)?;
        if opts.include_comments && !opts.strip_spaces {
            return Ok(content);
        }

        let mut text = String::from_utf8_lossy(&content).into_owned();
        if !opts.include_comments {
            text = strip_comments(&text)?;
        }
        if opts.strip_spaces {
            text = strip_line_spaces(&text);
        }
        Ok(text.into_bytes())
    }

    async fn get_package_files(
        &self,
        pkg_path: &str,
        opts: &TreeOptions,
    ) -> Result<Vec<FileTreeNode>> {
        self.file_nodes(pkg_path, opts)
    }

    async fn search_files(&self, pattern: &str, opts: &TreeOptions) -> Result<Vec<FileTreeNode>> {
        if pattern.is_empty() {
            return Err(ReadgoError::invalid_input("search pattern cannot be empty").into());
        }
        let tree = self.file_tree(".", opts)?;
        Ok(tree
            .files()
            .into_iter()
            .filter(|node| node.name.contains(pattern))
            .cloned()
            .collect())
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let abs = self.resolve(path)?;
        let metadata = std::fs::metadata(&abs).map_err(|e| not_found_or(e, path))?;
        if !metadata.is_file() {
            return Err(ReadgoError::invalid_input(format!("not a regular file: {}", path)).into());
        }
        if metadata.len() > files::MAX_READ_SIZE {
            return Err(ReadgoError::invalid_input(format!("file too large: {}", path)).into());
        }

        let content = std::fs::read(&abs)?;
        if std::str::from_utf8(&content).is_err() {
            return Err(ReadgoError::invalid_input(format!(
                "file contains invalid UTF-8: {}",
                path
            ))
            .into());
        }
        Ok(content)
    }

    async fn read_file_with_functions(&self, path: &str) -> Result<FileContent> {
        let content = self.safe_read(path)?;
        let functions = self.functions_of(path, &content)?;
        Ok(FileContent { content, functions })
    }
}
