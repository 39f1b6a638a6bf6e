use glob::Pattern;
use jwalk::WalkDir;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::FileInfo;
use crate::tree::{ScanNode, for_each_file, insert_into_tree, remap_files};

/// How the source maps onto the torrent
#[derive(Debug, Clone, PartialEq)]
pub enum SourceLayout {
    /// The source is one file; `files` holds exactly that file
    SingleFile,
    /// The source is a directory; leaves index into `files`
    Directory(BTreeMap<String, ScanNode>),
}

/// Result of walking the source path
#[derive(Debug, Clone)]
pub struct Scan {
    /// Basename of the source
    pub name: String,
    pub layout: SourceLayout,
    /// Files in walk order (sorted by name at every level)
    pub files: Vec<FileInfo>,
}

impl Scan {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.len).sum()
    }

    pub fn is_single_file(&self) -> bool {
        matches!(self.layout, SourceLayout::SingleFile)
    }
}

/// Scans the source path and collects file information
pub fn scan_files(source: &Path, output_file: Option<&Path>, exclude_patterns: &[String]) -> Result<Scan> {
    let source = source.canonicalize().map_err(|e| Error::read(source, e))?;
    let name = source
        .file_name()
        .ok_or_else(|| Error::UnsupportedEntry(source.clone()))?
        .to_str()
        .ok_or_else(|| Error::NonUtf8Path(source.clone()))?
        .to_string();

    let metadata = fs::metadata(&source).map_err(|e| Error::read(&source, e))?;

    if metadata.is_file() {
        debug!(path = %source.display(), len = metadata.len(), "single file source");
        return Ok(Scan {
            files: vec![FileInfo {
                path: vec![name.clone()],
                full_path: source,
                len: metadata.len(),
            }],
            name,
            layout: SourceLayout::SingleFile,
        });
    }
    if !metadata.is_dir() {
        return Err(Error::UnsupportedEntry(source));
    }

    let patterns = compile_patterns(exclude_patterns)?;
    let output_canonical = output_file.and_then(|p| p.canonicalize().ok());

    let mut tree = BTreeMap::new();
    let mut found = Vec::new();
    let mut excluded_dirs: Vec<PathBuf> = Vec::new();

    let walker = WalkDir::new(&source)
        .sort(true)
        .skip_hidden(false)
        .follow_links(true);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => match broken_link(&err) {
                Some(link) if excluded_link(&source, &link, &patterns) => continue,
                Some(link) => return Err(Error::UnsupportedEntry(link)),
                None => return Err(err.into()),
            },
        };
        let entry_path = entry.path();

        let Ok(relative_path) = entry_path.strip_prefix(&source) else {
            continue;
        };
        if relative_path.as_os_str().is_empty() {
            continue;
        }
        if excluded_dirs.iter().any(|dir| relative_path.starts_with(dir)) {
            continue;
        }

        // Skip the output file if it's inside the source directory
        if output_canonical.as_deref() == Some(entry_path.as_path()) {
            debug!(path = %entry_path.display(), "skipping output file");
            continue;
        }

        let components = path_components(relative_path, &entry_path)?;

        if is_excluded(&patterns, &components) {
            debug!(path = %entry_path.display(), "excluding");
            excluded_dirs.push(relative_path.to_path_buf());
            continue;
        }

        // Follows symlinks, like the walk itself
        let metadata = fs::metadata(&entry_path).map_err(|e| Error::read(&entry_path, e))?;

        if metadata.is_dir() {
            insert_into_tree(&mut tree, &components, ScanNode::Directory(BTreeMap::new()));
        } else if metadata.is_file() {
            debug!(path = %relative_path.display(), len = metadata.len(), "found file");
            insert_into_tree(&mut tree, &components, ScanNode::File(found.len()));
            found.push(FileInfo {
                path: components,
                full_path: entry_path.clone(),
                len: metadata.len(),
            });
        } else {
            return Err(Error::UnsupportedEntry(entry_path));
        }
    }

    if found.is_empty() {
        return Err(Error::NoFiles(source));
    }

    let files = order_files(&mut tree, found);
    debug!(files = files.len(), "scan complete");

    Ok(Scan {
        name,
        layout: SourceLayout::Directory(tree),
        files,
    })
}

/// Arrange files in tree order and point the tree leaves at the new positions
fn order_files(tree: &mut BTreeMap<String, ScanNode>, found: Vec<FileInfo>) -> Vec<FileInfo> {
    let mut order = Vec::with_capacity(found.len());
    for_each_file(tree, &mut |index| order.push(index));

    let mut position = vec![0; found.len()];
    for (new_index, &old_index) in order.iter().enumerate() {
        position[old_index] = new_index;
    }
    remap_files(tree, &mut |old_index| position[old_index]);

    let mut slots: Vec<Option<FileInfo>> = found.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|old_index| slots[old_index].take())
        .collect()
}

/// A symlink with a missing target fails inside the walk when links are followed
fn broken_link(err: &jwalk::Error) -> Option<PathBuf> {
    let path = err.path()?;
    let is_link = fs::symlink_metadata(path).ok()?.file_type().is_symlink();
    (is_link && fs::metadata(path).is_err()).then(|| path.to_path_buf())
}

fn excluded_link(source: &Path, link: &Path, patterns: &[Pattern]) -> bool {
    let Ok(relative_path) = link.strip_prefix(source) else {
        return false;
    };
    path_components(relative_path, link).is_ok_and(|components| is_excluded(patterns, &components))
}

fn path_components(relative_path: &Path, full_path: &Path) -> Result<Vec<String>> {
    relative_path
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| Error::NonUtf8Path(full_path.to_path_buf()))
        })
        .collect()
}

fn compile_patterns(exclude_patterns: &[String]) -> Result<Vec<Pattern>> {
    exclude_patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| Error::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Match against the entry name or its slash-joined relative path
fn is_excluded(patterns: &[Pattern], components: &[String]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let file_name = components.last().map(String::as_str).unwrap_or_default();
    let relative = components.join("/");
    patterns
        .iter()
        .any(|p| p.matches(file_name) || p.matches(&relative))
}
