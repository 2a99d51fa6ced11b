//! Directory walk and assembly of the analysis tree.
//!
//! Building happens in two steps. [`TreeBuilder::discover`] walks the
//! filesystem and records which files are eligible. [`TreeBuilder::assemble`]
//! turns that shape into an [`AnalysisNode`] given one judge response per
//! file, so evaluations can be produced sequentially or by a worker pool.

use std::path::{Path, PathBuf};

use tokei::{Config, LanguageType};

use crate::config::WalkPolicy;
use crate::error::Result;
use crate::fs::{EntryKind, FileSystem};
use crate::judge::Judge;
use crate::tree::{AnalysisNode, FileNode, FolderNode};
use crate::verdict::{Verdict, parse_verdict};

/// Prefix of the `analysis` text recorded for files the judge could not evaluate.
pub const EVALUATION_FAILED: &str = "Evaluation failed";

/// Options shaping what the builder records per file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Embed each file's contents in its node.
    pub include_source: bool,
}

/// The discovered shape of a directory tree, before evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeShape {
    /// An eligible file.
    File {
        /// Base name of the file.
        name: String,
        /// Full path used to evaluate the file.
        path: PathBuf,
    },
    /// A directory and its eligible descendants.
    Folder {
        /// Base name of the directory.
        name: String,
        /// Eligible children in listing order.
        children: Vec<TreeShape>,
    },
}

impl TreeShape {
    /// Paths of every eligible file, depth first.
    pub fn file_paths(&self) -> Vec<&Path> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, paths: &mut Vec<&'a Path>) {
        match self {
            TreeShape::File { path, .. } => paths.push(path),
            TreeShape::Folder { children, .. } => {
                for child in children {
                    child.collect_paths(paths);
                }
            }
        }
    }
}

/// Walks a directory and assembles the analysis tree.
pub struct TreeBuilder<F: FileSystem> {
    fs: F,
    policy: WalkPolicy,
    options: BuildOptions,
    languages: Config,
}

impl<F: FileSystem> TreeBuilder<F> {
    /// Create a builder with the given filesystem, policy and options.
    pub fn new(fs: F, policy: WalkPolicy, options: BuildOptions) -> Self {
        Self {
            fs,
            policy,
            options,
            languages: Config::default(),
        }
    }

    /// The inclusion policy in use.
    pub fn policy(&self) -> &WalkPolicy {
        &self.policy
    }

    /// Discover the eligible files under `root`.
    ///
    /// A directory that cannot be listed is logged and contributes no
    /// children. When `root` is a file, the result is a folder named after its
    /// parent holding just that file; the inclusion policy is not applied to it.
    pub fn discover(&self, root: &Path) -> TreeShape {
        if self.fs.is_dir(root) {
            return self.discover_dir(root, root);
        }

        let parent = root
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(entry_name)
            .unwrap_or_else(|| ".".to_string());
        TreeShape::Folder {
            name: parent,
            children: vec![TreeShape::File {
                name: entry_name(root),
                path: root.to_path_buf(),
            }],
        }
    }

    fn discover_dir(&self, root: &Path, dir: &Path) -> TreeShape {
        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("cannot list {}: {err}", dir.display());
                Vec::new()
            }
        };

        let mut children = Vec::new();
        for entry in entries {
            let relative = walk_relative(root, &entry.path);
            match entry.kind {
                EntryKind::Dir if self.policy.includes_dir(&relative) => {
                    children.push(self.discover_dir(root, &entry.path));
                }
                EntryKind::File if self.policy.includes_file(&relative) => {
                    children.push(TreeShape::File {
                        name: entry_name(&entry.path),
                        path: entry.path,
                    });
                }
                _ => log::debug!("skipping {}", entry.path.display()),
            }
        }

        TreeShape::Folder {
            name: entry_name(dir),
            children,
        }
    }

    /// Turn a discovered shape into an analysis tree.
    ///
    /// `evaluate` is called once per file, in depth-first order. A failed
    /// evaluation becomes a `Critical` node carrying the error text.
    pub fn assemble<E>(&self, shape: &TreeShape, evaluate: &mut E) -> AnalysisNode
    where
        E: FnMut(&Path) -> Result<String>,
    {
        match shape {
            TreeShape::File { name, path } => {
                AnalysisNode::File(self.file_node(name, path, evaluate(path)))
            }
            TreeShape::Folder { name, children } => {
                let mut nodes = Vec::with_capacity(children.len());
                for child in children {
                    nodes.push(self.assemble(child, &mut *evaluate));
                }
                AnalysisNode::Folder(FolderNode::new(name.clone(), nodes))
            }
        }
    }

    /// Discover and evaluate `root` sequentially, one judge call per file.
    ///
    /// Use this when the judge is a blocking call. Callers that fan out
    /// evaluations should pair [`TreeBuilder::discover`] with
    /// [`TreeBuilder::assemble`].
    pub fn build(&self, root: &Path, judge: &dyn Judge) -> AnalysisNode {
        let shape = self.discover(root);
        self.assemble(&shape, &mut |path: &Path| judge.evaluate(path))
    }

    fn file_node(&self, name: &str, path: &Path, response: Result<String>) -> FileNode {
        let mut node = match response {
            Ok(raw) => {
                let parsed = parse_verdict(&raw);
                log::info!("{}: {}", path.display(), parsed.verdict);
                FileNode::new(name, parsed.rationale, parsed.verdict)
            }
            Err(err) => {
                log::warn!("evaluation failed for {}: {err}", path.display());
                FileNode::new(name, format!("{EVALUATION_FAILED}: {err}"), Verdict::Critical)
            }
        };

        node.language =
            LanguageType::from_path(path, &self.languages).map(|language| language.to_string());
        if self.options.include_source {
            match self.fs.read_to_string(path) {
                Ok(source) => node.source = Some(source),
                Err(err) => log::warn!("cannot read source of {}: {err}", path.display()),
            }
        }
        node
    }
}

// Excludes only see the part of the path below the walk root, rooted at `/`.
fn walk_relative(root: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(relative) => Path::new("/").join(relative),
        Err(_) => path.to_path_buf(),
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
