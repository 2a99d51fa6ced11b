//! The analysis tree: folder and file nodes carrying raw verdicts.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::verdict::Verdict;

/// A node of the analysis tree, mirroring a filesystem entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisNode {
    /// An evaluated file.
    File(FileNode),
    /// A directory and its eligible descendants.
    Folder(FolderNode),
}

/// An evaluated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileNode {
    /// Base name of the file.
    pub name: String,
    /// Free-form rationale returned by the judge, or the failure message.
    pub analysis: String,
    /// Verdict assigned to the file.
    pub verdict: Verdict,
    /// Language detected from the file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// File contents, when the report embeds source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl FileNode {
    /// Create a file node without language or source annotations.
    pub fn new(name: impl Into<String>, analysis: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            name: name.into(),
            analysis: analysis.into(),
            verdict,
            language: None,
            source: None,
        }
    }
}

/// A directory node. Child order is the directory listing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FolderNode {
    /// Base name of the directory.
    pub name: String,
    /// Eligible children. May be empty.
    #[serde(default)]
    pub children: Vec<AnalysisNode>,
}

impl FolderNode {
    /// Create a folder node.
    pub fn new(name: impl Into<String>, children: Vec<AnalysisNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

impl AnalysisNode {
    /// Base name of the node.
    pub fn name(&self) -> &str {
        match self {
            AnalysisNode::File(file) => &file.name,
            AnalysisNode::Folder(folder) => &folder.name,
        }
    }

    /// Number of file leaves in the subtree, counted structurally.
    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    /// Iterate every file leaf in the subtree, depth first.
    pub fn files(&self) -> Files<'_> {
        Files { stack: vec![self] }
    }
}

impl From<FileNode> for AnalysisNode {
    fn from(value: FileNode) -> Self {
        AnalysisNode::File(value)
    }
}

impl From<FolderNode> for AnalysisNode {
    fn from(value: FolderNode) -> Self {
        AnalysisNode::Folder(value)
    }
}

/// Depth-first iterator over the file leaves of an [`AnalysisNode`].
pub struct Files<'a> {
    stack: Vec<&'a AnalysisNode>,
}

impl<'a> Iterator for Files<'a> {
    type Item = &'a FileNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                AnalysisNode::File(file) => return Some(file),
                AnalysisNode::Folder(folder) => self.stack.extend(folder.children.iter().rev()),
            }
        }
        None
    }
}
