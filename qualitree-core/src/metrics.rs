//! Bottom-up quality metrics over an analysis tree.
//!
//! Aggregation is a pure fold: it never touches the filesystem and can be
//! recomputed any number of times from the same [`AnalysisNode`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tree::{AnalysisNode, FileNode, FolderNode};
use crate::verdict::Verdict;

/// Number of files per verdict level. Always holds all six levels.
pub type VerdictCounts = BTreeMap<Verdict, usize>;

/// Derived quality summary for a node and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// File leaves under this node, inclusive.
    pub file_count: usize,
    /// Files per verdict level.
    pub verdict_counts: BTreeMap<Verdict, usize>,
    /// File-count-weighted mean score. `None` when there are no files.
    pub average_score: Option<f64>,
}

impl QualityMetrics {
    /// Metrics for a subtree without files.
    pub fn empty() -> Self {
        Self::from_counts(zeroed_counts())
    }

    /// Metrics for a single file with the given verdict.
    pub fn for_verdict(verdict: Verdict) -> Self {
        let mut counts = zeroed_counts();
        counts.insert(verdict, 1);
        Self::from_counts(counts)
    }

    /// Derive file count and weighted average from per-level counts.
    ///
    /// Missing levels are filled in with zero.
    pub fn from_counts(counts: VerdictCounts) -> Self {
        let mut verdict_counts = zeroed_counts();
        verdict_counts.extend(counts);

        let file_count: usize = verdict_counts.values().sum();
        let weighted: u64 = verdict_counts
            .iter()
            .map(|(verdict, count)| u64::from(verdict.score()) * *count as u64)
            .sum();
        let average_score = if file_count == 0 {
            None
        } else {
            Some(weighted as f64 / file_count as f64)
        };

        Self {
            file_count,
            verdict_counts,
            average_score,
        }
    }

    /// Sum the per-level counts of several subtrees.
    ///
    /// The average is recomputed from the summed counts, so it is weighted by
    /// file count rather than by the number of subtrees.
    pub fn combine<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a QualityMetrics>,
    {
        let mut counts = zeroed_counts();
        for part in parts {
            for (verdict, count) in &part.verdict_counts {
                *counts.entry(*verdict).or_insert(0) += count;
            }
        }
        Self::from_counts(counts)
    }

    /// Files recorded for one level.
    pub fn count(&self, verdict: Verdict) -> usize {
        self.verdict_counts.get(&verdict).copied().unwrap_or(0)
    }

    /// The average bucketed back to a level, if there is any data.
    pub fn overall_verdict(&self) -> Option<Verdict> {
        self.average_score.map(Verdict::from_score)
    }
}

fn zeroed_counts() -> VerdictCounts {
    Verdict::ALL.into_iter().map(|verdict| (verdict, 0)).collect()
}

/// An analysis node together with its computed metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotatedNode {
    /// An evaluated file.
    File(AnnotatedFile),
    /// A directory with annotated children.
    Folder(AnnotatedFolder),
}

/// A file node with its single-verdict metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnnotatedFile {
    /// Base name of the file.
    pub name: String,
    /// Free-form rationale returned by the judge.
    pub analysis: String,
    /// Verdict assigned to the file.
    pub verdict: Verdict,
    /// Language detected from the file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// File contents, when the report embeds source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Metrics of this file.
    pub metrics: QualityMetrics,
}

/// A folder node with metrics rolled up from its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnnotatedFolder {
    /// Base name of the directory.
    pub name: String,
    /// Annotated children, in listing order.
    pub children: Vec<AnnotatedNode>,
    /// Metrics of the whole subtree.
    pub metrics: QualityMetrics,
}

impl AnnotatedNode {
    /// Base name of the node.
    pub fn name(&self) -> &str {
        match self {
            AnnotatedNode::File(file) => &file.name,
            AnnotatedNode::Folder(folder) => &folder.name,
        }
    }

    /// Metrics of the node.
    pub fn metrics(&self) -> &QualityMetrics {
        match self {
            AnnotatedNode::File(file) => &file.metrics,
            AnnotatedNode::Folder(folder) => &folder.metrics,
        }
    }

    /// Drop the derived metrics, recovering the underlying analysis tree.
    pub fn to_analysis(&self) -> AnalysisNode {
        match self {
            AnnotatedNode::File(file) => AnalysisNode::File(FileNode {
                name: file.name.clone(),
                analysis: file.analysis.clone(),
                verdict: file.verdict,
                language: file.language.clone(),
                source: file.source.clone(),
            }),
            AnnotatedNode::Folder(folder) => AnalysisNode::Folder(FolderNode {
                name: folder.name.clone(),
                children: folder.children.iter().map(Self::to_analysis).collect(),
            }),
        }
    }
}

/// Compute metrics for `node` and, recursively, every descendant.
pub fn annotate(node: &AnalysisNode) -> AnnotatedNode {
    match node {
        AnalysisNode::File(file) => AnnotatedNode::File(AnnotatedFile {
            name: file.name.clone(),
            analysis: file.analysis.clone(),
            verdict: file.verdict,
            language: file.language.clone(),
            source: file.source.clone(),
            metrics: QualityMetrics::for_verdict(file.verdict),
        }),
        AnalysisNode::Folder(folder) => {
            let children: Vec<AnnotatedNode> = folder.children.iter().map(annotate).collect();
            let metrics = QualityMetrics::combine(children.iter().map(AnnotatedNode::metrics));
            AnnotatedNode::Folder(AnnotatedFolder {
                name: folder.name.clone(),
                children,
                metrics,
            })
        }
    }
}
