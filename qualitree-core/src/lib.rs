#![deny(missing_docs)]
//! qualitree core library.
//!
//! This crate contains the verdict scale, the analysis tree, the metrics
//! aggregator and the tree builder that power the qualitree command line.

pub mod builder;
pub mod config;
pub mod error;
pub mod fs;
pub mod judge;
pub mod metrics;
pub mod report;
pub mod schema;
pub mod tree;
pub mod verdict;

pub use builder::{BuildOptions, EVALUATION_FAILED, TreeBuilder, TreeShape};
pub use config::{DEFAULT_EXCLUDES, DEFAULT_EXTENSIONS, WalkPolicy};
pub use error::{QualitreeError, Result};
pub use fs::{DirEntry, EntryKind, FileSystem, StdFileSystem};
pub use judge::{DEFAULT_PROMPT, Judge, JudgeConfig, JudgeOutput};
pub use metrics::{
    AnnotatedFile, AnnotatedFolder, AnnotatedNode, QualityMetrics, VerdictCounts, annotate,
};
pub use report::{
    format_average, parse_report, render_html, render_json, render_markdown, render_text,
};
pub use schema::{ReportSchema, report_schema_json};
pub use tree::{AnalysisNode, FileNode, FolderNode};
pub use verdict::{ParsedVerdict, Verdict, parse_verdict};
