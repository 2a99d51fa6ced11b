//! Machine-readable description of the persisted report shape.

use utoipa::OpenApi;

use crate::error::Result;
use crate::metrics::{AnnotatedFile, AnnotatedFolder, AnnotatedNode, QualityMetrics};
use crate::tree::{AnalysisNode, FileNode, FolderNode};
use crate::verdict::Verdict;

#[derive(OpenApi)]
#[openapi(components(schemas(
    AnnotatedNode,
    AnnotatedFile,
    AnnotatedFolder,
    QualityMetrics,
    Verdict,
    AnalysisNode,
    FileNode,
    FolderNode
)))]
/// Component schemas of annotated and plain qualitree reports.
pub struct ReportSchema;

/// Render the report component schemas as pretty JSON.
pub fn report_schema_json() -> Result<String> {
    let doc = ReportSchema::openapi();
    Ok(serde_json::to_string_pretty(&doc.components)?)
}
