//! Report formatting utilities for qualitree outputs.

use std::fmt::Write;

use serde::Serialize;

use crate::error::Result;
use crate::metrics::{AnnotatedNode, QualityMetrics};
use crate::tree::AnalysisNode;
use crate::verdict::Verdict;

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(payload)?)
}

/// Parse a persisted report back into an analysis tree.
///
/// Both annotated and plain reports are accepted. Any `metrics` present are
/// ignored; callers recompute them with [`crate::annotate`].
pub fn parse_report(contents: &str) -> Result<AnalysisNode> {
    Ok(serde_json::from_str(contents)?)
}

/// Format an average score, or `n/a` when there is no data.
pub fn format_average(metrics: &QualityMetrics) -> String {
    match (metrics.average_score, metrics.overall_verdict()) {
        (Some(average), Some(verdict)) => format!("{average:.2} ({verdict})"),
        _ => "n/a".to_string(),
    }
}

/// Render a short plain-text summary of the whole tree.
pub fn render_text(root: &AnnotatedNode) -> String {
    let metrics = root.metrics();
    let mut output = String::new();
    let _ = writeln!(output, "Root: {}", root.name());
    let _ = writeln!(output, "Files evaluated: {}", metrics.file_count);
    let _ = writeln!(output, "Average score: {}", format_average(metrics));
    let _ = writeln!(output, "Verdicts:");
    for verdict in Verdict::ALL.iter().rev() {
        let _ = writeln!(output, "- {verdict}: {}", metrics.count(*verdict));
    }
    output
}

/// Render the annotated tree as Markdown.
pub fn render_markdown(root: &AnnotatedNode) -> String {
    let metrics = root.metrics();
    let mut output = String::new();
    let _ = writeln!(output, "# Quality Report: {}\n", root.name());
    let _ = writeln!(output, "- Files evaluated: {}", metrics.file_count);
    let _ = writeln!(output, "- Average score: {}\n", format_average(metrics));

    let _ = writeln!(output, "## Verdicts\n");
    let _ = writeln!(output, "| Verdict | Score | Files |");
    let _ = writeln!(output, "| --- | --- | --- |");
    for verdict in Verdict::ALL.iter().rev() {
        let _ = writeln!(
            output,
            "| {verdict} | {} | {} |",
            verdict.score(),
            metrics.count(*verdict)
        );
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Tree\n");
    append_markdown_node(&mut output, root, 0);
    output
}

fn append_markdown_node(output: &mut String, node: &AnnotatedNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        AnnotatedNode::File(file) => {
            let _ = writeln!(output, "{indent}- `{}`: {}", file.name, file.verdict);
        }
        AnnotatedNode::Folder(folder) => {
            let files = folder.metrics.file_count;
            let noun = if files == 1 { "file" } else { "files" };
            let _ = writeln!(
                output,
                "{indent}- **{}/** {}, {files} {noun}",
                folder.name,
                format_average(&folder.metrics)
            );
            for child in &folder.children {
                append_markdown_node(output, child, depth + 1);
            }
        }
    }
}

/// Render the annotated tree as a self-contained interactive HTML page.
pub fn render_html(root: &AnnotatedNode) -> Result<String> {
    let data = embed_json(&serde_json::to_string(root)?);
    let title = escape_html(root.name());
    let mut output = String::with_capacity(HTML_HEAD.len() + HTML_SCRIPT.len() + data.len());
    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, "<html lang=\"en\">");
    let _ = writeln!(output, "<head>");
    let _ = writeln!(output, "<meta charset=\"utf-8\">");
    let _ = writeln!(output, "<title>Quality Report: {title}</title>");
    output.push_str(HTML_HEAD);
    let _ = writeln!(output, "</head>");
    let _ = writeln!(output, "<body>");
    let _ = writeln!(output, "<h1>Quality Report: {title}</h1>");
    let _ = writeln!(output, "<div id=\"summary\"></div>");
    let _ = writeln!(output, "<div id=\"tree\"></div>");
    let _ = writeln!(
        output,
        "<script id=\"report-data\" type=\"application/json\">{data}</script>"
    );
    output.push_str(HTML_SCRIPT);
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");
    Ok(output)
}

// `<\/` is a valid JSON escape and keeps the payload from closing the script tag.
fn embed_json(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\u0021--")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const HTML_HEAD: &str = r#"<style>
body { font-family: system-ui, sans-serif; margin: 2rem; color: #1f2328; }
details { margin-left: 1.25rem; }
summary { cursor: pointer; padding: 2px 0; }
.badge { display: inline-block; min-width: 5.5rem; padding: 0 6px; border-radius: 4px; color: #fff; font-size: 0.85em; text-align: center; }
.v0 { background: #b91c1c; } .v1 { background: #ea580c; } .v2 { background: #ca8a04; }
.v3 { background: #65a30d; } .v4 { background: #16a34a; } .v5 { background: #047857; }
.none { background: #9ca3af; }
.bar { display: inline-flex; width: 160px; height: 10px; margin-left: 8px; vertical-align: middle; background: #e5e7eb; }
.bar span { display: block; height: 100%; }
.meta { color: #57606a; font-size: 0.85em; margin-left: 6px; }
pre { white-space: pre-wrap; background: #f6f8fa; padding: 8px; margin: 4px 0 8px 1.25rem; }
</style>
"#;

const HTML_SCRIPT: &str = r#"<script>
(function () {
  const LEVELS = ["Critical", "Poor", "Fair", "Good", "Very Good", "Excellent"];
  const report = JSON.parse(document.getElementById("report-data").textContent);

  function bucket(score) {
    if (score === null || score === undefined) return null;
    if (score >= 4.5) return 5;
    if (score >= 3.5) return 4;
    if (score >= 2.5) return 3;
    if (score >= 1.5) return 2;
    if (score >= 0.5) return 1;
    return 0;
  }

  function badge(score, label) {
    const span = document.createElement("span");
    const level = bucket(score);
    span.className = "badge " + (level === null ? "none" : "v" + level);
    span.textContent = label;
    return span;
  }

  function bar(metrics) {
    const wrap = document.createElement("span");
    wrap.className = "bar";
    if (!metrics.fileCount) return wrap;
    LEVELS.forEach(function (label, index) {
      const count = metrics.verdictCounts[label] || 0;
      if (!count) return;
      const part = document.createElement("span");
      part.className = "v" + index;
      part.style.width = (100 * count / metrics.fileCount) + "%";
      part.title = label + ": " + count;
      wrap.appendChild(part);
    });
    return wrap;
  }

  function meta(text) {
    const span = document.createElement("span");
    span.className = "meta";
    span.textContent = text;
    return span;
  }

  function render(node, open) {
    const details = document.createElement("details");
    const summary = document.createElement("summary");
    const metrics = node.metrics;
    details.open = open;
    if (node.type === "folder") {
      const average = metrics.averageScore;
      const label = average === null ? "n/a" : average.toFixed(2) + " " + LEVELS[bucket(average)];
      summary.appendChild(badge(average, label));
      summary.appendChild(document.createTextNode(" " + node.name + "/"));
      summary.appendChild(meta(metrics.fileCount + (metrics.fileCount === 1 ? " file" : " files")));
      summary.appendChild(bar(metrics));
      details.appendChild(summary);
      node.children.forEach(function (child) { details.appendChild(render(child, false)); });
    } else {
      summary.appendChild(badge(metrics.averageScore, node.verdict));
      summary.appendChild(document.createTextNode(" " + node.name));
      if (node.language) summary.appendChild(meta(node.language));
      details.appendChild(summary);
      const analysis = document.createElement("pre");
      analysis.textContent = node.analysis || "(no rationale)";
      details.appendChild(analysis);
      if (node.source) {
        const source = document.createElement("pre");
        source.textContent = node.source;
        details.appendChild(source);
      }
    }
    return details;
  }

  const metrics = report.metrics;
  const summary = document.getElementById("summary");
  const average = metrics.averageScore;
  summary.appendChild(badge(average, average === null ? "n/a" : average.toFixed(2)));
  summary.appendChild(meta(metrics.fileCount + " files evaluated"));
  summary.appendChild(bar(metrics));
  document.getElementById("tree").appendChild(render(report, true));
})();
</script>
"#;
