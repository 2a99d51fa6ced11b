#![deny(missing_docs)]
//! qualitree command-line interface.
//!
//! Evaluates a source tree file by file with an external judge and renders
//! the aggregated quality report.

mod judge;

use clap::{Args, Parser, Subcommand, ValueEnum};
use qualitree_core::judge::{DEFAULT_JUDGE_ARGS, DEFAULT_JUDGE_PROGRAM};
use qualitree_core::{
    AnnotatedNode, BuildOptions, JudgeConfig, QualitreeError, StdFileSystem, TreeBuilder,
    WalkPolicy, annotate, parse_report, render_html, render_json, render_markdown, render_text,
    report_schema_json,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const DEFAULT_REPORT: &str = "qualitree-report.json";
const DEFAULT_HTML: &str = "qualitree-report.html";

#[derive(Parser)]
#[command(
    name = "qualitree",
    version,
    about = "Hierarchical code quality reports from an external judge"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct JudgeArgs {
    /// Judge executable, invoked once per file.
    #[arg(long = "judge", env = "QUALITREE_JUDGE", default_value = DEFAULT_JUDGE_PROGRAM)]
    program: String,
    /// Argument passed to the judge before the file path (repeatable).
    ///
    /// Values are taken verbatim, commas included, so `QUALITREE_JUDGE_ARGS`
    /// carries a single argument. Use repeated flags to pass several.
    #[arg(
        long = "judge-arg",
        env = "QUALITREE_JUDGE_ARGS",
        allow_hyphen_values = true
    )]
    args: Vec<String>,
    /// File whose contents replace the built-in instruction prompt.
    #[arg(long, env = "QUALITREE_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,
    /// Seconds before a single judge run is abandoned.
    #[arg(long, env = "QUALITREE_TIMEOUT_SECS", default_value_t = 300)]
    timeout_secs: u64,
    /// Maximum number of judge processes running at once.
    #[arg(short = 'j', long, env = "QUALITREE_JOBS", default_value_t = 1)]
    jobs: usize,
}

#[derive(Args, Clone, Debug)]
struct WalkArgs {
    /// File extensions to evaluate (comma-separated). Defaults to common source files.
    #[arg(long, env = "QUALITREE_EXTENSIONS", value_delimiter = ',')]
    extensions: Vec<String>,
    /// Path substrings to skip (comma-separated). Defaults to vendored and build dirs.
    #[arg(long, env = "QUALITREE_EXCLUDE", value_delimiter = ',')]
    exclude: Vec<String>,
    /// Embed each file's source in the report.
    #[arg(long)]
    include_source: bool,
}

#[derive(Args, Clone, Debug)]
struct OutputArgs {
    /// Format of the summary printed to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Where to write the HTML visualization.
    #[arg(long)]
    html: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a folder and write the JSON report and HTML visualization.
    Evaluate {
        /// Folder (or single file) to evaluate.
        path: PathBuf,
        /// Where to write the JSON report.
        #[arg(short, long, default_value = DEFAULT_REPORT)]
        output: PathBuf,
        #[command(flatten)]
        judge: JudgeArgs,
        #[command(flatten)]
        walk: WalkArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Re-render the visualization of a previously written JSON report.
    Render {
        /// JSON report produced by `evaluate`.
        report_path: PathBuf,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Print the JSON schema of the report format.
    Schema,
}

#[cfg(not(test))]
#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(err) = run(cli.command).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
fn main() {}

async fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Evaluate {
            path,
            output,
            judge,
            walk,
            report,
        } => {
            let config = resolve_judge_config(&judge).await?;
            run_evaluate(
                path,
                output,
                config,
                judge.jobs,
                resolve_walk_policy(&walk),
                BuildOptions {
                    include_source: walk.include_source,
                },
                report,
            )
            .await
        }
        Commands::Render {
            report_path,
            report,
        } => run_render(report_path, report).await,
        Commands::Schema => {
            println!("{}", report_schema_json()?);
            Ok(())
        }
    }
}

async fn run_evaluate(
    path: PathBuf,
    output: PathBuf,
    config: JudgeConfig,
    jobs: usize,
    policy: WalkPolicy,
    options: BuildOptions,
    report: OutputArgs,
) -> CliResult<()> {
    if !tokio::fs::try_exists(&path).await? {
        return Err(format!("path not found: {}", path.display()).into());
    }
    let root = tokio::fs::canonicalize(&path).await?;

    let builder = TreeBuilder::new(StdFileSystem::new(), policy, options);
    let shape = builder.discover(&root);
    let paths: Vec<PathBuf> = shape
        .file_paths()
        .into_iter()
        .map(Path::to_path_buf)
        .collect();
    log::info!(
        "evaluating {} files under {} with {} worker(s)",
        paths.len(),
        root.display(),
        jobs.max(1)
    );

    let mut evaluations = judge::evaluate_files(paths, Arc::new(config), jobs).await?;
    let tree = builder.assemble(&shape, &mut |file: &Path| {
        evaluations.remove(file).unwrap_or_else(|| {
            Err(QualitreeError::Judge(format!(
                "no evaluation recorded for {}",
                file.display()
            )))
        })
    });
    let annotated = annotate(&tree);

    write_output(&output, render_json(&annotated)?).await?;
    log::info!("report written to {}", output.display());
    let html = report
        .html
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HTML));
    write_output(&html, render_html(&annotated)?).await?;
    log::info!("visualization written to {}", html.display());

    print!("{}", render_summary(&annotated, report.format)?);
    Ok(())
}

async fn run_render(report_path: PathBuf, report: OutputArgs) -> CliResult<()> {
    let contents = tokio::fs::read_to_string(&report_path)
        .await
        .map_err(|err| format!("cannot read {}: {err}", report_path.display()))?;
    let tree = parse_report(&contents)
        .map_err(|err| format!("cannot parse {}: {err}", report_path.display()))?;
    let annotated = annotate(&tree);

    let html = report
        .html
        .clone()
        .unwrap_or_else(|| report_path.with_extension("html"));
    write_output(&html, render_html(&annotated)?).await?;
    log::info!("visualization written to {}", html.display());

    print!("{}", render_summary(&annotated, report.format)?);
    Ok(())
}

async fn resolve_judge_config(args: &JudgeArgs) -> CliResult<JudgeConfig> {
    let mut config = JudgeConfig {
        program: args.program.clone(),
        args: args.args.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
        ..JudgeConfig::default()
    };
    if config.args.is_empty() && config.program == DEFAULT_JUDGE_PROGRAM {
        config.args = DEFAULT_JUDGE_ARGS.iter().map(|arg| arg.to_string()).collect();
    }
    if let Some(prompt_file) = &args.prompt_file {
        config.prompt = tokio::fs::read_to_string(prompt_file)
            .await
            .map_err(|err| format!("cannot read prompt {}: {err}", prompt_file.display()))?;
    }
    Ok(config)
}

fn resolve_walk_policy(args: &WalkArgs) -> WalkPolicy {
    let defaults = WalkPolicy::default();
    let extensions = if args.extensions.is_empty() {
        defaults.extensions().to_vec()
    } else {
        args.extensions.clone()
    };
    let exclude = if args.exclude.is_empty() {
        defaults.exclude().to_vec()
    } else {
        args.exclude.clone()
    };
    WalkPolicy::new(extensions, exclude)
}

fn render_summary(annotated: &AnnotatedNode, format: OutputFormat) -> CliResult<String> {
    let contents = match format {
        OutputFormat::Text => render_text(annotated),
        OutputFormat::Markdown => render_markdown(annotated),
        OutputFormat::Json => {
            let mut json = render_json(annotated)?;
            json.push('\n');
            json
        }
    };
    Ok(contents)
}

async fn write_output(path: &Path, contents: String) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|err| format!("cannot write {}: {err}", path.display()))?;
    Ok(())
}
