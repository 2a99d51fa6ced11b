//! External judge process driver and the bounded evaluation pool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use qualitree_core::{JudgeConfig, JudgeOutput, QualitreeError};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::CliResult;

/// Judge responses keyed by file path.
pub(crate) type Evaluations = HashMap<PathBuf, qualitree_core::Result<String>>;

/// Evaluate every path with at most `jobs` judge processes running at once.
///
/// Each file is an independent task; a failure or timeout is recorded for that
/// file only. A task that panics leaves no entry for its path.
pub(crate) async fn evaluate_files(
    paths: Vec<PathBuf>,
    config: Arc<JudgeConfig>,
    jobs: usize,
) -> CliResult<Evaluations> {
    let jobs = if jobs == 0 { 1 } else { jobs };
    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut tasks = JoinSet::new();

    for path in paths {
        let permit = semaphore.clone().acquire_owned().await?;
        let config = config.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let result = run_judge(&config, &path).await;
            (path, result)
        });
    }

    let mut evaluations = HashMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((path, result)) => {
                evaluations.insert(path, result);
            }
            Err(err) => log::error!("evaluation task failed: {err}"),
        }
    }

    Ok(evaluations)
}

/// Run the judge once for `path` and return its raw response.
pub(crate) async fn run_judge(
    config: &JudgeConfig,
    path: &Path,
) -> qualitree_core::Result<String> {
    let source = tokio::fs::read_to_string(path).await?;
    let request = config.request_for(path, &source);

    let mut child = Command::new(&config.program)
        .args(config.args_for(path))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| QualitreeError::Judge(format!("cannot start {}: {err}", config.program)))?;

    if let Some(mut stdin) = child.stdin.take() {
        let display = path.display().to_string();
        tokio::spawn(async move {
            // the judge may exit without draining stdin
            if let Err(err) = stdin.write_all(request.as_bytes()).await {
                log::debug!("judge stdin closed early for {display}: {err}");
            }
        });
    }

    let output = match tokio::time::timeout(config.timeout, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            return Err(QualitreeError::Judge(format!(
                "{} timed out after {:?}",
                path.display(),
                config.timeout
            )));
        }
    };

    JudgeOutput {
        path: path.to_path_buf(),
        success: output.status.success(),
        status: output.status.to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::{evaluate_files, run_judge};
    use qualitree_core::{JudgeConfig, QualitreeError};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    static UNIQUE_COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let counter = UNIQUE_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        PathBuf::from(format!("qualitree_cli_judge_test_{nanos}_{counter}"))
    }

    fn temp_file(name: &str, contents: &str) -> (PathBuf, PathBuf) {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(&root).expect("create temp dir");
        let path = root.join(name);
        std::fs::write(&path, contents).expect("write file");
        (root, path)
    }

    fn shell_judge(script: &str, timeout: Duration) -> JudgeConfig {
        JudgeConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            prompt: "Rate this file.".to_string(),
            timeout,
        }
    }

    #[tokio::test]
    async fn run_judge_returns_stdout() {
        let (root, path) = temp_file("lib.rs", "pub fn a() {}\n");
        let config = shell_judge(
            "cat > /dev/null; echo 'Readable.'; echo '**Verdict:** Good'",
            Duration::from_secs(10),
        );

        let response = run_judge(&config, &path).await.expect("response");
        assert_eq!(response, "Readable.\n**Verdict:** Good\n");

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn run_judge_feeds_prompt_and_source_on_stdin() {
        let (root, path) = temp_file("lib.rs", "pub fn marker_fn() {}\n");
        let config = shell_judge("cat", Duration::from_secs(10));

        let response = run_judge(&config, &path).await.expect("response");
        assert!(response.starts_with("Rate this file."));
        assert!(response.contains("pub fn marker_fn() {}"));
        assert!(response.contains(&path.display().to_string()));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn run_judge_reports_non_zero_exit() {
        let (root, path) = temp_file("lib.rs", "fn x() {}\n");
        let config = shell_judge("echo broken >&2; exit 3", Duration::from_secs(10));

        let error = run_judge(&config, &path).await.unwrap_err();
        match error {
            QualitreeError::Judge(message) => assert!(message.contains("broken")),
            other => panic!("expected judge error, got {other}"),
        }

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn run_judge_times_out() {
        let (root, path) = temp_file("lib.rs", "fn x() {}\n");
        let config = shell_judge("sleep 5", Duration::from_millis(200));

        let error = run_judge(&config, &path).await.unwrap_err();
        assert!(error.to_string().contains("timed out"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn run_judge_reports_missing_program() {
        let (root, path) = temp_file("lib.rs", "fn x() {}\n");
        let config = JudgeConfig {
            program: "qualitree-missing-judge-binary".to_string(),
            args: Vec::new(),
            ..JudgeConfig::default()
        };

        let error = run_judge(&config, &path).await.unwrap_err();
        assert!(error.to_string().contains("cannot start"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn evaluate_files_isolates_failures() {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(&root).expect("create temp dir");
        let mut paths = Vec::new();
        for name in ["a.rs", "bad.rs", "c.rs", "d.rs"] {
            let path = root.join(name);
            std::fs::write(&path, "fn f() {}\n").expect("write file");
            paths.push(path);
        }
        let config = shell_judge(
            "case \"$0\" in *bad*) exit 1;; esac; cat > /dev/null; echo 'Verdict: Excellent'",
            Duration::from_secs(10),
        );

        let evaluations = evaluate_files(paths.clone(), Arc::new(config), 2)
            .await
            .expect("evaluations");

        assert_eq!(evaluations.len(), 4);
        for path in &paths {
            let result = &evaluations[path];
            if path.ends_with("bad.rs") {
                assert!(result.is_err());
            } else {
                assert_eq!(result.as_deref().expect("ok"), "Verdict: Excellent\n");
            }
        }

        std::fs::remove_dir_all(&root).expect("cleanup");
    }
}
