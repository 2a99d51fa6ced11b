//! Inclusion policy for the directory walk.

use std::path::Path;

/// File extensions evaluated when no allow-list is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "jsx", "ts", "tsx", "go", "java", "kt", "kts", "c", "h", "cpp", "hpp",
    "cc", "cxx", "cs", "rb", "php", "swift", "scala",
];

/// Path substrings skipped when no exclude list is configured.
///
/// Directories are matched with a trailing `/`, so `/target/` excludes a
/// `target` directory without touching `target_spec.rs`.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules/",
    ".git/",
    "__pycache__/",
    ".venv/",
    "/venv/",
    "/target/",
    "/dist/",
    "/build/",
];

/// Decides which directory entries the tree builder visits.
///
/// Paths handed to [`WalkPolicy::includes_file`] and [`WalkPolicy::includes_dir`]
/// are relative to the walk root and start with `/`, so `/build/` matches a
/// `build` folder inside the tree but not one the tree happens to live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkPolicy {
    extensions: Vec<String>,
    exclude: Vec<String>,
}

impl Default for WalkPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS, DEFAULT_EXCLUDES)
    }
}

impl WalkPolicy {
    /// Build a policy from an extension allow-list and path-substring excludes.
    ///
    /// Extensions are matched case-insensitively and may be given with or
    /// without a leading dot. Empty entries are ignored.
    pub fn new<E, X>(extensions: E, exclude: X) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        X: IntoIterator,
        X::Item: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        let exclude = exclude
            .into_iter()
            .map(|pattern| pattern.as_ref().trim().to_string())
            .filter(|pattern| !pattern.is_empty())
            .collect();
        Self {
            extensions,
            exclude,
        }
    }

    /// Normalised extension allow-list.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Exclude substrings.
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Whether a file should be evaluated.
    pub fn includes_file(&self, path: &Path) -> bool {
        self.has_allowed_extension(path) && !self.is_excluded(path, false)
    }

    /// Whether a directory should be descended into.
    pub fn includes_dir(&self, path: &Path) -> bool {
        !self.is_excluded(path, true)
    }

    fn has_allowed_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.extensions.iter().any(|allowed| *allowed == ext)
    }

    fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        let mut candidate = path.to_string_lossy().replace('\\', "/");
        if is_dir && !candidate.ends_with('/') {
            candidate.push('/');
        }
        self.exclude
            .iter()
            .any(|pattern| candidate.contains(pattern.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::WalkPolicy;
    use std::path::Path;

    #[test]
    fn default_policy_accepts_source_files() {
        let policy = WalkPolicy::default();
        assert!(policy.includes_file(Path::new("/repo/src/main.rs")));
        assert!(policy.includes_file(Path::new("/repo/app/View.TSX")));
        assert!(!policy.includes_file(Path::new("/repo/README.md")));
        assert!(!policy.includes_file(Path::new("/repo/Makefile")));
    }

    #[test]
    fn default_policy_skips_vendored_directories() {
        let policy = WalkPolicy::default();
        assert!(!policy.includes_dir(Path::new("/repo/node_modules")));
        assert!(!policy.includes_dir(Path::new("/repo/.git")));
        assert!(!policy.includes_dir(Path::new("/repo/target")));
        assert!(policy.includes_dir(Path::new("/repo/src")));
        assert!(policy.includes_file(Path::new("/repo/src/target_spec.rs")));
        assert!(!policy.includes_file(Path::new("/repo/web/node_modules/pkg/index.js")));
    }

    #[test]
    fn root_relative_paths_anchor_directory_excludes() {
        let policy = WalkPolicy::default();
        assert!(policy.includes_file(Path::new("/main.rs")));
        assert!(policy.includes_dir(Path::new("/src")));
        assert!(!policy.includes_dir(Path::new("/build")));
        assert!(!policy.includes_file(Path::new("/app/dist/bundle.js")));
        assert!(policy.includes_file(Path::new("/distribution/mod.rs")));
    }

    #[test]
    fn extensions_are_normalised() {
        let policy = WalkPolicy::new([".PY", " rs ", ""], Vec::<String>::new());
        assert_eq!(policy.extensions(), ["py", "rs"]);
        assert!(policy.includes_file(Path::new("tool.py")));
        assert!(policy.includes_file(Path::new("lib.RS")));
        assert!(!policy.includes_file(Path::new("index.js")));
    }

    #[test]
    fn custom_excludes_match_path_substrings() {
        let policy = WalkPolicy::new(["rs"], ["generated", "/fixtures/"]);
        assert!(!policy.includes_file(Path::new("src/generated_api.rs")));
        assert!(!policy.includes_dir(Path::new("tests/fixtures")));
        assert!(policy.includes_dir(Path::new("tests/fixtures_helpers")));
        assert!(policy.includes_file(Path::new("src/lib.rs")));
    }
}
