//! Build-output path resolution for the local cache tier.

use std::path::{Path, PathBuf};

/// Name of the build tool's default output directory under the project root
pub const DEFAULT_OUTPUT_DIR: &str = "buck-out";

/// Resolves configured paths against the build output directory
pub trait PathResolver: Send + Sync {
    /// Absolute path of the build tool's default output directory
    fn output_root(&self) -> PathBuf;

    /// Resolve a configured directory value.
    ///
    /// An empty value means the output root itself, a relative value is
    /// joined onto the output root, and an absolute value is used as-is.
    fn resolve(&self, raw: &str) -> PathBuf {
        if raw.is_empty() {
            return self.output_root();
        }
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_root().join(path)
        }
    }
}

impl<T: PathResolver + ?Sized> PathResolver for &T {
    fn output_root(&self) -> PathBuf {
        (**self).output_root()
    }

    fn resolve(&self, raw: &str) -> PathBuf {
        (**self).resolve(raw)
    }
}

impl<T: PathResolver + ?Sized> PathResolver for std::sync::Arc<T> {
    fn output_root(&self) -> PathBuf {
        (**self).output_root()
    }

    fn resolve(&self, raw: &str) -> PathBuf {
        (**self).resolve(raw)
    }
}

/// Project layout: a project root and the output directory beneath it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    project_root: PathBuf,
    output_dir: PathBuf,
}

impl ProjectPaths {
    /// Layout with the default output directory name.
    ///
    /// A relative project root is made absolute against the current
    /// directory so resolved cache roots are always absolute.
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self::with_output_dir(project_root, DEFAULT_OUTPUT_DIR)
    }

    /// Layout with a custom output directory (relative to the project root, or absolute)
    #[must_use]
    pub fn with_output_dir(project_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let project_root = std::path::absolute(&project_root).unwrap_or(project_root);
        Self {
            project_root,
            output_dir: output_dir.into(),
        }
    }

    /// The project root this layout was built from
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

impl PathResolver for ProjectPaths {
    fn output_root(&self) -> PathBuf {
        self.project_root.join(&self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_root_uses_default_dir() {
        let paths = ProjectPaths::new("/repo");
        assert_eq!(paths.output_root(), PathBuf::from("/repo/buck-out"));
    }

    #[test]
    fn test_resolve_empty_is_output_root() {
        let paths = ProjectPaths::new("/repo");
        assert_eq!(paths.resolve(""), PathBuf::from("/repo/buck-out"));
    }

    #[test]
    fn test_resolve_relative_joins_output_root() {
        let paths = ProjectPaths::new("/repo");
        assert_eq!(
            paths.resolve("parser/cache"),
            PathBuf::from("/repo/buck-out/parser/cache")
        );
    }

    #[test]
    fn test_resolve_absolute_is_unchanged() {
        let paths = ProjectPaths::new("/repo");
        assert_eq!(paths.resolve("/cache"), PathBuf::from("/cache"));
    }

    #[test]
    fn test_relative_project_root_becomes_absolute() {
        let paths = ProjectPaths::new("relative/project");
        assert!(paths.project_root().is_absolute());
        assert!(paths.resolve("x").is_absolute());
    }

    #[test]
    fn test_custom_output_dir() {
        let paths = ProjectPaths::with_output_dir("/repo", "out");
        assert_eq!(paths.resolve("cache"), PathBuf::from("/repo/out/cache"));
    }
}
