//! `parsecache status`: report the resolved parser cache policy

use crate::cli::StatusArgs;
use parsecache::{AccessMode, CachePolicy, ConfigSnapshot, ConfigSource, PathResolver, ProjectPaths};
use parsecache_core::config::{MANIFEST_SERVICE_SECTION, REMOTE_ENDPOINT_KEY};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Resolved policy plus the inputs it was resolved from
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Configuration file that was read, if one existed
    pub config_file: Option<PathBuf>,
    pub output_root: PathBuf,
    pub enabled: bool,
    pub local: LocalStatus,
    pub remote: RemoteStatus,
}

#[derive(Debug, Serialize)]
pub struct LocalStatus {
    pub mode: AccessMode,
    pub cache_root: Option<PathBuf>,
    pub root_exists: bool,
}

#[derive(Debug, Serialize)]
pub struct RemoteStatus {
    pub mode: AccessMode,
    /// The endpoint address itself is never printed
    pub endpoint_configured: bool,
}

/// Load the configuration snapshot; a missing file is an empty configuration
pub async fn load_config(path: &Path) -> miette::Result<Option<ConfigSnapshot>> {
    let exists = tokio::fs::try_exists(path).await.map_err(|e| {
        miette::miette!("Failed to check configuration file {}: {e}", path.display())
    })?;
    if !exists {
        tracing::debug!(path = %path.display(), "No configuration file, using empty configuration");
        return Ok(None);
    }
    Ok(Some(ConfigSnapshot::load(path)?))
}

/// Resolve the policy and collect what `status` prints
pub async fn build_report(
    config: &impl ConfigSource,
    paths: &ProjectPaths,
    config_file: Option<PathBuf>,
) -> StatusReport {
    let policy = CachePolicy::resolve(config, paths);
    let cache_root = policy.local_cache_root().map(Path::to_path_buf);
    let root_exists = match &cache_root {
        Some(root) => tokio::fs::try_exists(root).await.unwrap_or(false),
        None => false,
    };

    StatusReport {
        config_file,
        output_root: paths.output_root(),
        enabled: policy.is_parser_cache_enabled(),
        local: LocalStatus {
            mode: policy.local_mode(),
            cache_root,
            root_exists,
        },
        remote: RemoteStatus {
            mode: policy.remote_mode(),
            endpoint_configured: config
                .value(MANIFEST_SERVICE_SECTION, REMOTE_ENDPOINT_KEY)
                .is_some(),
        },
    }
}

/// Human-readable rendering
pub fn render_text(report: &StatusReport) -> String {
    let mut out = String::new();
    let state = if report.enabled { "enabled" } else { "disabled" };
    let _ = writeln!(out, "Parser cache: {state}");
    match &report.config_file {
        Some(path) => {
            let _ = writeln!(out, "  config:  {}", path.display());
        }
        None => {
            let _ = writeln!(out, "  config:  (none)");
        }
    }
    let _ = writeln!(out, "  output:  {}", report.output_root.display());

    match &report.local.cache_root {
        Some(root) => {
            let existing = if report.local.root_exists { "" } else { " (not created yet)" };
            let _ = writeln!(
                out,
                "  local:   {} at {}{existing}",
                report.local.mode,
                root.display()
            );
        }
        None => {
            let _ = writeln!(out, "  local:   {} (no directory)", report.local.mode);
        }
    }

    let endpoint = if report.remote.endpoint_configured {
        "configured"
    } else {
        "absent"
    };
    let _ = writeln!(out, "  remote:  {} (endpoint {endpoint})", report.remote.mode);
    out
}

/// Run `parsecache status`
#[allow(clippy::print_stdout)]
pub async fn execute(args: &StatusArgs) -> miette::Result<()> {
    let config_path = args.config_path();
    let config = load_config(&config_path).await?;
    let config_file = config.as_ref().map(|_| config_path.clone());
    let config = config.unwrap_or_default();

    let paths = ProjectPaths::with_output_dir(&args.project_root, &args.output_dir);
    let report = build_report(&config, &paths, config_file).await;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| miette::miette!("Failed to serialize status report: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", render_text(&report));
    }
    Ok(())
}
