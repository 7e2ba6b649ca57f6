use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of one CLI run, written as `run-<uuid>.json` next to its output.
#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub run_id: String,
    pub command: String,
    pub version: String,
    pub timestamp: String,
    pub outputs: Vec<String>,
    pub params: Vec<Param>,
    pub status: String,
    #[serde(default)]
    pub duration_ms: Option<u128>,
    #[serde(default)]
    pub env: Vec<Param>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: String,
}

pub struct ManifestTelemetry {
    pub status: String,
    pub duration_ms: Option<u128>,
    pub env: Vec<Param>,
}

pub fn record_manifest(
    output: &Path,
    command: &str,
    params: &[(&str, &str)],
    telemetry: ManifestTelemetry,
) -> Result<std::path::PathBuf> {
    let run_id = Uuid::new_v4().to_string();
    let dir = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    fs::create_dir_all(&dir)?;
    let manifest = ManifestEntry {
        run_id: run_id.clone(),
        command: command.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        outputs: vec![output.display().to_string()],
        params: params
            .iter()
            .map(|(k, v)| Param {
                name: k.to_string(),
                value: v.to_string(),
            })
            .collect(),
        status: telemetry.status,
        duration_ms: telemetry.duration_ms,
        env: telemetry.env,
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    let path = dir.join(format!("run-{}.json", run_id));
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn manifest_lands_next_to_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("network_2040");
        let path = record_manifest(
            &output,
            "brownfield",
            &[("year", "2040")],
            ManifestTelemetry {
                status: "success".into(),
                duration_ms: Some(12),
                env: Vec::new(),
            },
        )
        .unwrap();
        assert_eq!(path.parent(), Some(dir.path()));

        let manifest: ManifestEntry =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(manifest.command, "brownfield");
        assert_eq!(manifest.params[0].value, "2040");
        assert_eq!(manifest.duration_ms, Some(12));
    }
}
