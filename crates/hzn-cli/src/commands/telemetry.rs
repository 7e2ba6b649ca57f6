use hzn_cli::manifest::{record_manifest, ManifestTelemetry, Param};
use std::{env, path::Path, time::Instant};
use tracing::{info, warn};

/// Environment variables of the workflow runner copied into manifests.
const TELEMETRY_ENV_KEYS: &[&str] = &["HZN_RUN_NAME", "HZN_SCENARIO", "SNAKEMAKE_RULE", "SLURM_JOB_ID"];

fn collect_telemetry_env() -> Vec<Param> {
    TELEMETRY_ENV_KEYS
        .iter()
        .filter_map(|key| {
            env::var(key).ok().map(|value| Param {
                name: key.to_string(),
                value,
            })
        })
        .collect()
}

pub fn record_run_timed(
    out: &Path,
    command: &str,
    params: &[(&str, &str)],
    start: Instant,
    result: &anyhow::Result<()>,
) {
    let telemetry = ManifestTelemetry {
        status: if result.is_ok() { "success" } else { "failure" }.to_string(),
        duration_ms: Some(start.elapsed().as_millis()),
        env: collect_telemetry_env(),
    };
    match record_manifest(out, command, params, telemetry) {
        Ok(path) => info!("recorded run manifest {}", path.display()),
        Err(err) => warn!("failed to record run manifest: {err}"),
    }
}
