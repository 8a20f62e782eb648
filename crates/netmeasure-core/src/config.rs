use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_eigenvector_max_iter")]
    pub eigenvector_max_iter: usize,
    #[serde(default = "default_eigenvector_tolerance")]
    pub eigenvector_tolerance: f64,
    /// Bonacich attenuation as a fraction of `1 / λmax`.
    #[serde(default = "default_bonacich_beta_ratio")]
    pub bonacich_beta_ratio: f64,
    /// Explicit metric columns; `None` computes every applicable one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested: Option<Vec<String>>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            eigenvector_max_iter: default_eigenvector_max_iter(),
            eigenvector_tolerance: default_eigenvector_tolerance(),
            bonacich_beta_ratio: default_bonacich_beta_ratio(),
            requested: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Run per-layer work on the rayon pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Return the layers that succeeded instead of failing the invocation.
    #[serde(default)]
    pub allow_partial: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: default_true(),
            allow_partial: false,
        }
    }
}

impl EngineConfig {
    /// Render as TOML, the same shape [`load_engine_config`] reads.
    ///
    /// # Errors
    ///
    /// Fails only if a value cannot be represented in TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render engine config")
    }
}

/// Load an engine config file, falling back to defaults when it is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<EngineConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

const fn default_true() -> bool {
    true
}

const fn default_eigenvector_max_iter() -> usize {
    1000
}

const fn default_eigenvector_tolerance() -> f64 {
    1e-10
}

const fn default_bonacich_beta_ratio() -> f64 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let cfg = load_engine_config(&dir.path().join("netmeasure.toml")).expect("load should succeed");
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.metrics.eigenvector_max_iter, 1000);
        assert!(cfg.execution.parallel);
        assert!(!cfg.execution.allow_partial);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let path = dir.path().join("netmeasure.toml");
        std::fs::write(
            &path,
            r#"
[metrics]
bonacich_beta_ratio = 0.25
requested = ["total_degree", "betweenness"]

[execution]
allow_partial = true
"#,
        )
        .expect("write config");

        let cfg = load_engine_config(&path).expect("load should succeed");
        assert!((cfg.metrics.bonacich_beta_ratio - 0.25).abs() < f64::EPSILON);
        assert_eq!(
            cfg.metrics.requested.as_deref(),
            Some(&["total_degree".to_string(), "betweenness".to_string()][..])
        );
        assert!((cfg.metrics.eigenvector_tolerance - 1e-10).abs() < f64::EPSILON);
        assert!(cfg.execution.parallel);
        assert!(cfg.execution.allow_partial);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[metrics\nnope").expect("write config");

        let err = load_engine_config(&path).expect_err("parse should fail");
        assert!(format!("{err:#}").contains("broken.toml"));
    }

    #[test]
    fn rendered_toml_reads_back() {
        let mut cfg = EngineConfig::default();
        cfg.execution.parallel = false;
        let text = cfg.to_toml().expect("render");
        let back: EngineConfig = toml::from_str(&text).expect("parse");
        assert_eq!(back, cfg);
    }
}
