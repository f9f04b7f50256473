use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::workflows::approval::ModelArtifacts;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Resolve the artifact bundle path: explicit flag first, then `LOAN_MODEL_PATH`.
pub(crate) fn artifacts_path(
    config: &AppConfig,
    override_path: Option<PathBuf>,
) -> PathBuf {
    override_path.unwrap_or_else(|| config.model.artifacts_path.clone())
}

/// Load the scaler, classifier and schema once; the result is shared read-only.
pub(crate) fn load_artifacts(
    config: &AppConfig,
    override_path: Option<PathBuf>,
) -> Result<Arc<ModelArtifacts>, AppError> {
    let path = artifacts_path(config, override_path);
    let artifacts = ModelArtifacts::from_path(&path)?;
    Ok(Arc::new(artifacts))
}
