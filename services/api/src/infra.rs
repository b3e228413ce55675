use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::workflows::loan_approval::{
    Classifier, LoanApprovalService, LogisticArtifact, NormalizerPolicy,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type ArtifactService = LoanApprovalService<LogisticArtifact>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the classifier artifact once and wrap it in a service.
///
/// The form policy follows the artifact's feature list unless the configuration overrides it.
pub(crate) fn load_service(
    config: &AppConfig,
    model_override: Option<&Path>,
) -> Result<Arc<ArtifactService>, AppError> {
    let path = model_override.unwrap_or(config.model.artifact_path.as_path());
    let artifact = Arc::new(LogisticArtifact::from_path(path)?);

    let service = if config.form.is_overridden() {
        let derived = NormalizerPolicy::for_features(artifact.feature_names());
        let policy = config.form.apply(derived);
        info!(?policy, "applying configured form policy");
        LoanApprovalService::with_policy(artifact, policy)
    } else {
        LoanApprovalService::new(artifact)
    };

    Ok(Arc::new(service))
}
