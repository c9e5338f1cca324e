use anyhow::{bail, Context, Result};
use std::{path::Path, sync::Arc};
use tch::{kind::Kind, CModule, Device, Tensor};

use crate::{config::ModelConfig, error::PredictError, pipeline::PipelineMeta, schema::RideRecord};

/// Anything that can turn a record into a cancellation probability.
pub trait CancellationScorer: Send + Sync {
    fn predict_probability(&self, record: &RideRecord) -> Result<f64>;
}

/// TorchScript classifier plus the sidecar describing its input row.
pub struct TorchModel {
    model: CModule,
    device: Device,
    meta: PipelineMeta,
}

impl TorchModel {
    pub fn load(model_path: &Path, meta_path: &Path) -> Result<Self> {
        let device = Device::Cpu;
        let meta = PipelineMeta::load(meta_path)?;

        let model = CModule::load_on_device(model_path, device)
            .with_context(|| format!("failed to load TorchScript {}", model_path.display()))?;

        // Probe output shape with a dummy forward; expect [1, C] or [C]
        let in_dim = meta.in_dim() as i64;
        let dummy = Tensor::zeros([1, in_dim], (Kind::Float, device));
        let out = model.forward_ts(&[dummy])?;
        let n_classes = match out.size().as_slice() {
            [1, c] | [c] => *c,
            other => bail!("unexpected model output size: {:?}", other),
        };
        if (n_classes as usize) <= meta.cancel_index {
            bail!(
                "model emits {} classes but meta cancel_index is {}",
                n_classes,
                meta.cancel_index
            );
        }
        tracing::info!(in_dim, n_classes, "warmup forward ok");

        Ok(Self { model, device, meta })
    }

    pub fn meta(&self) -> &PipelineMeta {
        &self.meta
    }
}

impl CancellationScorer for TorchModel {
    fn predict_probability(&self, record: &RideRecord) -> Result<f64> {
        let row = self.meta.encode(record)?;
        let input = Tensor::from_slice(&row)
            .reshape([1, row.len() as i64])
            .to_device(self.device);

        let out = tch::no_grad(|| self.model.forward_ts(&[input]))?;
        let flat = out.to_kind(Kind::Float).flatten(0, -1);
        let n = flat.size()[0];
        let scores: Vec<f32> = (0..n).map(|i| flat.double_value(&[i]) as f32).collect();

        self.meta.cancel_probability(&scores)
    }
}

/// Process-wide, read-only handle to the scorer. Built once at startup and
/// handed to every trigger; a failed load is permanent.
#[derive(Clone)]
pub enum ModelHandle {
    Ready(Arc<dyn CancellationScorer>),
    Unavailable { reason: String },
}

impl ModelHandle {
    pub fn load(cfg: &ModelConfig) -> Self {
        if !cfg.model_path.exists() {
            tracing::error!(
                path = %cfg.model_path.display(),
                "model file not found; predictions are disabled"
            );
            return ModelHandle::Unavailable {
                reason: format!("{} not found", cfg.model_path.display()),
            };
        }
        match TorchModel::load(&cfg.model_path, &cfg.meta_path) {
            Ok(m) => {
                tracing::info!(
                    path = %cfg.model_path.display(),
                    columns = m.meta().columns.len(),
                    "model loaded"
                );
                ModelHandle::Ready(Arc::new(m))
            }
            Err(e) => {
                tracing::error!("failed to load model: {e:#}; predictions are disabled");
                ModelHandle::Unavailable { reason: format!("{e:#}") }
            }
        }
    }

    pub fn from_scorer(scorer: impl CancellationScorer + 'static) -> Self {
        ModelHandle::Ready(Arc::new(scorer))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelHandle::Ready(_))
    }

    pub fn score(&self, record: &RideRecord) -> Result<f64, PredictError> {
        let scorer = match self {
            ModelHandle::Ready(s) => s,
            ModelHandle::Unavailable { .. } => return Err(PredictError::ModelUnavailable),
        };
        let p = scorer.predict_probability(record)?;
        if !(0.0..=1.0).contains(&p) {
            return Err(PredictError::ScoringFailure(format!(
                "probability {p} outside [0, 1]"
            )));
        }
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RideForm;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(f64);

    impl CancellationScorer for Fixed {
        fn predict_probability(&self, _: &RideRecord) -> Result<f64> {
            Ok(self.0)
        }
    }

    struct Counting(AtomicUsize);

    impl CancellationScorer for Counting {
        fn predict_probability(&self, _: &RideRecord) -> Result<f64> {
            self.0.fetch_add(1, Ordering::SeqCst);
            bail!("tensor shape mismatch")
        }
    }

    fn record() -> RideRecord {
        RideForm::default().into_record().unwrap()
    }

    #[test]
    fn unavailable_short_circuits() {
        let h = ModelHandle::Unavailable { reason: "gone".into() };
        assert!(!h.is_ready());
        assert_eq!(h.score(&record()), Err(PredictError::ModelUnavailable));
    }

    #[test]
    fn ready_returns_probability() {
        let h = ModelHandle::from_scorer(Fixed(0.73));
        assert!(h.is_ready());
        assert_eq!(h.score(&record()), Ok(0.73));
    }

    #[test]
    fn scorer_fault_becomes_scoring_failure() {
        let scorer = Arc::new(Counting(AtomicUsize::new(0)));
        let h = ModelHandle::Ready(scorer.clone());
        let err = h.score(&record()).unwrap_err();
        assert_eq!(err.to_string(), "Prediction failed: tensor shape mismatch");
        assert_eq!(scorer.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn out_of_range_probability_is_a_failure() {
        for p in [-0.1, 1.5, f64::NAN] {
            let h = ModelHandle::from_scorer(Fixed(p));
            assert!(matches!(h.score(&record()), Err(PredictError::ScoringFailure(_))));
        }
    }

    #[test]
    fn missing_artifact_loads_as_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ModelConfig {
            model_path: dir.path().join("cancellation_model.pt"),
            meta_path: dir.path().join("cancellation_model.meta.json"),
        };
        let h = ModelHandle::load(&cfg);
        assert!(matches!(h, ModelHandle::Unavailable { .. }));
    }
}
