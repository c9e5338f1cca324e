//! Sidecar metadata shipped next to the TorchScript artifact. It records how
//! the training pipeline laid a record out as a float row and how to read the
//! cancel-class probability back out of the module's output.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::schema::{ColumnValue, RideRecord};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnSpec {
    Numeric {
        name: String,
        #[serde(default)]
        mean: Option<f64>,
        #[serde(default)]
        std: Option<f64>,
    },
    Categorical {
        name: String,
        categories: Vec<String>,
    },
}

impl ColumnSpec {
    pub fn name(&self) -> &str {
        match self {
            ColumnSpec::Numeric { name, .. } | ColumnSpec::Categorical { name, .. } => name,
        }
    }

    /// Number of input cells this column occupies.
    pub fn width(&self) -> usize {
        match self {
            ColumnSpec::Numeric { .. } => 1,
            ColumnSpec::Categorical { categories, .. } => categories.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    #[default]
    Probabilities,
    Logits,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PipelineMeta {
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub output: OutputKind,
    #[serde(default = "default_cancel_index")]
    pub cancel_index: usize,
}

fn default_cancel_index() -> usize {
    1
}

impl PipelineMeta {
    pub fn load(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)
            .with_context(|| format!("failed to read meta at {}", path.display()))?;
        Self::from_json(&txt)
    }

    pub fn from_json(txt: &str) -> Result<Self> {
        let meta: PipelineMeta =
            serde_json::from_str(txt).with_context(|| "failed to parse model meta json")?;
        if meta.columns.is_empty() {
            bail!("model meta declares no columns");
        }
        Ok(meta)
    }

    pub fn in_dim(&self) -> usize {
        self.columns.iter().map(ColumnSpec::width).sum()
    }

    /// Lay the record out as a single input row.
    pub fn encode(&self, record: &RideRecord) -> Result<Vec<f32>> {
        let mut row = Vec::with_capacity(self.in_dim());
        for col in &self.columns {
            let value = record
                .column(col.name())
                .with_context(|| format!("record has no column '{}'", col.name()))?;
            match (col, value) {
                (ColumnSpec::Numeric { mean, std, .. }, ColumnValue::Number(x)) => {
                    let centered = x - mean.unwrap_or(0.0);
                    let scaled = match std {
                        Some(s) if *s > 0.0 => centered / s,
                        _ => centered,
                    };
                    row.push(scaled as f32);
                }
                (ColumnSpec::Categorical { name, categories }, ColumnValue::Category(label)) => {
                    let Some(hot) = categories.iter().position(|c| c == label) else {
                        bail!("category '{}' not seen in training for '{}'", label, name);
                    };
                    row.extend((0..categories.len()).map(|i| if i == hot { 1.0 } else { 0.0 }));
                }
                (col, _) => bail!("column '{}' type does not match the record", col.name()),
            }
        }
        Ok(row)
    }

    /// Cancel-class probability from one row of model output.
    pub fn cancel_probability(&self, out: &[f32]) -> Result<f64> {
        if out.len() < 2 || self.cancel_index >= out.len() {
            bail!(
                "model produced {} class scores, cancel index is {}",
                out.len(),
                self.cancel_index
            );
        }
        let p = match self.output {
            OutputKind::Probabilities => out[self.cancel_index] as f64,
            OutputKind::Logits => {
                let max = out.iter().cloned().fold(f32::NEG_INFINITY, f32::max) as f64;
                let denom: f64 = out.iter().map(|&z| (z as f64 - max).exp()).sum();
                (out[self.cancel_index] as f64 - max).exp() / denom
            }
        };
        Ok(p)
    }
}
