//! Per-experiment error tables.
//!
//! Records are kept in insertion order; the PSNR matrix lists experiments and models in the
//! order they first appear.

pub mod snapshot;

pub use snapshot::{SNAPSHOT_QUANTIZE, normalize_snapshot_text, surface_snapshot};

use serde::Serialize;

use crate::geom::{ErrorStats, NormalComparison, compare_normals};
use crate::model::{ModelError, StepOutput, SurfaceLoss, TargetSurface};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub experiment: String,
    pub model: String,
    pub error: ErrorStats,
    pub normals: NormalComparison,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss: Option<SurfaceLoss>,
}

impl ResultRecord {
    /// Scores `predicted` and its vertex normals against `target`.
    pub fn evaluate(
        experiment: impl Into<String>,
        model: impl Into<String>,
        target: &TargetSurface,
        predicted: &[[f64; 3]],
        predicted_normals: &[[f64; 3]],
    ) -> Result<Self, ModelError> {
        Ok(Self {
            experiment: experiment.into(),
            model: model.into(),
            error: ErrorStats::between(predicted, &target.points)?,
            normals: compare_normals(predicted_normals, &target.vertex_normals)?,
            loss: None,
        })
    }

    #[must_use]
    pub fn with_loss(mut self, loss: SurfaceLoss) -> Self {
        self.loss = Some(loss);
        self
    }

    #[must_use]
    pub fn error_line(&self) -> String {
        format!(
            "{:<15} {:<15} |    u = {:.5}    |    sigma = {:.3}    |    max = {:.3}",
            self.experiment, self.model, self.error.mean, self.error.std, self.error.max
        )
    }

    #[must_use]
    pub fn normal_line(&self) -> String {
        format!(
            "{:<15} {:<15} |   PSNR = {:.3}   |    L2 = {:.3}",
            self.experiment, self.model, self.normals.psnr, self.normals.l2
        )
    }
}

#[derive(Debug, Default)]
pub struct ReportBuilder {
    records: Vec<ResultRecord>,
}

impl ReportBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: ResultRecord) -> &mut Self {
        log::debug!("{}", record.error_line());
        self.records.push(record);
        self
    }

    /// Records the outcome of a forward step, loss included.
    pub fn record_step(
        &mut self,
        experiment: &str,
        model: &str,
        target: &TargetSurface,
        step: &StepOutput,
    ) -> Result<&mut Self, ModelError> {
        let record =
            ResultRecord::evaluate(experiment, model, target, &step.predicted, &step.vertex_normals)?
                .with_loss(step.loss);
        Ok(self.add_record(record))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Report of the records so far; the builder keeps collecting.
    #[must_use]
    pub fn snapshot(&self) -> Report {
        Report { records: self.records.clone() }
    }

    #[must_use]
    pub fn build(self) -> Report {
        Report { records: self.records }
    }
}

/// PSNR per (experiment, model); `None` where a pair was never recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PsnrMatrix {
    pub experiments: Vec<String>,
    pub models: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    records: Vec<ResultRecord>,
}

fn push_unique(list: &mut Vec<String>, name: &str) -> usize {
    if let Some(pos) = list.iter().position(|n| n == name) {
        pos
    } else {
        list.push(name.to_owned());
        list.len() - 1
    }
}

impl Report {
    #[must_use]
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    #[must_use]
    pub fn psnr_matrix(&self) -> PsnrMatrix {
        let mut experiments = Vec::new();
        let mut models = Vec::new();
        let mut cells = Vec::with_capacity(self.records.len());
        for r in &self.records {
            let e = push_unique(&mut experiments, &r.experiment);
            let m = push_unique(&mut models, &r.model);
            cells.push((e, m, r.normals.psnr));
        }
        let mut values = vec![vec![None; models.len()]; experiments.len()];
        for (e, m, psnr) in cells {
            values[e][m] = Some(psnr);
        }
        PsnrMatrix { experiments, models, values }
    }

    /// Error and normal lines for every record, then the PSNR matrix.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for r in &self.records {
            out.push_str(&r.error_line());
            out.push('\n');
            out.push_str(&r.normal_line());
            out.push('\n');
        }

        let matrix = self.psnr_matrix();
        if matrix.experiments.is_empty() {
            return out;
        }
        out.push('\n');
        out.push_str(&format!("{:<15}", "PSNR"));
        for m in &matrix.models {
            out.push_str(&format!(" {m:>15}"));
        }
        out.push('\n');
        for (exp, row) in matrix.experiments.iter().zip(&matrix.values) {
            out.push_str(&format!("{exp:<15}"));
            for cell in row {
                match cell {
                    Some(v) => out.push_str(&format!(" {v:>15.3}")),
                    None => out.push_str(&format!(" {:>15}", "-")),
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
