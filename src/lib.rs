#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod model;
pub mod report;

use std::fmt;

use geom::{
    GeneratedSurface, ImageSource, PatchMesh, PatchMeshDiagnostics, RasterImage, SamplingOptions,
    SurfaceKind, Tolerance, generate, normals_to_rgb,
};
use model::{LossWeights, ModelConfig, ModelError, ModelKind, TargetSurface, forward_step};
use report::{ReportBuilder, ResultRecord};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // A second `initialize` keeps the logger that is already installed.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not initialize rayon thread pool: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Settings read by [`PatchEngine`]. Every field has a default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub surface: SurfaceKind,
    pub sampling: SamplingOptions,
    pub model: ModelConfig,
    /// Seed of the random corner features.
    pub feature_seed: u64,
    pub loss: LossWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceKind::flat(),
            sampling: SamplingOptions::default(),
            model: ModelConfig::default(),
            feature_seed: 0,
            loss: LossWeights::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MeshExport<'a> {
    positions: &'a [f64],
    indices: &'a [u32],
    #[serde(skip_serializing_if = "Option::is_none")]
    normals: Option<&'a [f64]>,
}

#[derive(Debug, Serialize)]
struct NormalsExport {
    normals: Vec<[f64; 3]>,
    rgb: Vec<[f64; 3]>,
}

#[derive(Debug, Serialize)]
struct CatalogueExport {
    surfaces: &'static [&'static str],
    models: Vec<&'static str>,
}

/// Generates target patches and scores encoding models against them.
#[wasm_bindgen]
pub struct PatchEngine {
    config: EngineConfig,
    image: Option<RasterImage>,
    surface: Option<GeneratedSurface>,
    mesh: Option<PatchMesh>,
    target: Option<TargetSurface>,
    records: ReportBuilder,
}

impl Default for PatchEngine {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

#[wasm_bindgen]
impl PatchEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> PatchEngine {
        PatchEngine::default()
    }

    /// Replaces the configuration with a JSON-like object; missing fields take defaults.
    #[wasm_bindgen]
    pub fn configure(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: EngineConfig = serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
        self.set_config(config);
        Ok(())
    }

    /// Supplies the raster for a textured surface.
    #[wasm_bindgen]
    pub fn set_image(&mut self, width: usize, height: usize, rgba: Vec<u8>) -> Result<(), JsValue> {
        let image = RasterImage::from_rgba8(width, height, rgba).map_err(to_js_error)?;
        self.set_raster(image);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn generate(&mut self) -> Result<(), JsValue> {
        self.generate_surface().map(|_| ()).map_err(to_js_error)
    }

    /// Flat positions, triangle indices and raw vertex normals of the target mesh.
    #[wasm_bindgen]
    pub fn get_mesh(&self) -> Result<JsValue, JsValue> {
        let mesh = self
            .mesh
            .as_ref()
            .ok_or_else(|| js_error("no surface has been generated"))?;
        let export = MeshExport {
            positions: mesh.positions_flat(),
            indices: mesh.indices_flat(),
            normals: mesh.normals_flat(),
        };
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Raw target vertex normals and their RGB visualisation.
    #[wasm_bindgen]
    pub fn get_normals(&self) -> Result<JsValue, JsValue> {
        let normals = self
            .normals()
            .ok_or_else(|| js_error("no surface has been generated"))?;
        let export = NormalsExport { rgb: normals_to_rgb(normals, true), normals: normals.to_vec() };
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }

    #[wasm_bindgen]
    pub fn get_diagnostics(&self) -> Result<JsValue, JsValue> {
        let diagnostics = self.diagnostics().map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&diagnostics)
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Scores one catalogue model against the current target and keeps the record.
    #[wasm_bindgen]
    pub fn evaluate(&mut self, model_name: &str) -> Result<JsValue, JsValue> {
        let kind = ModelKind::from_name(model_name)
            .ok_or_else(|| js_error(&format!("unknown model `{model_name}`")))?;
        let record = self.evaluate_model(kind).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&record).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Text report of every evaluation since the last `generate`.
    #[wasm_bindgen]
    pub fn report_text(&self) -> String {
        self.report().render_text()
    }

    #[wasm_bindgen]
    pub fn catalogue(&self) -> Result<JsValue, JsValue> {
        let export = CatalogueExport {
            surfaces: SurfaceKind::NAMES,
            models: ModelKind::ALL.iter().map(|k| k.name()).collect(),
        };
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl PatchEngine {
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            image: None,
            surface: None,
            mesh: None,
            target: None,
            records: ReportBuilder::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stores `config` and drops everything derived from the old one.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
        self.invalidate();
    }

    pub fn set_raster(&mut self, image: RasterImage) {
        self.image = Some(image);
        if self.config.surface.needs_image() {
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        self.surface = None;
        self.mesh = None;
        self.target = None;
        self.records = ReportBuilder::new();
    }

    /// Generates the configured surface, its mesh and its reference normals.
    pub fn generate_surface(&mut self) -> Result<&GeneratedSurface, ModelError> {
        self.invalidate();
        let image = self.image.as_ref().map(|img| img as &dyn ImageSource);
        let surface = generate(self.config.surface, self.config.sampling.sample_rate, image)?;
        let mesh = surface.mesh()?;
        let target = TargetSurface::new(&surface)?;
        debug_log!(
            "generated {} surface with {} triangles",
            self.config.surface.name(),
            mesh.triangle_count()
        );
        self.mesh = Some(mesh);
        self.target = Some(target);
        Ok(&*self.surface.insert(surface))
    }

    #[must_use]
    pub fn surface(&self) -> Option<&GeneratedSurface> {
        self.surface.as_ref()
    }

    #[must_use]
    pub fn mesh(&self) -> Option<&PatchMesh> {
        self.mesh.as_ref()
    }

    /// Raw vertex normals of the target.
    #[must_use]
    pub fn normals(&self) -> Option<&[[f64; 3]]> {
        self.target.as_ref().map(|t| t.vertex_normals.as_slice())
    }

    pub fn diagnostics(&self) -> Result<PatchMeshDiagnostics, ModelError> {
        let mesh = self
            .mesh
            .as_ref()
            .ok_or_else(|| ModelError::InvalidConfig("no surface has been generated".into()))?;
        let diag = mesh.diagnostics(Tolerance::default())?;
        if diag.has_warnings() {
            log::warn!("{} surface: {}", self.config.surface.name(), diag.summary());
        }
        Ok(diag)
    }

    /// Runs one forward step of `kind` at its initial weights and records the result.
    pub fn evaluate_model(&mut self, kind: ModelKind) -> Result<ResultRecord, ModelError> {
        let (Some(surface), Some(target)) = (self.surface.as_ref(), self.target.as_ref()) else {
            return Err(ModelError::InvalidConfig("no surface has been generated".into()));
        };
        let model = kind.build(&self.config.model)?;
        let corners = surface
            .corner_set()
            .with_random_features(self.config.model.feature_dim, self.config.feature_seed)?;
        let grid = self.config.sampling.grid()?;
        let step = forward_step(&model, target, &corners, &grid, &self.config.loss)?;
        let record = ResultRecord::evaluate(
            self.config.surface.name(),
            kind.name(),
            target,
            &step.predicted,
            &step.vertex_normals,
        )?
        .with_loss(step.loss);
        self.records.add_record(record.clone());
        Ok(record)
    }

    #[must_use]
    pub fn report(&self) -> report::Report {
        self.records.snapshot()
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "surface": { "type": "curved", "scale": 0.5 } }"#).unwrap();
        assert_eq!(config.surface, SurfaceKind::Curved { scale: 0.5 });
        assert_eq!(config.sampling.sample_rate, 16);
        assert_eq!(config.model.feature_dim, 20);
        assert_eq!(config.loss.normal_weight, 0.1);
    }

    #[test]
    fn engine_generates_and_evaluates() {
        let mut config = EngineConfig::default();
        config.sampling = SamplingOptions::new(4);
        let mut engine = PatchEngine::with_config(config);
        assert!(engine.evaluate_model(ModelKind::Simple).is_err());

        engine.generate_surface().unwrap();
        assert_eq!(engine.mesh().unwrap().triangle_count(), 18);
        assert_eq!(engine.normals().unwrap().len(), 16);

        let record = engine.evaluate_model(ModelKind::Uv).unwrap();
        assert_eq!(record.experiment, "flat");
        assert_eq!(record.model, "uv");
        assert!(record.loss.is_some());
        assert_eq!(engine.report().records().len(), 1);
    }

    #[test]
    fn textured_surface_needs_an_image() {
        let mut config = EngineConfig::default();
        config.surface = SurfaceKind::textured();
        config.sampling = SamplingOptions::new(3);
        let mut engine = PatchEngine::with_config(config);
        assert!(engine.generate_surface().is_err());

        let image = RasterImage::from_fn(2, 2, |x, _| [if x == 0 { 0 } else { 255 }, 0, 0, 255]);
        engine.set_raster(image.unwrap());
        let surface = engine.generate_surface().unwrap();
        assert_eq!(surface.points.len(), 9);
    }
}
