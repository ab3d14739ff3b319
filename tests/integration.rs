use patchfit_engine::geom::{SamplingOptions, SurfaceKind, UvGrid, flat, linear, mean_distance};
use patchfit_engine::model::{
    EncodedMlp, LossWeights, ModelConfig, ModelError, ModelKind, Optimizer, ParamTensor, Parameterized,
    SurfaceLoss, SurfaceModel, TargetSurface, forward_step,
};
use patchfit_engine::report::ReportBuilder;
use patchfit_engine::{EngineConfig, PatchEngine};

fn zero_output_layer(model: &mut EncodedMlp) {
    let last = model.layers_mut().last_mut().expect("output layer");
    last.weights_mut().fill(0.0);
    last.biases_mut().fill(0.0);
}

#[test_log::test]
fn flat_patch_end_to_end() {
    let surface = flat(4).expect("flat");
    let target = TargetSurface::new(&surface).expect("target");
    assert_eq!(target.triangles.len(), 18);

    let corners = surface.corner_set().with_random_features(20, 0).expect("features");
    let grid = UvGrid::new(4).expect("grid");
    let mut model = ModelKind::Positional.build(&ModelConfig::default()).expect("model");
    zero_output_layer(&mut model);

    let step = forward_step(&model, &target, &corners, &grid, &LossWeights::default())
        .expect("forward step");

    // With a silent network the prediction is the lerped grid itself.
    assert_eq!(step.predicted, step.sampled.points);
    let expected = mean_distance(&step.sampled.points, &target.points).expect("distance");
    assert!((step.loss.vertex - expected).abs() < 1e-12);
    assert!(step.loss.vertex > 0.0);
    assert!((step.loss.total - (step.loss.vertex + step.loss.normal)).abs() < 1e-12);
}

#[test]
fn catalogue_input_widths() {
    let widths = [
        (ModelKind::Simple, 23),
        (ModelKind::Positional, 83),
        (ModelKind::PositionalWide, 71),
        (ModelKind::FeatureSinusoidal, 423),
        (ModelKind::FeatureMorlet, 423),
        (ModelKind::FeaturePosition, 759),
        (ModelKind::Uv, 22),
        (ModelKind::UvSinusoidal, 54),
        (ModelKind::FeatureUv, 374),
        (ModelKind::PositionUv, 105),
        (ModelKind::UvMorlet, 57),
    ];
    let config = ModelConfig::default();
    for (kind, width) in widths {
        assert_eq!(kind.input_dim(20), width, "{kind}");
        assert_eq!(kind.build(&config).expect("build").input_dim(), width, "{kind}");
    }
}

#[test]
fn models_reject_wrong_feature_width() {
    let surface = flat(3).expect("flat");
    let target = TargetSurface::new(&surface).expect("target");
    let corners = surface.corner_set().with_random_features(7, 0).expect("features");
    let grid = UvGrid::new(3).expect("grid");
    let model = ModelKind::Simple.build(&ModelConfig::default()).expect("model");
    let err = forward_step(&model, &target, &corners, &grid, &LossWeights::default());
    assert!(matches!(err, Err(ModelError::InvalidShape(_))));
}

struct Nudge {
    seen: Vec<String>,
}

impl Optimizer for Nudge {
    fn step(&mut self, loss: &SurfaceLoss, params: Vec<ParamTensor<'_>>) -> Result<(), ModelError> {
        for p in params {
            for v in p.values.iter_mut() {
                *v -= 1e-3 * loss.total;
            }
            self.seen.push(p.name);
        }
        Ok(())
    }
}

#[test]
fn optimizer_sees_every_parameter_group() {
    let mut model = ModelKind::Simple.build(&ModelConfig::default()).expect("model");
    assert_eq!(model.parameter_count(), 23 * 64 + 64 + 2 * (64 * 64 + 64) + 64 * 3 + 3);

    let surface = linear(3, 0.25).expect("linear");
    let target = TargetSurface::new(&surface).expect("target");
    let mut corners = surface.corner_set().with_random_features(20, 3).expect("features");
    let grid = UvGrid::new(3).expect("grid");
    let step = forward_step(&model, &target, &corners, &grid, &LossWeights::face())
        .expect("forward step");

    let mut opt = Nudge { seen: Vec::new() };
    opt.step(&step.loss, model.parameters_mut()).expect("model step");
    opt.step(&step.loss, corners.parameters_mut()).expect("corner step");
    assert_eq!(opt.seen.len(), 8 + 2);
    assert_eq!(opt.seen[0], "layers.0.weight");
    assert_eq!(opt.seen[7], "layers.3.bias");
    assert_eq!(opt.seen[9], "corners.features");

    let morlet = &mut ModelKind::Morlet.build(&ModelConfig::default()).expect("morlet");
    let names: Vec<String> = morlet.parameters_mut().into_iter().map(|p| p.name).collect();
    assert_eq!(&names[names.len() - 4..], ["s0", "w0", "s1", "w1"]);
}

#[test_log::test]
fn report_collects_experiments_in_order() {
    let mut builder = ReportBuilder::new();
    for surface in [SurfaceKind::linear(), SurfaceKind::flat()] {
        let config = EngineConfig { surface, sampling: SamplingOptions::new(4), ..EngineConfig::default() };
        let mut engine = PatchEngine::with_config(config);
        engine.generate_surface().expect("generate");
        for kind in [ModelKind::Uv, ModelKind::Simple] {
            builder.add_record(engine.evaluate_model(kind).expect("evaluate"));
        }
    }

    let report = builder.build();
    let matrix = report.psnr_matrix();
    assert_eq!(matrix.experiments, ["linear", "flat"]);
    assert_eq!(matrix.models, ["uv", "simple"]);
    assert!(matrix.values.iter().flatten().all(Option::is_some));

    let text = report.render_text();
    assert_eq!(text.lines().count(), 8 + 1 + 1 + 2);
    assert!(text.lines().next().expect("first line").starts_with("linear          uv "));

    let json = report.to_json().expect("json");
    assert!(json.contains("\"model\": \"simple\""));
}

#[test]
fn seeds_make_models_reproducible() {
    let config = ModelConfig::default().seed(9);
    let a = ModelKind::Siren.build(&config).expect("a");
    let b = ModelKind::Siren.build(&config).expect("b");
    let c = ModelKind::Siren.build(&config.seed(10)).expect("c");
    assert_eq!(a.layers()[0].weights(), b.layers()[0].weights());
    assert_ne!(a.layers()[0].weights(), c.layers()[0].weights());
    assert_eq!(a.name(), "siren");
}
