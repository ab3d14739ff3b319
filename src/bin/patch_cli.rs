#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(all(not(target_arch = "wasm32"), not(feature = "mesh_engine_next")))]
fn main() {
    eprintln!(
        "patch_cli is a native-only tool and requires `--features mesh_engine_next`.\n\
         Example: cargo run --bin patch_cli --features mesh_engine_next -- list"
    );
    std::process::exit(1);
}

#[cfg(all(not(target_arch = "wasm32"), feature = "mesh_engine_next"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("patch_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(all(not(target_arch = "wasm32"), feature = "mesh_engine_next"))]
mod native {
    use patchfit_engine::geom::{PatchMesh, RasterImage, SamplingOptions, SurfaceKind};
    use patchfit_engine::model::ModelKind;
    use patchfit_engine::report::{ReportBuilder, normalize_snapshot_text, surface_snapshot};
    use patchfit_engine::{EngineConfig, PatchEngine};
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    const DEFAULT_RATE: usize = 16;
    const TEXTURE_SIZE: usize = 64;

    const USAGE: &str = r#"patch_cli (patchfit-engine)

USAGE:
  patch_cli list
  patch_cli run <surface|all> [options]
  patch_cli eval <surface|all> [options]

SURFACES:
  flat
  linear
  curved
  perlin
  textured   (procedural gradient raster)

OPTIONS (run):
  --rate <R>         Samples per patch side (default 16)
  --out-dir <dir>    Write <surface>.obj and/or <surface>.snap to this dir (required for `all`)
  --obj <path>       Write OBJ (single surface only)
  --snap <path>      Write golden-style snapshot (single surface only)
  --no-obj           Skip OBJ when using --out-dir
  --no-snap          Skip snapshot when using --out-dir
  --overwrite        Overwrite existing output files

OPTIONS (eval):
  --rate <R>         Samples per patch side (default 16)
  --models <a,b,..>  Models to score at their initial weights (default: all)
  --json             Print the report as JSON instead of text

  -h, --help         Show this help
"#;

    pub fn run() -> Result<(), String> {
        env_logger::init();

        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_catalogue();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "eval" => cmd_eval(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_catalogue() {
        println!("surfaces:");
        for name in SurfaceKind::NAMES {
            println!("  {name}");
        }
        println!("models:");
        for kind in ModelKind::ALL {
            println!("  {:<20} input {}", kind.name(), kind.input_dim(20));
        }
    }

    fn surfaces_for(name: &str) -> Result<Vec<SurfaceKind>, String> {
        if name == "all" {
            return Ok(SurfaceKind::NAMES
                .iter()
                .filter_map(|n| SurfaceKind::from_name(n))
                .collect());
        }
        SurfaceKind::from_name(name)
            .map(|kind| vec![kind])
            .ok_or_else(|| unknown_surface(name))
    }

    fn parse_rate(value: &str) -> Result<usize, String> {
        value
            .parse::<usize>()
            .map_err(|e| format!("invalid --rate `{value}`: {e}"))
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let surface_name = args.next().ok_or("missing surface name")?;

        let mut rate = DEFAULT_RATE;
        let mut out_dir: Option<PathBuf> = None;
        let mut obj_path: Option<PathBuf> = None;
        let mut snap_path: Option<PathBuf> = None;
        let mut overwrite = false;
        let mut write_obj = true;
        let mut write_snap = true;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--rate" => rate = parse_rate(&args.value("--rate")?)?,
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--snap" => snap_path = Some(PathBuf::from(args.value("--snap")?)),
                "--overwrite" => overwrite = true,
                "--no-obj" => write_obj = false,
                "--no-snap" => write_snap = false,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let surfaces = surfaces_for(&surface_name)?;

        if let Some(dir) = out_dir.as_ref() {
            if obj_path.is_some() || snap_path.is_some() {
                return Err("use either --out-dir or --obj/--snap (not both)".to_string());
            }
            if !write_obj && !write_snap {
                return Err("nothing to write (both --no-obj and --no-snap set)".to_string());
            }

            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;
            for kind in surfaces {
                run_one_surface_to_dir(kind, rate, dir, write_obj, write_snap, overwrite)?;
            }
            return Ok(());
        }

        let [kind] = surfaces.as_slice() else {
            return Err("`run all` requires --out-dir".to_string());
        };
        let output = run_surface(*kind, rate)?;

        if let Some(path) = snap_path.as_deref() {
            write_text_file(path, &output.snapshot, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            print!("{}", output.snapshot);
        }

        if let Some(path) = obj_path.as_deref() {
            write_obj_file(path, &output.mesh, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        eprintln!("{}", output.summary);
        Ok(())
    }

    fn run_one_surface_to_dir(
        kind: SurfaceKind,
        rate: usize,
        dir: &Path,
        write_obj: bool,
        write_snap: bool,
        overwrite: bool,
    ) -> Result<(), String> {
        let output = run_surface(kind, rate)?;

        if write_snap {
            let path = dir.join(format!("{}.snap", output.name));
            write_text_file(&path, &output.snapshot, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        if write_obj {
            let path = dir.join(format!("{}.obj", output.name));
            write_obj_file(&path, &output.mesh, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        eprintln!("{}", output.summary);
        Ok(())
    }

    fn cmd_eval(args: &mut Args) -> Result<(), String> {
        let surface_name = args.next().ok_or("missing surface name")?;

        let mut rate = DEFAULT_RATE;
        let mut models: Vec<ModelKind> = ModelKind::ALL.to_vec();
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--rate" => rate = parse_rate(&args.value("--rate")?)?,
                "--models" => models = parse_models(&args.value("--models")?)?,
                "--json" => json = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let mut report = ReportBuilder::new();
        for kind in surfaces_for(&surface_name)? {
            let mut engine = engine_for(kind, rate)?;
            engine.generate_surface().map_err(|e| e.to_string())?;
            for model in &models {
                let record = engine.evaluate_model(*model).map_err(|e| e.to_string())?;
                report.add_record(record);
            }
        }

        let report = report.build();
        if json {
            println!("{}", report.to_json().map_err(|e| format!("encode report: {e}"))?);
        } else {
            print!("{}", report.render_text());
        }
        Ok(())
    }

    fn parse_models(list: &str) -> Result<Vec<ModelKind>, String> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                ModelKind::from_name(name).ok_or_else(|| {
                    let known: Vec<&str> = ModelKind::ALL.iter().map(|k| k.name()).collect();
                    format!("unknown model `{name}` (known: {})", known.join(", "))
                })
            })
            .collect()
    }

    fn unknown_surface(name: &str) -> String {
        let mut msg = String::new();
        msg.push_str(&format!("unknown surface `{name}`\n\navailable surfaces:\n"));
        for surface in SurfaceKind::NAMES {
            msg.push_str(&format!("  {surface}\n"));
        }
        msg
    }

    fn procedural_texture() -> Result<RasterImage, String> {
        let span = (2 * (TEXTURE_SIZE - 1)) as f64;
        RasterImage::from_fn(TEXTURE_SIZE, TEXTURE_SIZE, |x, y| {
            let red = ((x + y) as f64 / span * 255.0).round() as u8;
            [red, red, red, 255]
        })
        .map_err(|e| format!("build texture: {e}"))
    }

    fn engine_for(kind: SurfaceKind, rate: usize) -> Result<PatchEngine, String> {
        let config = EngineConfig {
            surface: kind,
            sampling: SamplingOptions::new(rate),
            ..EngineConfig::default()
        };
        if kind.samples_on_lattice(rate) {
            eprintln!(
                "warning: {} at rate {rate} samples only noise lattice points and will be flat; pick a rate that does not divide the octave count",
                kind.name()
            );
        }
        let mut engine = PatchEngine::with_config(config);
        if kind.needs_image() {
            engine.set_raster(procedural_texture()?);
        }
        Ok(engine)
    }

    struct SurfaceOutput {
        name: &'static str,
        mesh: PatchMesh,
        summary: String,
        snapshot: String,
    }

    fn run_surface(kind: SurfaceKind, rate: usize) -> Result<SurfaceOutput, String> {
        let mut engine = engine_for(kind, rate)?;
        engine.generate_surface().map_err(|e| e.to_string())?;
        let diag = engine.diagnostics().map_err(|e| e.to_string())?;
        let (Some(surface), Some(mesh)) = (engine.surface(), engine.mesh()) else {
            return Err("engine produced no surface".to_string());
        };

        let summary = format!(
            "{}: vertices={} triangles={} | {}",
            kind.name(),
            mesh.vertex_count(),
            mesh.triangle_count(),
            diag.summary()
        );

        Ok(SurfaceOutput {
            name: kind.name(),
            snapshot: surface_snapshot(kind.name(), surface, mesh, &diag),
            mesh: mesh.clone(),
            summary,
        })
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, normalize_snapshot_text(text)).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn write_obj_file(path: &Path, mesh: &PatchMesh, name: &str, overwrite: bool) -> Result<(), String> {
        mesh.validate().map_err(|e| format!("mesh validation failed: {e}"))?;

        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);

        writeln!(w, "# patchfit-engine patch_cli").map_err(|e| format!("write obj: {e}"))?;
        writeln!(w, "o {name}").map_err(|e| format!("write obj: {e}"))?;

        for p in mesh.positions.iter().copied() {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2]).map_err(|e| format!("write obj: {e}"))?;
        }

        if let Some(uvs) = mesh.uvs.as_ref() {
            for uv in uvs.iter().copied() {
                writeln!(w, "vt {} {}", uv[0], uv[1]).map_err(|e| format!("write obj: {e}"))?;
            }
        }

        // OBJ wants unit normals; the mesh stores raw sums.
        let normals = mesh
            .normals
            .as_deref()
            .map(patchfit_engine::geom::normalize_normals);
        if let Some(normals) = normals.as_ref() {
            for n in normals.iter().copied() {
                writeln!(w, "vn {} {} {}", n[0], n[1], n[2]).map_err(|e| format!("write obj: {e}"))?;
            }
        }

        let has_uvs = mesh.uvs.is_some();
        let has_normals = normals.is_some();

        for [a, b, c] in mesh.triangles.iter().map(|t| t.map(|i| i + 1)) {
            match (has_uvs, has_normals) {
                (true, true) => writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}"),
                (true, false) => writeln!(w, "f {a}/{a} {b}/{b} {c}/{c}"),
                (false, true) => writeln!(w, "f {a}//{a} {b}//{b} {c}//{c}"),
                (false, false) => writeln!(w, "f {a} {b} {c}"),
            }
            .map_err(|e| format!("write obj: {e}"))?;
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
