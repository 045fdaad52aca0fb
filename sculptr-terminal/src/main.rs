//! Sculptr Terminal Viewer
//!
//! Usage:
//!   sculptr-terminal                              view the default cube
//!   sculptr-terminal view <file.obj>              view an OBJ file
//!   sculptr-terminal generate <shape> [out-dir]   generate a primitive, then view it
//!
//! Controls:
//!   - WASD / E / Q: Move (Shift for speed)
//!   - Arrow Keys / Right-drag: Look
//!   - Scroll: Dolly or zoom
//!   - R: Reset view, M: Camera mode, N: Flat/smooth shading, G: Grid
//!   - ESC: Quit

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use sculptr_core::{generate, GenerateRequest, GeneratorEngine, Primitive, ShapeKind, Viewer};
use sculptr_terminal::{Settings, TerminalApp};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let settings = Settings::load();
    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut viewer = Viewer::new(settings.viewer.clone(), width as u32, height as u32);

    match args.get(1).map(String::as_str) {
        None => {
            viewer.load_mesh(generate(&Primitive::default_for(ShapeKind::Box))?);
        }
        Some("view") => {
            let Some(path) = args.get(2) else {
                bail!("Usage: {} view <file.obj>", args[0]);
            };
            println!("Loading OBJ file: {}", path);
            viewer
                .load_file(path)
                .with_context(|| format!("Failed to load {}", path))?;
        }
        Some("generate") => {
            let Some(shape) = args.get(2) else {
                bail!(
                    "Usage: {} generate <shape> [out-dir]\nShapes: {}",
                    args[0],
                    shape_names()
                );
            };
            let kind: ShapeKind = shape
                .parse()
                .with_context(|| format!("Available shapes: {}", shape_names()))?;
            let out_dir = args
                .get(3)
                .map(PathBuf::from)
                .unwrap_or_else(|| settings.output_dir());

            let engine = GeneratorEngine::with_options(out_dir.clone(), settings.export.clone())
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            let result = engine.generate(&GenerateRequest::from(kind))?;
            println!("Wrote {}", result.mesh_path.display());
            viewer.load_mesh(result.mesh);
        }
        Some(other) => {
            bail!(
                "Unknown command '{}'\nUsage: {} [view <file.obj> | generate <shape> [out-dir]]",
                other,
                args[0]
            );
        }
    }

    let mesh = viewer.mesh();
    println!(
        "Loaded {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.face_count()
    );
    println!("Starting terminal viewer (press ESC to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    // Run the terminal app
    let mut app = TerminalApp::new(viewer)?;
    app.run()?;

    println!("Thank you for using Sculptr!");
    Ok(())
}

fn shape_names() -> String {
    ShapeKind::ALL
        .iter()
        .map(|kind| kind.name())
        .collect::<Vec<_>>()
        .join(", ")
}
