mod app;
mod cli;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use appconfig::AppOptions;
use shaderfile::{convert_shadertoy, ShaderDocument, DEFAULT_FRAGMENT};
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

use app::App;

fn main() -> Result<()> {
    let cli = cli::parse();
    initialise_tracing();

    let options_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("fraglab.toml"));
    let mut options = AppOptions::load(&options_path)
        .with_context(|| format!("failed to load options from {}", options_path.display()))?;
    if cli.no_vsync {
        options.vsync = false;
    }

    let document = match &cli.shader {
        Some(path) => ShaderDocument::load(path)
            .with_context(|| format!("failed to load shader {}", path.display()))?,
        None => ShaderDocument::new(DEFAULT_FRAGMENT),
    };
    let fragment_code = if cli.shadertoy {
        convert_shadertoy(&document.fragment_code)
    } else {
        document.fragment_code.clone()
    };

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(
        cli,
        options,
        options_path,
        document.metadata,
        fragment_code,
    );
    event_loop
        .run_app(&mut app)
        .context("event loop error")?;

    app.into_result()
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
