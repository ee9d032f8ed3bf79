use std::path::PathBuf;

use clap::Parser;
use renderer::BackendChoice;

#[derive(Parser, Debug)]
#[command(
    name = "fraglab",
    author,
    version,
    about = "Live fragment shader coding tool",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Shader file to open at startup (metadata preamble + fragment source).
    #[arg(value_name = "SHADER")]
    pub shader: Option<PathBuf>,

    /// Treat the startup shader as Shadertoy-dialect and convert it on load.
    #[arg(long)]
    pub shadertoy: bool,

    /// Graphics backend to use (`auto`, `vulkan`, `gl`, `metal`, `dx12`).
    #[arg(long, value_name = "BACKEND", default_value = "auto")]
    pub backend: BackendChoice,

    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Disable vsync regardless of the saved options.
    #[arg(long)]
    pub no_vsync: bool,

    /// Options file location (defaults to `fraglab.toml` next to the
    /// working directory).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{value}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{value}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{value}' must be non-zero"));
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_parses_both_separators() {
        assert_eq!(parse_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_size("1920X1080"), Ok((1920, 1080)));
    }

    #[test]
    fn size_rejects_garbage() {
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
        assert!(parse_size("widexhigh").is_err());
    }

    #[test]
    fn backend_flag_parses() {
        let cli = Cli::parse_from(["fraglab", "--backend", "gl"]);
        assert_eq!(cli.backend, BackendChoice::Gl);
    }
}
