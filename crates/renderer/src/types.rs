/// Graphics backend requested at startup. Immutable for the process
/// lifetime; the adapter actually granted decides the fragment-coordinate
/// convention (see `GpuState::flip_frag_coord`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendChoice {
    /// Let wgpu pick the best backend for the platform.
    #[default]
    Auto,
    Vulkan,
    Gl,
    Metal,
    Dx12,
}

impl BackendChoice {
    pub fn backends(self) -> wgpu::Backends {
        match self {
            BackendChoice::Auto => wgpu::Backends::all(),
            BackendChoice::Vulkan => wgpu::Backends::VULKAN,
            BackendChoice::Gl => wgpu::Backends::GL,
            BackendChoice::Metal => wgpu::Backends::METAL,
            BackendChoice::Dx12 => wgpu::Backends::DX12,
        }
    }
}

impl std::fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendChoice::Auto => f.write_str("auto"),
            BackendChoice::Vulkan => f.write_str("vulkan"),
            BackendChoice::Gl => f.write_str("gl"),
            BackendChoice::Metal => f.write_str("metal"),
            BackendChoice::Dx12 => f.write_str("dx12"),
        }
    }
}

impl std::str::FromStr for BackendChoice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendChoice::Auto),
            "vulkan" | "vk" => Ok(BackendChoice::Vulkan),
            "gl" | "opengl" => Ok(BackendChoice::Gl),
            "metal" => Ok(BackendChoice::Metal),
            "dx12" | "d3d12" => Ok(BackendChoice::Dx12),
            other => Err(format!(
                "unknown backend '{other}'; expected auto, vulkan, gl, metal or dx12"
            )),
        }
    }
}

/// Immutable configuration handed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub backend: BackendChoice,
    pub vsync: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: BackendChoice::Auto,
            vsync: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_choice_round_trips_through_display() {
        for choice in [
            BackendChoice::Auto,
            BackendChoice::Vulkan,
            BackendChoice::Gl,
            BackendChoice::Metal,
            BackendChoice::Dx12,
        ] {
            let parsed: BackendChoice = choice.to_string().parse().expect("parse");
            assert_eq!(parsed, choice);
        }
    }

    #[test]
    fn backend_aliases_parse() {
        assert_eq!("vk".parse::<BackendChoice>(), Ok(BackendChoice::Vulkan));
        assert_eq!("OpenGL".parse::<BackendChoice>(), Ok(BackendChoice::Gl));
        assert!("webgpu".parse::<BackendChoice>().is_err());
    }
}
