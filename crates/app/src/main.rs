//! Entry point for Billiard 3D.
//! Logging + CLI flags, then the ball models are loaded before the window opens.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use asset::{ObjModel, TextureFilter};
use platform::ViewerConfig;

/// Number of ball models expected in the assets directory (`Ball1.obj` .. `Ball15.obj`).
const BALL_MODEL_COUNT: usize = 15;

fn parse_backend_arg(args: &[String]) -> wgpu::Backends {
    // Accept: --gpu-backend=auto|vulkan|dx12|metal|gl
    let mut backends = wgpu::Backends::all(); // default = auto
    for arg in args {
        if let Some(val) = arg.strip_prefix("--gpu-backend=") {
            backends = match val.to_ascii_lowercase().as_str() {
                "auto" => wgpu::Backends::all(),
                "vulkan" | "vk" => wgpu::Backends::VULKAN,
                "dx12" | "d3d12" => wgpu::Backends::DX12,
                "metal" | "mtl" => wgpu::Backends::METAL,
                "gl" | "opengl" | "gles" => wgpu::Backends::GL,
                other => {
                    log::warn!("Unknown backend '{}', falling back to auto.", other);
                    wgpu::Backends::all()
                }
            };
        }
    }
    backends
}

fn parse_show_fps_arg(args: &[String]) -> bool {
    // --show-fps[=on|off], default off
    for arg in args {
        if arg == "--show-fps" {
            return true;
        }
        if let Some(val) = arg.strip_prefix("--show-fps=") {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn parse_size_args(args: &[String]) -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    let ww = w.unwrap_or(1280).max(1);
    let hh = h.unwrap_or(720).max(1);
    (ww, hh)
}

fn parse_assets_arg(args: &[String]) -> PathBuf {
    args.iter()
        .rev()
        .find_map(|arg| arg.strip_prefix("--assets="))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"))
}

fn parse_texture_filter_arg(args: &[String]) -> TextureFilter {
    let mut filter = TextureFilter::default();
    for arg in args {
        if let Some(val) = arg.strip_prefix("--texture-filter=") {
            filter = TextureFilter::from_name(val).unwrap_or_else(|| {
                log::warn!("Unknown texture filter '{}', falling back to linear.", val);
                TextureFilter::default()
            });
        }
    }
    filter
}

fn parse_config(args: &[String]) -> ViewerConfig {
    let (width, height) = parse_size_args(args);
    ViewerConfig {
        backends: parse_backend_arg(args),
        width,
        height,
        show_fps: parse_show_fps_arg(args),
        assets_dir: parse_assets_arg(args),
        texture_filter: parse_texture_filter_arg(args),
    }
}

fn ball_model_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("Ball{}.obj", index + 1))
}

/// Load every ball model; the first failure aborts startup.
fn load_ball_models(dir: &Path) -> Result<Vec<ObjModel>> {
    (0..BALL_MODEL_COUNT)
        .map(|i| {
            let path = ball_model_path(dir, i);
            asset::load_obj_from_path(&path)
                .with_context(|| format!("Failed to load ball model {}", path.display()))
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_config(&args);
    log::info!(
        "Starting Billiard 3D. Backend: {:?}, show_fps={}, window_size={}x{}, assets={}, filter={:?}",
        config.backends,
        config.show_fps,
        config.width,
        config.height,
        config.assets_dir.display(),
        config.texture_filter
    );

    let models = load_ball_models(&config.assets_dir)?;
    log::info!("Loaded {} ball models", models.len());

    platform::run(config, models)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
