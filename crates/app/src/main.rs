//! Entry point for the farm scene viewer: logging + CLI flags.

use std::path::PathBuf;

use anyhow::Result;
use corelib::{CoreError, CoreResult};
use platform::RunConfig;

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;
const DEFAULT_ASSETS_DIR: &str = "assets";

fn backend_from_name(name: &str) -> CoreResult<wgpu::Backends> {
    match name.to_ascii_lowercase().as_str() {
        "auto" => Ok(wgpu::Backends::all()),
        "vulkan" | "vk" => Ok(wgpu::Backends::VULKAN),
        "dx12" | "d3d12" => Ok(wgpu::Backends::DX12),
        "metal" | "mtl" => Ok(wgpu::Backends::METAL),
        "gl" | "opengl" | "gles" => Ok(wgpu::Backends::GL),
        _ => Err(CoreError::InvalidArgument {
            flag: "--gpu-backend",
            value: name.to_string(),
        }),
    }
}

/// `--gpu-backend=auto|vulkan|dx12|metal|gl`; unknown names fall back to auto.
fn parse_backend_arg(args: &[String]) -> wgpu::Backends {
    let mut backends = wgpu::Backends::all();
    for arg in args {
        if let Some(val) = arg.strip_prefix("--gpu-backend=") {
            backends = backend_from_name(val).unwrap_or_else(|err| {
                log::warn!("{err}, falling back to auto.");
                wgpu::Backends::all()
            });
        }
    }
    backends
}

// --show-fps[=on|off], off by default
fn parse_show_fps_arg(args: &[String]) -> bool {
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

fn parse_dimension(flag: &'static str, value: &str) -> CoreResult<u32> {
    value.parse::<u32>().map_err(|_| CoreError::InvalidArgument {
        flag,
        value: value.to_string(),
    })
}

fn parse_size_args(args: &[String]) -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in args {
        let parsed = if let Some(v) = arg.strip_prefix("--size=") {
            v.split_once(['x', 'X'])
                .ok_or_else(|| CoreError::InvalidArgument {
                    flag: "--size",
                    value: v.to_string(),
                })
                .and_then(|(sw, sh)| {
                    Ok((
                        Some(parse_dimension("--size", sw)?),
                        Some(parse_dimension("--size", sh)?),
                    ))
                })
        } else if let Some(v) = arg.strip_prefix("--width=") {
            parse_dimension("--width", v).map(|pw| (Some(pw), h))
        } else if let Some(v) = arg.strip_prefix("--height=") {
            parse_dimension("--height", v).map(|ph| (w, Some(ph)))
        } else {
            continue;
        };

        match parsed {
            Ok((pw, ph)) => {
                w = pw.or(w);
                h = ph.or(h);
            }
            Err(err) => log::warn!("{err}, ignored."),
        }
    }

    let ww = w.unwrap_or(DEFAULT_WIDTH).max(1);
    let hh = h.unwrap_or(DEFAULT_HEIGHT).max(1);
    (ww, hh)
}

fn parse_assets_arg(args: &[String]) -> PathBuf {
    args.iter()
        .rev()
        .find_map(|arg| arg.strip_prefix("--assets="))
        .filter(|dir| !dir.is_empty())
        .unwrap_or(DEFAULT_ASSETS_DIR)
        .into()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (width, height) = parse_size_args(&args);
    let config = RunConfig {
        backends: parse_backend_arg(&args),
        show_fps: parse_show_fps_arg(&args),
        width,
        height,
        assets_dir: parse_assets_arg(&args),
    };
    log::info!(
        "Starting farm viewer. Backend: {:?}, show_fps={}, window_size={}x{}, assets={}",
        config.backends,
        config.show_fps,
        config.width,
        config.height,
        config.assets_dir.display()
    );

    platform::run_with_renderer(config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn backend_names_are_case_insensitive() {
        assert_eq!(
            parse_backend_arg(&args(&["--gpu-backend=Vulkan"])),
            wgpu::Backends::VULKAN
        );
        assert_eq!(parse_backend_arg(&args(&[])), wgpu::Backends::all());
        assert_eq!(
            parse_backend_arg(&args(&["--gpu-backend=voodoo"])),
            wgpu::Backends::all()
        );
        assert_eq!(
            backend_from_name("voodoo"),
            Err(CoreError::InvalidArgument {
                flag: "--gpu-backend",
                value: "voodoo".into()
            })
        );
    }

    #[test]
    fn show_fps_flag_forms() {
        assert!(parse_show_fps_arg(&args(&["--show-fps"])));
        assert!(parse_show_fps_arg(&args(&["--show-fps=ON"])));
        assert!(!parse_show_fps_arg(&args(&["--show-fps=off"])));
        assert!(!parse_show_fps_arg(&args(&[])));
    }

    #[test]
    fn size_flags_combine_and_ignore_garbage() {
        assert_eq!(parse_size_args(&args(&[])), (800, 600));
        assert_eq!(parse_size_args(&args(&["--size=1024X768"])), (1024, 768));
        assert_eq!(
            parse_size_args(&args(&["--size=1024x768", "--height=500"])),
            (1024, 500)
        );
        assert_eq!(parse_size_args(&args(&["--size=big", "--width=640"])), (640, 600));
        assert_eq!(parse_size_args(&args(&["--width=0"])), (1, 600));
    }

    #[test]
    fn assets_dir_defaults_and_last_wins() {
        assert_eq!(parse_assets_arg(&args(&[])), PathBuf::from("assets"));
        assert_eq!(
            parse_assets_arg(&args(&["--assets=a", "--assets=/data/farm"])),
            PathBuf::from("/data/farm")
        );
        assert_eq!(parse_assets_arg(&args(&["--assets="])), PathBuf::from("assets"));
    }
}
