//! # HPP Workbench Entry Point
//!
//! Usage: `hpp-workbench [--config <path>]`
//!
//! Without `--config`, `hpp.toml` is read from the platform config
//! directory when it exists. `HPP_*` environment variables override both.

use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let mut config_path: Option<PathBuf> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                config_path = args.next().map(PathBuf::from);
            }
            "--help" | "-h" => {
                println!("HPP Workbench");
                println!();
                println!("Usage: hpp-workbench [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir/hpp.toml)");
                println!("  -h, --help           Print help");
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(2);
            }
        }
    }

    if let Err(e) = hpp_workbench_lib::run(config_path).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
