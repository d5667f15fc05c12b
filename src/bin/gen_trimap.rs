//! Writes a trimap for every alpha matte in a directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use matting_dataset::{generate_trimap_directory, TrimapParams};

#[derive(Parser, Debug)]
#[command(name = "gen-trimap", about = "Generate trimaps from a directory of alpha mattes")]
struct Cli {
    /// Directory holding the alpha mattes
    alpha_dir: PathBuf,

    /// Directory the trimaps are written to
    out_dir: PathBuf,

    /// Side of the elliptical structuring element
    #[arg(long, default_value_t = 3)]
    kernel_size: u32,

    /// Number of dilation passes
    #[arg(long, default_value_t = 10)]
    iterations: u32,
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let params = TrimapParams {
        kernel_size: cli.kernel_size,
        iterations: cli.iterations,
    };

    match generate_trimap_directory(&cli.alpha_dir, &cli.out_dir, params) {
        Ok(count) => {
            log::info!("wrote {} trimaps to {}", count, cli.out_dir.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
