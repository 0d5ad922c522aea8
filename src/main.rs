use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "memdetect")]
#[command(about = "Live object detection over still images and indexed image folders")]
struct Cli {
    /// Image to load on startup
    #[arg(value_name = "IMAGE", default_value = "test.png")]
    image: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();
    memdetect::gui::run(args.image)?;

    Ok(())
}
