use clap::Parser;

use critter::AppConfig;

/// Interactive viewer for the articulated blocky creature.
///
/// Drag with the left mouse button to turn the model; Shift + click holds the
/// reaction. Space toggles the idle animation, Tab selects a joint, Up/Down
/// bend it and Left/Right turn the rotation slider.
#[derive(Parser, Debug)]
#[command(name = "critter")]
#[command(version, about, long_about = None)]
struct Args {
    /// Window width in logical pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Number of rim slices for the cone ears
    #[arg(long, default_value_t = critter::DEFAULT_CONE_SLICES)]
    slices: u32,

    /// Degrees of rotation per pixel of horizontal drag
    #[arg(long, default_value_t = critter::DEFAULT_DRAG_SENSITIVITY)]
    sensitivity: f32,

    /// Start with the idle animation running
    #[arg(long)]
    animate: bool,

    /// Window title
    #[arg(long, default_value = "Critter")]
    title: String,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig::new()
            .title(args.title)
            .size(args.width, args.height)
            .ear_slices(args.slices)
            .drag_sensitivity(args.sensitivity)
            .auto_animate(args.animate)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::debug!("{args:?}");

    if let Err(e) = critter::run_with_config(args.into()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
