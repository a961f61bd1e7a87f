use std::time::Instant;

use clap::Subcommand;
use pomonoise_core::{Config, NoiseCache, NoiseColor};

#[derive(Subcommand)]
pub enum NoiseAction {
    /// Generate cached noise buffers (all colors when none are given)
    Generate {
        /// Colors to generate: white, pink, brown
        colors: Vec<NoiseColor>,
    },
    /// Print the cache directory
    Path,
}

pub fn run(action: NoiseAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let dir = config.noise_dir()?;

    match action {
        NoiseAction::Generate { colors } => {
            let colors = if colors.is_empty() {
                NoiseColor::ALL.to_vec()
            } else {
                colors
            };
            let cache = NoiseCache::new(dir.clone());
            for color in colors {
                let started = Instant::now();
                let buffer = cache.get_or_create(color);
                let path = cache
                    .path_for(color)
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!(
                    "{color}: {} samples, {:.1}s ({} ms) -> {path}",
                    buffer.len(),
                    buffer.duration_secs(),
                    started.elapsed().as_millis(),
                );
            }
        }
        NoiseAction::Path => {
            println!("{}", dir.display());
        }
    }
    Ok(())
}
