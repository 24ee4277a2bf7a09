//! `gores` command line tool.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gores::config::{GoresConfig, VectorLayerConfig};

/// Renders a world map as printable globe gores.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of gores. An odd number keeps the prime meridian away from an interruption.
    num_gores: Option<u32>,

    /// Longitude at the center of the map.
    #[arg(allow_negative_numbers = true)]
    prime_meridian: Option<f64>,

    /// Height of the map in pixels. The width follows from the number of gores.
    map_height: Option<u32>,

    /// Georeferenced raster drawn as the base layer (reprojected with gdalwarp).
    raster: Option<PathBuf>,

    /// Output PNG file.
    output: Option<PathBuf>,

    /// GeoJSON layer drawn on top of the raster, optionally with a fixed fill: PATH[:#RRGGBB].
    #[arg(long = "vector", value_name = "PATH[:#RRGGBB]")]
    vectors: Vec<String>,

    /// TrueType/OpenType font for labels.
    #[arg(long)]
    font: Option<PathBuf>,

    /// JSON configuration file. Command line arguments override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not draw labels.
    #[arg(long)]
    no_labels: bool,

    /// Do not assign palette colors to features without a fill.
    #[arg(long)]
    no_coloring: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<GoresConfig> {
        let mut config = match &self.config {
            Some(path) => GoresConfig::from_file(path)
                .with_context(|| format!("cannot read configuration {}", path.display()))?,
            None => GoresConfig::default(),
        };

        if let Some(num_gores) = self.num_gores {
            config.num_gores = num_gores;
        }
        if let Some(prime_meridian) = self.prime_meridian {
            config.prime_meridian = prime_meridian;
        }
        if let Some(map_height) = self.map_height {
            config.map_height = map_height;
        }
        if let Some(raster) = self.raster {
            config.raster_source = Some(raster);
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(font) = self.font {
            config.font_path = Some(font);
        }

        for vector in &self.vectors {
            config.vector_layers.push(VectorLayerConfig::parse(vector)?);
        }
        if self.no_labels {
            for layer in &mut config.vector_layers {
                layer.labels = false;
            }
        }
        if self.no_coloring {
            config.coloring = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config()?;
    log::debug!("Configuration: {config:?}");

    let summary = gores::render(&config)
        .with_context(|| format!("failed to render {}", config.output_path.display()))?;
    log::info!(
        "Wrote {} gores to {}",
        summary.gores,
        config.output_path.display()
    );

    Ok(())
}
