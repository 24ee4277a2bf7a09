//! Raster base layer reprojected into every gore.

use std::path::{Path, PathBuf};
use std::process::Command;

use geo::coord;
use gores_types::cartesian::Point2d;
use image::RgbaImage;

use crate::driver::RenderContext;
use crate::error::GoresError;
use crate::layer::Layer;
use crate::projector::Projector;
use crate::render::Canvas;

/// Parameters of a single reprojection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReprojectionRequest {
    /// PROJ definition of the target projection.
    pub proj_string: String,
    /// Projected distance between the poles. The output covers `[-1, 1]` horizontally and
    /// `[-full_height / 2, full_height / 2]` vertically, in projected units.
    pub full_height: f64,
    /// Height of the output image in pixels.
    pub map_height: u32,
}

impl ReprojectionRequest {
    /// Request for the gore of the context.
    pub fn for_gore(ctx: &RenderContext) -> Self {
        Self {
            proj_string: ctx.projector.projection().proj_string(),
            full_height: ctx.projector.constants().full_height,
            map_height: ctx.config.map_height,
        }
    }
}

/// Warps a georeferenced raster into the projection of a gore.
pub trait RasterReprojector {
    /// Returns the reprojected image covering the extent of the request.
    fn reproject(&self, source: &Path, request: &ReprojectionRequest)
        -> Result<RgbaImage, GoresError>;
}

/// [`RasterReprojector`] running the `gdalwarp` command line tool.
#[derive(Debug, Clone)]
pub struct GdalWarp {
    program: PathBuf,
    scratch_dir: PathBuf,
}

impl GdalWarp {
    /// Uses `gdalwarp` from `PATH`, writing intermediate files into `scratch_dir`.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("gdalwarp"),
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Uses the given executable instead of `gdalwarp` from `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Intermediate GeoTIFF written by the tool.
    pub fn scratch_file(&self) -> PathBuf {
        self.scratch_dir
            .join(format!("gores-reprojected-{}.tiff", std::process::id()))
    }

    fn arguments(source: &Path, request: &ReprojectionRequest, output: &Path) -> Vec<String> {
        let half_height = request.full_height / 2.0;
        let sample_steps = (request.map_height as f64).sqrt() * 20.0;

        let mut args: Vec<String> = ["-overwrite", "-multi", "-nomd", "-t_srs"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(request.proj_string.clone());
        args.extend([
            "-te".to_string(),
            "-1".to_string(),
            (-half_height).to_string(),
            "1".to_string(),
            half_height.to_string(),
            "-ts".to_string(),
            "0".to_string(),
            request.map_height.to_string(),
            "-r".to_string(),
            "bilinear".to_string(),
            "-wo".to_string(),
            "SAMPLE_GRID=YES".to_string(),
            "-wo".to_string(),
            format!("SAMPLE_STEPS={sample_steps}"),
        ]);
        args.push(source.display().to_string());
        args.push(output.display().to_string());

        args
    }
}

impl RasterReprojector for GdalWarp {
    fn reproject(
        &self,
        source: &Path,
        request: &ReprojectionRequest,
    ) -> Result<RgbaImage, GoresError> {
        let output_path = self.scratch_file();
        let args = Self::arguments(source, request, &output_path);
        log::trace!("Running {} {}", self.program.display(), args.join(" "));

        let output = Command::new(&self.program).args(&args).output().map_err(|err| {
            GoresError::Reprojection(format!("cannot run {}: {err}", self.program.display()))
        })?;

        if !output.status.success() {
            return Err(GoresError::Reprojection(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        if !output_path.exists() {
            return Err(GoresError::Reprojection(format!(
                "{} did not produce {}",
                self.program.display(),
                output_path.display()
            )));
        }

        let image = image::open(&output_path)?.to_rgba8();
        if let Err(err) = std::fs::remove_file(&output_path) {
            log::debug!("Cannot remove {}: {err}", output_path.display());
        }

        Ok(image)
    }
}

/// Draws the reprojected tile so that its center lands on the point where the gore's central
/// meridian crosses the equator.
pub fn composite_raster<C: Canvas + ?Sized>(
    tile: &RgbaImage,
    ctx: &RenderContext,
    canvas: &mut C,
) -> Option<Point2d> {
    let center = ctx.projector.project(coord! { x: ctx.gore.central_meridian(), y: 0.0 })?;
    let top_left = Point2d::new(
        center.x - tile.width() as f64 / 2.0,
        center.y - tile.height() as f64 / 2.0,
    );
    canvas.draw_image(tile, top_left);

    Some(top_left)
}

/// Georeferenced image drawn as the base of every gore.
pub struct RasterLayer {
    source: PathBuf,
    name: String,
    reprojector: Box<dyn RasterReprojector>,
}

impl std::fmt::Debug for RasterLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterLayer")
            .field("source", &self.source)
            .finish()
    }
}

impl RasterLayer {
    /// Creates a layer. Fails if the source file does not exist.
    pub fn new(
        source: impl Into<PathBuf>,
        reprojector: Box<dyn RasterReprojector>,
    ) -> Result<Self, GoresError> {
        let source = source.into();
        if !source.is_file() {
            return Err(GoresError::FsIo(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("raster source {} not found", source.display()),
            )));
        }

        Ok(Self {
            name: source.display().to_string(),
            source,
            reprojector,
        })
    }
}

impl<C: Canvas> Layer<C> for RasterLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, ctx: &RenderContext, canvas: &mut C) -> Result<(), GoresError> {
        let request = ReprojectionRequest::for_gore(ctx);
        let tile = self.reprojector.reproject(&self.source, &request)?;

        if composite_raster(&tile, ctx, canvas).is_none() {
            log::warn!("Cannot place raster tile of gore {}", ctx.gore.index());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GoresConfig;
    use crate::gore::GoreBuilder;
    use crate::projector::GoreLayout;
    use crate::render::recording::{Op, RecordingCanvas};
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FixedTile {
        requests: Rc<RefCell<Vec<ReprojectionRequest>>>,
    }

    impl RasterReprojector for FixedTile {
        fn reproject(
            &self,
            _source: &Path,
            request: &ReprojectionRequest,
        ) -> Result<RgbaImage, GoresError> {
            self.requests.borrow_mut().push(request.clone());
            let width = (request.map_height as f64 * 2.0 / request.full_height) as u32;
            Ok(RgbaImage::new(width, request.map_height))
        }
    }

    fn with_context<T>(f: impl FnOnce(&RenderContext) -> T) -> T {
        let config = GoresConfig {
            num_gores: 12,
            prime_meridian: 0.0,
            map_height: 200,
            ..Default::default()
        };
        let layout = GoreLayout::from_config(&config).expect("layout");
        let builder = GoreBuilder::new(&config, &layout).expect("builder");
        let gore = builder.build_gore(3);
        let projector = layout
            .projector(gore.index(), gore.central_meridian())
            .expect("projector");

        f(&RenderContext {
            gore: &gore,
            projector: &projector,
            config: &config,
        })
    }

    #[test]
    fn gdalwarp_arguments() {
        let request = ReprojectionRequest {
            proj_string: "+proj=laea +lon_0=15".to_string(),
            full_height: 2.8,
            map_height: 400,
        };
        let args = GdalWarp::arguments(
            Path::new("world.tif"),
            &request,
            Path::new("/tmp/out.tiff"),
        );

        assert_eq!(&args[..5], ["-overwrite", "-multi", "-nomd", "-t_srs", "+proj=laea +lon_0=15"]);
        assert_eq!(&args[5..10], ["-te", "-1", "-1.4", "1", "1.4"]);
        assert_eq!(&args[10..13], ["-ts", "0", "400"]);
        assert!(args.contains(&"SAMPLE_STEPS=400".to_string()));
        assert_eq!(&args[args.len() - 2..], ["world.tif", "/tmp/out.tiff"]);
    }

    #[test]
    fn missing_tool_is_a_reprojection_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let warp = GdalWarp::new(dir.path()).with_program(dir.path().join("no-such-gdalwarp"));
        let request = ReprojectionRequest {
            proj_string: "+proj=laea".to_string(),
            full_height: 2.8,
            map_height: 16,
        };

        assert_matches!(
            warp.reproject(Path::new("world.tif"), &request),
            Err(GoresError::Reprojection(_))
        );
    }

    #[test]
    fn tile_is_centered_on_the_central_meridian() {
        with_context(|ctx| {
            let tile = RgbaImage::new(40, 200);
            let mut canvas = RecordingCanvas::new(1000, 300);
            let top_left = composite_raster(&tile, ctx, &mut canvas).expect("placed");

            let center = ctx
                .projector
                .project(coord! { x: ctx.gore.central_meridian(), y: 0.0 })
                .expect("projects");
            assert_abs_diff_eq!(top_left.x + 20.0, center.x, epsilon = 1e-9);
            assert_abs_diff_eq!(top_left.y + 100.0, center.y, epsilon = 1e-9);
            assert_matches!(&canvas.ops[..], [Op::Image { width: 40, height: 200, .. }]);
        });
    }

    #[test]
    fn layer_requests_the_gore_projection() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = dir.path().join("world.tif");
        std::fs::write(&source, b"not really a tiff").expect("write");

        let requests = Rc::new(RefCell::new(Vec::new()));
        let layer = RasterLayer::new(
            &source,
            Box::new(FixedTile {
                requests: requests.clone(),
            }),
        )
        .expect("layer");

        with_context(|ctx| {
            let mut canvas = RecordingCanvas::new(1000, 300);
            Layer::<RecordingCanvas>::render(&layer, ctx, &mut canvas).expect("rendered");

            let requests = requests.borrow();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].map_height, 200);
            assert!(requests[0]
                .proj_string
                .contains(&format!("+lon_0={}", ctx.gore.central_meridian())));
            assert_eq!(canvas.ops.len(), 1);
        });
    }

    #[test]
    fn missing_source_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let warp = GdalWarp::new(dir.path());
        assert_matches!(
            RasterLayer::new(dir.path().join("missing.tif"), Box::new(warp)),
            Err(GoresError::FsIo(_))
        );
    }
}
