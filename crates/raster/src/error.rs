use folio_surface::SurfaceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Surface is {width}x{height}px and cannot be captured")]
    EmptySurface { width: f32, height: f32 },

    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),
}
