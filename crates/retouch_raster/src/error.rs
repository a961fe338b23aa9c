use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("Region {width}x{height} is empty")]
    EmptyRegion { width: u32, height: u32 },

    #[error("Kernel size {0} must be odd and at least 1")]
    InvalidKernel(u32),

    #[error("Gamma {0} must be positive")]
    InvalidGamma(f64),
}

pub type Result<T> = std::result::Result<T, RasterError>;
