use thiserror::Error;

/// Errors raised by the voucher engine.
///
/// Everything except [`VoucherError::Rasterize`] is fatal for a batch.
/// Rasterize errors are recovered per record by the orchestrator.
#[derive(Debug, Error)]
pub enum VoucherError {
    #[error("no voucher records were provided")]
    EmptyBatch,

    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid sheet configuration: {0}")]
    InvalidConfig(String),

    #[error("could not allocate a {width}x{height} render surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("failed to rasterize voucher {code}: {message}")]
    Rasterize { code: String, message: String },

    #[error("png encoding failed: {0}")]
    PngEncode(#[from] png::EncodingError),

    #[error("every voucher failed to render; no document produced")]
    NothingRendered,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid voucher data: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VoucherError>;
