use thiserror::Error;

/// Errors surfaced by strip construction, pixel access and transmission.
#[derive(Debug, Error)]
pub enum StripError {
    #[error("strip length must be at least one pixel")]
    EmptyStrip,
    #[error("strip must have at least one line")]
    NoLines,
    #[error("pixel index {index} out of range for strip of {length}")]
    PixelOutOfRange { index: usize, length: usize },
    #[error("line {line} out of range for strip with {lines} lines")]
    LineOutOfRange { line: usize, lines: usize },
    #[error("range selects {expected} pixels but {actual} colors were given")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("strip has been deinitialized")]
    Released,
    #[error("unknown pixel order {0:?}")]
    UnknownOrder(String),
    #[error("output pin write failed")]
    PinWrite,
    #[error("gpio: {0}")]
    Gpio(#[from] rppal::gpio::Error),
    #[error("spi: {0}")]
    Spi(#[from] rppal::spi::Error),
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Config(#[from] serde_yaml::Error),
}
