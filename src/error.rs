use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    #[error("service for element {element} starts {wait_seconds:.3}s before its arrival")]
    CausalityViolation { element: u64, wait_seconds: f64 },
    #[error("numeric overflow: {0}")]
    NumericOverflow(String),
    #[error("unstable system (rho = {rho:.4} >= 1)")]
    UnstableSystem { rho: f64 },
    #[error("unknown queue '{0}'")]
    UnknownQueue(String),
    #[error("queue '{name}' is not a {expected} queue")]
    WrongQueueRole { name: String, expected: String },
    #[error("duplicate queue name '{0}'")]
    DuplicateQueue(String),
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
