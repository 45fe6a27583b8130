use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Failed to decode instruction: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("Failed to decode instruction at program line {line}: {source}")]
    ProgramLoadError {
        line: usize,
        #[source]
        source: DecodeError,
    },

    #[error("Register file error: {0}")]
    RegisterError(#[from] RegisterError),

    #[error("Execution error: {0}")]
    ExecutionError(#[from] ExecutionError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors raised while decoding one instruction line
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("empty instruction line")]
    EmptyLine,

    #[error("unrecognized operation '{0}'")]
    UnknownOperation(String),

    #[error("'{keyword}' expects {expected} operands, found {found}")]
    OperandCount { keyword: String, expected: usize, found: usize },

    #[error("invalid immediate operand '{0}'")]
    BadImmediate(String),

    #[error("invalid branch target '{0}': expected a program index")]
    BadTarget(String),

    #[error("invalid memory operand '{0}': expected offset(base)")]
    BadMemoryOperand(String),
}

/// Errors related to the register file
#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("unknown register '{0}'")]
    UnknownRegister(String),

    #[error("stale write to '{register}': station #{station} is no longer its producer")]
    StaleProducer { register: String, station: usize },
}

/// Errors related to driving the scheduler
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Execution limit reached: {0} cycles")]
    ExecutionLimitReached(u64),

    #[error("station {0} reached the write port with an unresolved operand")]
    UnresolvedOperand(String),

    #[error("branch station {0} must not occupy the write port")]
    BranchAtWritePort(String),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
