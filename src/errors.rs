use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SimulatorError {
    // Assembly errors
    AssemblyError { line: usize },

    // System errors
    IoError(std::io::Error),
}

impl fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatorError::AssemblyError { line } => {
                write!(f, "Assembly error at line {}", line)
            },
            SimulatorError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl Error for SimulatorError {}

impl From<std::io::Error> for SimulatorError {
    fn from(error: std::io::Error) -> Self {
        SimulatorError::IoError(error)
    }
}
