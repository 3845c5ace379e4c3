use std::{error, fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum Error {
    InvalidArgument(String),
    Io { path: PathBuf, source: io::Error },
    GeneratorExhausted { expected: usize, actual: usize },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
            Error::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            Error::GeneratorExhausted { expected, actual } => write!(
                f,
                "generator ran out after {} of {} values",
                actual, expected
            ),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
