use std::{error::Error, fmt::Display};

use tracer_io::{BmpError, ObjError};

/// Errors that can arise while building the scene to render: importing an
/// OBJ mesh or reading a skybox directory's BMP faces.
#[derive(Debug)]
pub enum AppError {
    ObjImport(ObjError),
    Bmp(BmpError),
}

impl From<ObjError> for AppError {
    fn from(value: ObjError) -> Self {
        Self::ObjImport(value)
    }
}

impl From<BmpError> for AppError {
    fn from(value: BmpError) -> Self {
        Self::Bmp(value)
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::ObjImport(e) => write!(f, "failed to import mesh: {e}"),
            AppError::Bmp(e) => write!(f, "BMP read/write failed: {e}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::ObjImport(e) => Some(e),
            AppError::Bmp(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obj_import_display_wraps_the_underlying_error() {
        let err = AppError::from(ObjError::IndexOutOfRange { line: 3, index: 7 });
        assert!(err.to_string().contains("line 3"));
    }
}
