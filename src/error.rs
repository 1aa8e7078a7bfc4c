use isoprop_core::Error;
use pyo3::PyErr;
use pyo3::exceptions::{PyRuntimeError, PyValueError};

/// Bad input surfaces as `ValueError`, everything else as `RuntimeError`
pub(crate) fn to_py_err(context: &str, error: Error) -> PyErr {
    let message = format!("Failed to {context}: {error}");
    match error {
        Error::CorruptData(_)
        | Error::Configuration(_)
        | Error::OutOfBounds { .. }
        | Error::Json(_) => PyErr::new::<PyValueError, _>(message),
        Error::Cancelled | Error::Io(_) => PyErr::new::<PyRuntimeError, _>(message),
    }
}
