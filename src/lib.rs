use pyo3::prelude::*;
use pyo3_stub_gen::define_stub_info_gatherer;

use session::PySession;
use surface::PySurface;

mod error;
pub mod session;
pub mod surface;

/// A Python module implemented in Rust.
#[pymodule]
fn isoprop(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PySession>()?;
    m.add_class::<PySurface>()?;
    Ok(())
}

define_stub_info_gatherer!(stub_info);
