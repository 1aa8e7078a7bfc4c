use std::collections::HashMap;
use std::sync::Arc;

use isoprop_core::prelude::*;
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pymethods};

/// Surface
///
/// Travel, wait, walk and in-vehicle minutes for every pixel of the query,
/// row-major, with 255 marking unreachable pixels. Produced by
/// ``Session.generate_surface``.
#[gen_stub_pyclass]
#[pyclass(name = "Surface")]
pub struct PySurface {
    pub(crate) inner: Arc<Surface>,
}

#[gen_stub_pymethods]
#[pymethods]
impl PySurface {
    #[getter]
    pub fn width(&self) -> usize {
        self.inner.extent.width
    }

    #[getter]
    pub fn height(&self) -> usize {
        self.inner.extent.height
    }

    /// Statistic the surface was reduced with
    #[getter]
    pub fn which(&self) -> &'static str {
        self.inner.which.as_str()
    }

    #[getter]
    pub fn cutoff(&self) -> u8 {
        self.inner.cutoff
    }

    #[getter]
    pub fn travel_times(&self) -> Vec<u8> {
        self.inner.travel_times.clone()
    }

    #[getter]
    pub fn wait_times(&self) -> Vec<u8> {
        self.inner.wait_times.clone()
    }

    #[getter]
    pub fn walk_times(&self) -> Vec<u8> {
        self.inner.walk_times.clone()
    }

    #[getter]
    pub fn in_vehicle_travel_times(&self) -> Vec<u8> {
        self.inner.in_vehicle_travel_times.clone()
    }

    /// Opportunities reached within the cutoff, per grid and departure minute
    #[getter]
    pub fn accessibility(&self) -> HashMap<String, Vec<f64>> {
        self.inner
            .accessibility
            .iter()
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect()
    }

    /// Opportunities newly reached at each trip length, per departure minute
    #[getter]
    pub fn spectrogram(&self) -> Option<Vec<Vec<f64>>> {
        self.inner
            .spectrogram
            .as_ref()
            .map(|spectrogram| spectrogram.data.clone())
    }

    /// Travel time of one pixel, 255 outside the query
    pub fn travel_time(&self, x: i64, y: i64) -> u8 {
        self.inner.travel_time(x, y)
    }

    fn __repr__(&self) -> String {
        format!(
            "Surface {}x{} ({}, cutoff {} minutes)",
            self.inner.extent.width, self.inner.extent.height, self.inner.which, self.inner.cutoff
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}
