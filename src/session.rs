use std::collections::HashMap;
use std::sync::Arc;

use isoprop_core::prelude::*;
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pymethods};

use crate::error::to_py_err;
use crate::surface::PySurface;

/// Session
///
/// Holds everything loaded for one query window: the query descriptor, the
/// stop tree cache, opportunity grids, transit metadata and the currently
/// selected origin. Surfaces and itineraries are computed on demand from
/// whatever is loaded.
///
/// Example:
///
/// .. code-block:: python
///
///     session = Session()
///     session.set_query(open("query.json").read())
///     session.set_stop_tree_cache(open("stop_trees.dat", "rb").read())
///     session.put_grid("jobs", open("jobs.grid", "rb").read())
///     session.set_origin(open("origin.dat", "rb").read(), 120, 84)
///     surface = session.generate_surface("AVERAGE", 60)
#[gen_stub_pyclass]
#[pyclass(name = "Session")]
#[derive(Default)]
pub struct PySession {
    builder: SessionBuilder,
    session: Option<Session>,
    surface: Option<Arc<Surface>>,
}

impl PySession {
    fn update(&mut self, builder: SessionBuilder) {
        let origin_changed = !same_arc(builder.origin(), self.builder.origin());
        let query_changed =
            builder.query().map(|q| q.extent) != self.builder.query().map(|q| q.extent);
        if origin_changed || query_changed {
            self.surface = None;
        }
        self.builder = builder;
        self.session = None;
    }

    fn session(&mut self) -> Result<&Session, isoprop_core::Error> {
        if self.session.is_none() {
            self.session = Some(self.builder.build()?);
        }
        self.session
            .as_ref()
            .ok_or_else(|| isoprop_core::Error::Configuration("no session".to_string()))
    }

    fn surface(&self) -> Result<&Arc<Surface>, isoprop_core::Error> {
        self.surface.as_ref().ok_or_else(|| {
            isoprop_core::Error::Configuration("no surface has been generated".to_string())
        })
    }
}

fn same_arc(a: Option<&Arc<Origin>>, b: Option<&Arc<Origin>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

#[gen_stub_pymethods]
#[pymethods]
impl PySession {
    #[new]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query descriptor (JSON). A stop tree cache or origin loaded
    /// for a different window is discarded.
    pub fn set_query(&mut self, json: &str) -> PyResult<()> {
        let query = Query::from_json(json).map_err(|e| to_py_err("parse query", e))?;
        let builder = self.builder.with_query(query);
        self.update(builder);
        Ok(())
    }

    pub fn set_stop_tree_cache(
        &mut self,
        py: Python<'_>,
        #[gen_stub(override_type(type_repr = "bytes", imports = ()))] data: &[u8],
    ) -> PyResult<()> {
        let builder = py
            .detach(|| self.builder.with_stop_trees(data))
            .map_err(|e| to_py_err("load stop tree cache", e))?;
        self.update(builder);
        Ok(())
    }

    /// Registers an opportunity grid under `name`, replacing any grid of the
    /// same name
    pub fn put_grid(
        &mut self,
        name: &str,
        #[gen_stub(override_type(type_repr = "bytes", imports = ()))] data: &[u8],
    ) -> PyResult<()> {
        let grid = Grid::from_bytes(data).map_err(|e| to_py_err("load grid", e))?;
        let builder = self
            .builder
            .with_grid(name, Arc::new(grid))
            .map_err(|e| to_py_err("register grid", e))?;
        self.update(builder);
        Ok(())
    }

    /// Selects the origin at query pixel `(x, y)`
    pub fn set_origin(
        &mut self,
        py: Python<'_>,
        #[gen_stub(override_type(type_repr = "bytes", imports = ()))] data: &[u8],
        x: i32,
        y: i32,
    ) -> PyResult<()> {
        let origin = py
            .detach(|| Origin::from_bytes(data, PixelPoint::new(x, y)))
            .map_err(|e| to_py_err("load origin", e))?;
        let builder = self.builder.with_origin(origin);
        self.update(builder);
        Ok(())
    }

    /// Sets the transit network (JSON) used to describe journeys
    pub fn set_transitive_network(&mut self, json: &str) -> PyResult<()> {
        let network = TransitiveNetwork::from_json(json)
            .map_err(|e| to_py_err("parse transit network", e))?;
        let builder = self.builder.with_transitive_network(network);
        self.update(builder);
        Ok(())
    }

    /// Query and stop tree cache are loaded
    pub fn is_ready(&self) -> bool {
        self.builder.is_ready()
    }

    /// Ready, and an origin is selected
    pub fn is_loaded(&self) -> bool {
        self.builder.is_loaded()
    }

    /// Generate the travel time surface of the selected origin
    ///
    /// Parameters
    /// ----------
    /// which : str, default="MEDIAN"
    ///     One of ``BEST_CASE``, ``WORST_CASE``, ``AVERAGE``, ``MEDIAN``
    /// cutoff : int, default=60
    ///     Accessibility cutoff in minutes
    /// spectrogram_grid : str, optional
    ///     Registered grid to build a spectrogram for
    ///
    /// Raises
    /// ------
    /// ValueError
    ///     If inputs are missing or the options are invalid
    ///
    /// Notes
    /// -----
    /// The GIL is released while the surface is computed.
    #[pyo3(signature = (which = "MEDIAN", cutoff = 60, spectrogram_grid = None))]
    pub fn generate_surface(
        &mut self,
        py: Python<'_>,
        which: &str,
        cutoff: u8,
        spectrogram_grid: Option<String>,
    ) -> PyResult<PySurface> {
        let options = SurfaceOptions {
            which: which.parse().map_err(|e| to_py_err("parse case", e))?,
            cutoff,
            spectrogram_grid,
        };
        let session = self
            .session()
            .map_err(|e| to_py_err("generate surface", e))?;
        let surface = py
            .detach(|| generate_surface(session, &options, &CancellationToken::new()))
            .map_err(|e| to_py_err("generate surface", e))?;

        let surface = Arc::new(surface);
        self.surface = Some(surface.clone());
        Ok(PySurface { inner: surface })
    }

    /// Paths, per-minute times, journeys and surface values for the
    /// destination pixel `(x, y)` of the last generated surface, as JSON
    pub fn generate_destination_data(
        &mut self,
        py: Python<'_>,
        x: i32,
        y: i32,
    ) -> PyResult<String> {
        let surface = self
            .surface()
            .map_err(|e| to_py_err("generate destination data", e))?
            .clone();
        let session = self
            .session()
            .map_err(|e| to_py_err("generate destination data", e))?;
        py.detach(|| -> Result<String, isoprop_core::Error> {
            let data = generate_destination_data(session, &surface, PixelPoint::new(x, y))?;
            Ok(serde_json::to_string(&data)?)
        })
        .map_err(|e| to_py_err("generate destination data", e))
    }

    /// Marey plot input for the destination pixel `(x, y)`, as JSON
    pub fn marey_data(&mut self, x: i32, y: i32) -> PyResult<String> {
        let session = self
            .session()
            .map_err(|e| to_py_err("build Marey data", e))?;
        let data = marey_data(session, PixelPoint::new(x, y));
        serde_json::to_string(&data).map_err(|e| to_py_err("build Marey data", e.into()))
    }

    /// Legs of one recorded path as `(board_stop, pattern, alight_stop)`
    pub fn get_path(&self, stop: i64, path_index: i64) -> PyResult<Vec<(usize, usize, usize)>> {
        let origin = self.builder.origin().ok_or_else(|| {
            to_py_err(
                "reconstruct path",
                isoprop_core::Error::Configuration("no origin has been selected".to_string()),
            )
        })?;
        let Some(descriptor) = PathDescriptor::from_wire(stop, path_index) else {
            return Ok(Vec::new());
        };
        Ok(origin
            .stop_pattern_stop_sets(descriptor)
            .into_iter()
            .map(|leg| (leg.board_stop, leg.pattern, leg.alight_stop))
            .collect())
    }

    /// Best path and travel time per departure minute for the destination
    /// pixel `(x, y)`. Paths are `(stop, path_index)`, `(-1, -1)` for
    /// walking and `None` where the pixel is unreachable.
    pub fn get_paths(&mut self, x: i32, y: i32) -> PyResult<(Vec<Option<(i64, i64)>>, Vec<u8>)> {
        let session = self.session().map_err(|e| to_py_err("compute paths", e))?;
        let result = paths_and_times(session, PixelPoint::new(x, y));
        let paths = result
            .paths
            .iter()
            .map(|path| path.map(PathDescriptor::to_wire))
            .collect();
        Ok((paths, result.times))
    }

    /// Opportunities of the registered grid `name` reachable within the
    /// cutoff of the last generated surface, averaged over departure minutes
    pub fn accessibility_for_grid(&self, name: &str) -> PyResult<f64> {
        let surface = self
            .surface()
            .map_err(|e| to_py_err("compute accessibility", e))?;
        let grid = self.builder.grid(name).ok_or_else(|| {
            to_py_err(
                "compute accessibility",
                isoprop_core::Error::Configuration(format!("unknown grid {name}")),
            )
        })?;
        Ok(accessibility_for_grid(surface, grid))
    }

    /// Per-grid opportunities within the cutoff of the last generated
    /// surface, reduced over departure minutes with `which`
    #[pyo3(signature = (which = "AVERAGE"))]
    pub fn accessibility_for_cutoff(&self, which: &str) -> PyResult<HashMap<String, i64>> {
        let which: Case = which.parse().map_err(|e| to_py_err("parse case", e))?;
        let surface = self
            .surface()
            .map_err(|e| to_py_err("compute accessibility", e))?;
        Ok(accessibility_for_cutoff(surface, which)
            .into_iter()
            .collect())
    }

    fn __repr__(&self) -> String {
        match self.builder.query() {
            Some(query) => format!(
                "Session {}x{} at zoom {} (ready: {}, origin: {})",
                query.width(),
                query.height(),
                query.extent.zoom,
                self.builder.is_ready(),
                self.builder.is_loaded()
            ),
            None => "Session (empty)".to_string(),
        }
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}
