#![allow(clippy::useless_conversion)]

use ndarray::{Array3, ArrayView3};
use numpy::{
    PyArray3, PyArrayDescrMethods, PyReadonlyArray1, PyReadonlyArray2, PyReadonlyArray3,
    PyUntypedArrayMethods, ToPyArray,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use drid_core::{
    signed_cbrt, BondSet, Descriptors, DridConfig, DridEngine, DridError, EmptyRowPolicy,
    Parallelism, Trajectory,
};

// ============================================================================
// Helpers: numpy <-> drid_core conversion
// ============================================================================

fn drid_err(e: DridError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn array3_to_trajectory(arr: &ArrayView3<f64>) -> PyResult<Trajectory> {
    if arr.shape()[2] != 3 {
        return Err(PyValueError::new_err(format!(
            "xyz must have shape (n_frames, n_atoms, 3), got last axis of length {}",
            arr.shape()[2]
        )));
    }
    let n_atoms = arr.shape()[1];
    // iter() walks in logical order, so non-contiguous views are fine
    let xyz: Vec<f64> = arr.iter().copied().collect();
    Trajectory::from_flat(n_atoms, &xyz).map_err(drid_err)
}

fn descriptors_to_array3(descriptors: Descriptors) -> PyResult<Array3<f64>> {
    let shape = descriptors.shape();
    Array3::from_shape_vec(shape, descriptors.into_vec())
        .map_err(|e| PyValueError::new_err(format!("Failed to shape descriptor array: {}", e)))
}

fn indices_to_usize(values: impl Iterator<Item = i64>, what: &str) -> PyResult<Vec<usize>> {
    values
        .map(|v| {
            usize::try_from(v)
                .map_err(|_| PyValueError::new_err(format!("{} contains negative index {}", what, v)))
        })
        .collect()
}

fn bonds_from_array(bonds: Option<PyReadonlyArray2<'_, i64>>, n_atoms: usize) -> PyResult<BondSet> {
    let Some(bonds) = bonds else {
        return Ok(BondSet::empty(n_atoms));
    };
    let arr = bonds.as_array();
    if arr.shape()[1] != 2 {
        return Err(PyValueError::new_err(format!(
            "bonds must have shape (n_bonds, 2), got second axis of length {}",
            arr.shape()[1]
        )));
    }
    let flat = indices_to_usize(arr.iter().copied(), "bonds")?;
    let pairs: Vec<(usize, usize)> = flat.chunks_exact(2).map(|p| (p[0], p[1])).collect();
    BondSet::new(n_atoms, &pairs).map_err(drid_err)
}

fn parse_empty_row_policy(value: &str) -> PyResult<EmptyRowPolicy> {
    match value.to_ascii_lowercase().as_str() {
        "nan" => Ok(EmptyRowPolicy::Nan),
        "error" | "raise" => Ok(EmptyRowPolicy::Error),
        other => Err(PyValueError::new_err(format!(
            "empty_rows must be 'nan' or 'error', got '{}'",
            other
        ))),
    }
}

// ============================================================================
// DRID
// ============================================================================

/// Compute DRID descriptors for a trajectory.
///
/// Returns an array of shape (n_frames, n_atoms, 3) holding, per atom,
/// the mean, population standard deviation and signed cube root of the
/// third central moment of its reciprocal distances to all non-bonded atoms.
/// float32 input gives float32 output.
#[pyfunction]
#[pyo3(
    name = "compute_drid",
    signature = (xyz, bonds=None, atom_indices=None, empty_rows="nan", parallel=true)
)]
fn compute_drid_py<'py>(
    py: Python<'py>,
    xyz: &Bound<'py, numpy::PyUntypedArray>,
    bonds: Option<PyReadonlyArray2<'py, i64>>,
    atom_indices: Option<PyReadonlyArray1<'py, i64>>,
    empty_rows: &str,
    parallel: bool,
) -> PyResult<PyObject> {
    let is_f32 = xyz.dtype().is_equiv_to(&numpy::dtype_bound::<f32>(py));

    // Convert to f64 for processing
    let xyz_f64: PyReadonlyArray3<'py, f64> = if is_f32 {
        let arr = xyz.call_method1("astype", (numpy::dtype_bound::<f64>(py),))?;
        arr.extract()?
    } else {
        xyz.extract()?
    };

    let trajectory = array3_to_trajectory(&xyz_f64.as_array())?;
    let bond_set = bonds_from_array(bonds, trajectory.n_atoms())?;
    let atom_indices = atom_indices
        .map(|a| indices_to_usize(a.as_array().iter().copied(), "atom_indices"))
        .transpose()?;

    let config = DridConfig {
        atom_indices,
        empty_row_policy: parse_empty_row_policy(empty_rows)?,
        parallelism: if parallel {
            Parallelism::Auto
        } else {
            Parallelism::Serial
        },
    };

    let engine = DridEngine::new(trajectory.n_atoms(), &bond_set, config).map_err(drid_err)?;
    let descriptors = py
        .allow_threads(|| engine.compute(&trajectory))
        .map_err(drid_err)?;

    let result_f64: Bound<'py, PyArray3<f64>> = descriptors_to_array3(descriptors)?.to_pyarray_bound(py);

    if is_f32 {
        let result_f32 = result_f64.call_method1("astype", (numpy::dtype_bound::<f32>(py),))?;
        Ok(result_f32.into())
    } else {
        Ok(result_f64.into())
    }
}

/// Sign-preserving cube root, for building reference values in Python.
#[pyfunction]
#[pyo3(name = "signed_cbrt")]
fn signed_cbrt_py(x: f64) -> f64 {
    signed_cbrt(x)
}

// ============================================================================
// MODULE DEFINITION
// ============================================================================

#[pymodule]
fn drid_tools(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute_drid_py, m)?)?;
    m.add_function(wrap_pyfunction!(signed_cbrt_py, m)?)?;
    Ok(())
}
