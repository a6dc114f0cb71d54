//! DRID (distribution of reciprocal interatomic distances) descriptors.
//!
//! For every atom of every frame the descriptor is `[mean, std, third]` of
//! the reciprocal distances from that atom to every other atom it is not
//! bonded to, where `std` is the population standard deviation and `third`
//! is the sign-preserving cube root of the third central moment.
//!
//! Frames are independent of each other, so they are processed in parallel
//! with rayon. Each worker keeps one `n_atoms x n_atoms` reciprocal buffer
//! and reuses it for every frame it handles.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use rayon::prelude::*;

use crate::bonds::BondSet;
use crate::error::{DridError, Result};
use crate::moments::Moments;
use crate::trajectory::Trajectory;
use crate::util::reciprocal_distance;

/// Number of descriptor components per atom.
pub const N_COMPONENTS: usize = 3;

/// What to do with an atom that is bonded to every other atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyRowPolicy {
    /// Emit NaN for that atom and compute everything else normally.
    #[default]
    Nan,
    /// Reject the whole computation.
    Error,
}

/// How work is split across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Single thread.
    Serial,
    /// One frame per task.
    Frames,
    /// Frames in order, atoms of each frame in parallel.
    Atoms,
    /// `Frames` for multi-frame input, `Atoms` for a single frame.
    #[default]
    Auto,
}

/// Configuration for [`DridEngine`].
#[derive(Debug, Clone, Default)]
pub struct DridConfig {
    /// Restrict the computation to these atoms. Distances are then taken
    /// only among the selected atoms and the output follows this order.
    pub atom_indices: Option<Vec<usize>>,
    /// Handling of atoms with no unexcluded neighbors.
    pub empty_row_policy: EmptyRowPolicy,
    pub parallelism: Parallelism,
}

/// Descriptor array of shape `(n_frames, n_atoms, 3)`, frame-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptors {
    n_frames: usize,
    n_atoms: usize,
    data: Vec<f64>,
    empty_rows: Vec<usize>,
}

impl Descriptors {
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Number of atoms in the output (the selection size when a subset was
    /// requested).
    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    /// `(n_frames, n_atoms, 3)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_frames, self.n_atoms, N_COMPONENTS)
    }

    /// `[mean, std, third]` of one atom in one frame.
    #[inline]
    pub fn get(&self, frame: usize, atom: usize) -> [f64; 3] {
        let start = (frame * self.n_atoms + atom) * N_COMPONENTS;
        [self.data[start], self.data[start + 1], self.data[start + 2]]
    }

    /// All descriptors of one frame, atom-major.
    pub fn frame(&self, frame: usize) -> &[f64] {
        let stride = self.n_atoms * N_COMPONENTS;
        &self.data[frame * stride..(frame + 1) * stride]
    }

    /// Output atom positions whose descriptor is NaN because every other
    /// atom is bonded to them.
    pub fn empty_rows(&self) -> &[usize] {
        &self.empty_rows
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

/// Reusable per-worker buffers.
#[derive(Default)]
struct Scratch {
    /// Dense reciprocal distance matrix of the current frame.
    recip: Vec<f64>,
    /// Unexcluded reciprocals of the current atom.
    row: Vec<f64>,
}

/// Validated DRID computation for a fixed atom count and bond set.
#[derive(Debug, Clone)]
pub struct DridEngine {
    n_atoms: usize,
    selection: Option<Vec<usize>>,
    /// Bonds in output indexing.
    bonds: BondSet,
    empty_rows: Vec<usize>,
    parallelism: Parallelism,
}

impl DridEngine {
    /// Validate inputs and prepare an engine for frames of `n_atoms` atoms.
    ///
    /// All preconditions are checked here so that no frame is processed
    /// when any of them fails.
    pub fn new(n_atoms: usize, bonds: &BondSet, config: DridConfig) -> Result<Self> {
        if n_atoms < 2 {
            return Err(DridError::InsufficientAtoms { n_atoms });
        }
        if bonds.n_atoms() != n_atoms {
            return Err(DridError::ShapeMismatch(format!(
                "bond set built for {} atoms, trajectory has {}",
                bonds.n_atoms(),
                n_atoms
            )));
        }

        let (selection, local_bonds) = match config.atom_indices {
            Some(atoms) => {
                let restricted = bonds.restrict(&atoms)?;
                if atoms.len() < 2 {
                    return Err(DridError::InsufficientAtoms {
                        n_atoms: atoms.len(),
                    });
                }
                (Some(atoms), restricted)
            }
            None => (None, bonds.clone()),
        };

        // exclusions are frame independent, so empty rows are known up front
        let empty_rows: Vec<usize> = (0..local_bonds.n_atoms())
            .filter(|&atom| local_bonds.row_len(atom) == 0)
            .collect();

        let to_input = |atom: usize| selection.as_ref().map_or(atom, |sel| sel[atom]);
        if let Some(&atom) = empty_rows.first() {
            match config.empty_row_policy {
                EmptyRowPolicy::Error => {
                    return Err(DridError::EmptyNeighborRow {
                        atom: to_input(atom),
                    })
                }
                EmptyRowPolicy::Nan => {
                    for &atom in &empty_rows {
                        warn!(
                            "atom {} is bonded to every other atom; its DRID descriptor will be NaN",
                            to_input(atom)
                        );
                    }
                }
            }
        }

        debug!(
            "DRID engine: {} input atoms, {} output atoms, {} bonds, {:?}",
            n_atoms,
            local_bonds.n_atoms(),
            local_bonds.len(),
            config.parallelism
        );

        Ok(Self {
            n_atoms,
            selection,
            bonds: local_bonds,
            empty_rows,
            parallelism: config.parallelism,
        })
    }

    /// Atom count expected in every input frame.
    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    /// Atom count of each output frame.
    pub fn n_output_atoms(&self) -> usize {
        self.bonds.n_atoms()
    }

    /// Output positions whose descriptor is NaN.
    pub fn empty_rows(&self) -> &[usize] {
        &self.empty_rows
    }

    /// Compute descriptors for every frame of `trajectory`.
    pub fn compute(&self, trajectory: &Trajectory) -> Result<Descriptors> {
        self.compute_with_cancel(trajectory, &AtomicBool::new(false))
    }

    /// Like [`compute`](Self::compute), checking `cancel` before each frame.
    /// A cancelled run returns [`DridError::Cancelled`] and no descriptors.
    pub fn compute_with_cancel(
        &self,
        trajectory: &Trajectory,
        cancel: &AtomicBool,
    ) -> Result<Descriptors> {
        if trajectory.n_atoms() != self.n_atoms {
            return Err(DridError::ShapeMismatch(format!(
                "trajectory has {} atoms, engine expects {}",
                trajectory.n_atoms(),
                self.n_atoms
            )));
        }

        let n_frames = trajectory.n_frames();
        let n_out = self.n_output_atoms();
        let stride = n_out * N_COMPONENTS;
        let mut data = vec![0.0; n_frames * stride];

        let mode = match self.parallelism {
            Parallelism::Auto if n_frames > 1 => Parallelism::Frames,
            Parallelism::Auto => Parallelism::Atoms,
            mode => mode,
        };
        debug!("computing DRID for {} frames x {} atoms ({:?})", n_frames, n_out, mode);

        let check = |frame: usize| {
            if cancel.load(Ordering::Relaxed) {
                Err(DridError::Cancelled { frame })
            } else {
                Ok(())
            }
        };

        match mode {
            Parallelism::Frames => {
                data.par_chunks_mut(stride)
                    .zip(trajectory.as_slice().par_chunks_exact(self.n_atoms))
                    .enumerate()
                    .try_for_each_init(Scratch::default, |scratch, (f, (out, frame))| {
                        check(f)?;
                        self.frame_serial(frame, scratch, out);
                        Ok(())
                    })?;
            }
            Parallelism::Atoms => {
                let mut scratch = Scratch::default();
                for (f, (out, frame)) in data.chunks_mut(stride).zip(trajectory.frames()).enumerate() {
                    check(f)?;
                    self.frame_atoms_parallel(frame, &mut scratch, out);
                }
            }
            _ => {
                let mut scratch = Scratch::default();
                for (f, (out, frame)) in data.chunks_mut(stride).zip(trajectory.frames()).enumerate() {
                    check(f)?;
                    self.frame_serial(frame, &mut scratch, out);
                }
            }
        }

        Ok(Descriptors {
            n_frames,
            n_atoms: n_out,
            data,
            empty_rows: self.empty_rows.clone(),
        })
    }

    /// Compute one frame into `out`, which must hold
    /// `n_output_atoms() * 3` values. Meant for callers streaming frames
    /// from a reader one at a time.
    pub fn compute_frame(&self, frame: &[[f64; 3]], out: &mut [f64]) -> Result<()> {
        if frame.len() != self.n_atoms {
            return Err(DridError::ShapeMismatch(format!(
                "frame has {} atoms, engine expects {}",
                frame.len(),
                self.n_atoms
            )));
        }
        let expected = self.n_output_atoms() * N_COMPONENTS;
        if out.len() != expected {
            return Err(DridError::ShapeMismatch(format!(
                "output buffer holds {} values, expected {}",
                out.len(),
                expected
            )));
        }

        let mut scratch = Scratch::default();
        match self.parallelism {
            Parallelism::Serial | Parallelism::Frames => self.frame_serial(frame, &mut scratch, out),
            Parallelism::Atoms | Parallelism::Auto => {
                self.frame_atoms_parallel(frame, &mut scratch, out)
            }
        }
        Ok(())
    }

    fn frame_serial(&self, frame: &[[f64; 3]], scratch: &mut Scratch, out: &mut [f64]) {
        self.fill_reciprocals(frame, &mut scratch.recip);
        let n = self.n_output_atoms();
        for (atom, cell) in out.chunks_exact_mut(N_COMPONENTS).enumerate() {
            let recip_row = &scratch.recip[atom * n..(atom + 1) * n];
            cell.copy_from_slice(&self.atom_descriptor(recip_row, atom, &mut scratch.row));
        }
    }

    fn frame_atoms_parallel(&self, frame: &[[f64; 3]], scratch: &mut Scratch, out: &mut [f64]) {
        self.fill_reciprocals(frame, &mut scratch.recip);
        let n = self.n_output_atoms();
        let recip = &scratch.recip;
        out.par_chunks_exact_mut(N_COMPONENTS)
            .enumerate()
            .for_each_init(
                || Vec::with_capacity(n),
                |row, (atom, cell)| {
                    let recip_row = &recip[atom * n..(atom + 1) * n];
                    cell.copy_from_slice(&self.atom_descriptor(recip_row, atom, row));
                },
            );
    }

    /// Dense symmetric reciprocal distance matrix of the selected atoms.
    /// Each unordered pair is computed once and mirrored; the diagonal is
    /// never read.
    fn fill_reciprocals(&self, frame: &[[f64; 3]], recip: &mut Vec<f64>) {
        let n = self.n_output_atoms();
        recip.clear();
        recip.resize(n * n, 0.0);

        let position = |k: usize| match &self.selection {
            Some(sel) => &frame[sel[k]],
            None => &frame[k],
        };

        for i in 0..n {
            let pi = position(i);
            for j in (i + 1)..n {
                let r = reciprocal_distance(pi, position(j));
                recip[i * n + j] = r;
                recip[j * n + i] = r;
            }
        }
    }

    /// Moments of `atom`'s row, skipping itself and its bonded partners.
    fn atom_descriptor(&self, recip_row: &[f64], atom: usize, row: &mut Vec<f64>) -> [f64; 3] {
        collect_row(recip_row, atom, self.bonds.partners(atom), row);
        Moments::from_values(row)
            .unwrap_or(Moments::NAN)
            .to_array()
    }
}

/// Copy the unexcluded entries of `recip_row` into `row`. `partners` is
/// sorted, so exclusions are consumed in a single merge walk.
fn collect_row(recip_row: &[f64], atom: usize, partners: &[usize], row: &mut Vec<f64>) {
    row.clear();
    let mut excluded = partners.iter().copied().peekable();
    for (j, &r) in recip_row.iter().enumerate() {
        if j == atom {
            continue;
        }
        if excluded.peek() == Some(&j) {
            excluded.next();
            continue;
        }
        row.push(r);
    }
}

/// Compute DRID descriptors for every atom of every frame with the default
/// configuration.
pub fn compute_drid(trajectory: &Trajectory, bonds: &BondSet) -> Result<Descriptors> {
    DridEngine::new(trajectory.n_atoms(), bonds, DridConfig::default())?.compute(trajectory)
}
