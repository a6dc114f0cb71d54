//! In-memory trajectory coordinates.
//!
//! Frames are stored frame-major in one flat buffer of `[f64; 3]` points.
//! Reading trajectories from disk is left to the caller.

use crate::error::{DridError, Result};

/// Immutable coordinates of `n_frames` frames with a fixed atom count.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    n_atoms: usize,
    coords: Vec<[f64; 3]>,
}

impl Trajectory {
    /// Build from nested frames. Every frame must have the same atom count.
    pub fn from_frames(frames: &[Vec<[f64; 3]>]) -> Result<Self> {
        let n_atoms = frames.first().map_or(0, |f| f.len());
        let mut coords = Vec::with_capacity(frames.len() * n_atoms);
        for (frame_idx, frame) in frames.iter().enumerate() {
            if frame.len() != n_atoms {
                return Err(DridError::ShapeMismatch(format!(
                    "frame {} has {} atoms, expected {}",
                    frame_idx,
                    frame.len(),
                    n_atoms
                )));
            }
            coords.extend_from_slice(frame);
        }
        Ok(Self { n_atoms, coords })
    }

    /// Build from a flat `x, y, z` buffer of shape `(n_frames, n_atoms, 3)`.
    pub fn from_flat(n_atoms: usize, xyz: &[f64]) -> Result<Self> {
        if n_atoms == 0 {
            if !xyz.is_empty() {
                return Err(DridError::ShapeMismatch(
                    "coordinates given for a system with 0 atoms".to_string(),
                ));
            }
            return Ok(Self {
                n_atoms,
                coords: Vec::new(),
            });
        }
        if xyz.len() % (n_atoms * 3) != 0 {
            return Err(DridError::ShapeMismatch(format!(
                "{} values is not a whole number of frames of {} atoms",
                xyz.len(),
                n_atoms
            )));
        }
        let coords = xyz.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Ok(Self { n_atoms, coords })
    }

    /// A trajectory with a single frame.
    pub fn from_frame(frame: Vec<[f64; 3]>) -> Self {
        Self {
            n_atoms: frame.len(),
            coords: frame,
        }
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    pub fn n_frames(&self) -> usize {
        if self.n_atoms == 0 {
            0
        } else {
            self.coords.len() / self.n_atoms
        }
    }

    /// Coordinates of one frame.
    #[inline]
    pub fn frame(&self, index: usize) -> &[[f64; 3]] {
        &self.coords[index * self.n_atoms..(index + 1) * self.n_atoms]
    }

    /// Iterate over frames in order.
    pub fn frames(
        &self,
    ) -> impl ExactSizeIterator<Item = &[[f64; 3]]> + DoubleEndedIterator + '_ {
        // chunks_exact panics on a zero chunk size
        self.coords.chunks_exact(self.n_atoms.max(1))
    }

    /// All frames as one frame-major slice.
    pub fn as_slice(&self) -> &[[f64; 3]] {
        &self.coords
    }
}
