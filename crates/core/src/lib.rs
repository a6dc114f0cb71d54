//! Core library for drid-tools.
//!
//! Pure Rust implementation with no Python dependencies. Computes DRID
//! (distribution of reciprocal interatomic distances) descriptors for every
//! atom of every frame of a molecular dynamics trajectory.
//!
//! ```
//! use drid_core::{compute_drid, BondSet, Trajectory};
//!
//! let traj = Trajectory::from_frame(vec![
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 2.0, 0.0],
//! ]);
//! let bonds = BondSet::new(3, &[(0, 1)]).unwrap();
//! let drid = compute_drid(&traj, &bonds).unwrap();
//! assert_eq!(drid.shape(), (1, 3, 3));
//! assert_eq!(drid.get(0, 0)[0], 0.5);
//! ```

pub mod bonds;
pub mod drid;
pub mod error;
pub mod moments;
pub mod trajectory;
pub mod util;

pub use bonds::BondSet;
pub use drid::{
    compute_drid, Descriptors, DridConfig, DridEngine, EmptyRowPolicy, Parallelism,
};
pub use error::{DridError, Result};
pub use moments::{signed_cbrt, Moments};
pub use trajectory::Trajectory;
