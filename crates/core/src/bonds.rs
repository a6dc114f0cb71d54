//! Bonded-pair exclusion set.
//!
//! Bonds are stored as a sorted exclusion list per atom rather than a dense
//! `n_atoms x n_atoms` mask, so sparse topologies with many atoms stay cheap.

use rustc_hash::FxHashSet;

use crate::error::{DridError, Result};

/// Symmetric set of covalent bonds whose reciprocal distances are excluded
/// from both atoms' rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondSet {
    n_atoms: usize,
    /// `partners[i]` holds the atoms bonded to `i`, sorted, no repeats.
    partners: Vec<Vec<usize>>,
    n_bonds: usize,
}

impl BondSet {
    /// Build a bond set for a system of `n_atoms` atoms.
    ///
    /// Pairs are unordered: `(a, b)` and `(b, a)` are the same bond, and
    /// repeats are dropped. A pair referencing an atom outside
    /// `[0, n_atoms)` rejects the whole set, as does a self pair.
    pub fn new(n_atoms: usize, pairs: &[(usize, usize)]) -> Result<Self> {
        let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
        let mut partners = vec![Vec::new(); n_atoms];

        for &(a, b) in pairs {
            if a >= n_atoms || b >= n_atoms {
                return Err(DridError::InvalidBondIndex { a, b, n_atoms });
            }
            if a == b {
                return Err(DridError::SelfBond { atom: a });
            }
            let key = if a < b { (a, b) } else { (b, a) };
            if seen.insert(key) {
                partners[a].push(b);
                partners[b].push(a);
            }
        }

        for list in partners.iter_mut() {
            list.sort_unstable();
        }

        Ok(Self {
            n_atoms,
            partners,
            n_bonds: seen.len(),
        })
    }

    /// A bond set with no bonds.
    pub fn empty(n_atoms: usize) -> Self {
        Self {
            n_atoms,
            partners: vec![Vec::new(); n_atoms],
            n_bonds: 0,
        }
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    /// Number of distinct bonds.
    pub fn len(&self) -> usize {
        self.n_bonds
    }

    pub fn is_empty(&self) -> bool {
        self.n_bonds == 0
    }

    /// Sorted bonded partners of `atom`.
    #[inline]
    pub fn partners(&self, atom: usize) -> &[usize] {
        &self.partners[atom]
    }

    /// Whether `a` and `b` are bonded, in either order.
    #[inline]
    pub fn contains(&self, a: usize, b: usize) -> bool {
        a < self.n_atoms && b < self.n_atoms && self.partners[a].binary_search(&b).is_ok()
    }

    /// Distinct bonds as `(low, high)` pairs in ascending order.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(self.n_bonds);
        for (a, list) in self.partners.iter().enumerate() {
            out.extend(list.iter().filter(|&&b| b > a).map(|&b| (a, b)));
        }
        out
    }

    /// Number of atoms left in `atom`'s row once itself and its bonded
    /// partners are excluded.
    #[inline]
    pub fn row_len(&self, atom: usize) -> usize {
        self.n_atoms - 1 - self.partners[atom].len()
    }

    /// Remap onto an atom subset. `atoms[k]` becomes atom `k` of the result;
    /// bonds touching an atom outside the subset are dropped.
    ///
    /// `atoms` must hold distinct, in-range indices.
    pub fn restrict(&self, atoms: &[usize]) -> Result<BondSet> {
        let mut local = vec![usize::MAX; self.n_atoms];
        for (k, &atom) in atoms.iter().enumerate() {
            if atom >= self.n_atoms {
                return Err(DridError::InvalidAtomIndex {
                    index: atom,
                    n_atoms: self.n_atoms,
                });
            }
            if local[atom] != usize::MAX {
                return Err(DridError::DuplicateAtomIndex { index: atom });
            }
            local[atom] = k;
        }

        let remapped: Vec<(usize, usize)> = self
            .pairs()
            .into_iter()
            .filter_map(|(a, b)| {
                let (la, lb) = (local[a], local[b]);
                (la != usize::MAX && lb != usize::MAX).then_some((la, lb))
            })
            .collect();

        BondSet::new(atoms.len(), &remapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_membership() {
        let bonds = BondSet::new(4, &[(0, 1), (2, 3)]).unwrap();
        assert!(bonds.contains(0, 1));
        assert!(bonds.contains(1, 0));
        assert!(bonds.contains(3, 2));
        assert!(!bonds.contains(0, 2));
        assert!(!bonds.contains(0, 0));
        assert!(!bonds.contains(0, 99));
    }

    #[test]
    fn test_duplicates_are_merged() {
        let bonds = BondSet::new(3, &[(0, 1), (1, 0), (0, 1), (1, 2)]).unwrap();
        assert_eq!(bonds.len(), 2);
        assert_eq!(bonds.partners(1), &[0, 2]);
        assert_eq!(bonds.pairs(), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_pair_order_does_not_matter() {
        let a = BondSet::new(5, &[(0, 3), (4, 1)]).unwrap();
        let b = BondSet::new(5, &[(3, 0), (1, 4)]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = BondSet::new(3, &[(0, 1), (1, 3)]).unwrap_err();
        assert_eq!(err, DridError::InvalidBondIndex { a: 1, b: 3, n_atoms: 3 });
    }

    #[test]
    fn test_self_bond_rejected() {
        let err = BondSet::new(3, &[(2, 2)]).unwrap_err();
        assert_eq!(err, DridError::SelfBond { atom: 2 });
    }

    #[test]
    fn test_row_len() {
        let bonds = BondSet::new(4, &[(0, 1), (0, 2), (0, 3)]).unwrap();
        assert_eq!(bonds.row_len(0), 0);
        assert_eq!(bonds.row_len(1), 2);
        assert!(BondSet::empty(4).is_empty());
        assert_eq!(BondSet::empty(4).row_len(2), 3);
    }

    #[test]
    fn test_restrict() {
        let bonds = BondSet::new(5, &[(0, 1), (1, 2), (3, 4)]).unwrap();
        // keep atoms 4, 1, 2 -> local 0, 1, 2
        let sub = bonds.restrict(&[4, 1, 2]).unwrap();
        assert_eq!(sub.n_atoms(), 3);
        assert_eq!(sub.pairs(), vec![(1, 2)]);
    }

    #[test]
    fn test_restrict_rejects_bad_selection() {
        let bonds = BondSet::empty(3);
        assert_eq!(
            bonds.restrict(&[0, 3]).unwrap_err(),
            DridError::InvalidAtomIndex { index: 3, n_atoms: 3 }
        );
        assert_eq!(
            bonds.restrict(&[1, 1]).unwrap_err(),
            DridError::DuplicateAtomIndex { index: 1 }
        );
    }
}
