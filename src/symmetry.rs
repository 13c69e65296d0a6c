//! Crystal point-group symmetry operators.
//!
//! Each Laue class is a tag in [`CrystalFamily`]; its proper rotations live in
//! a static quaternion table and are expanded once into rotation matrices.
//! Lookup is a table index, so hot loops only ever see `&'static [Matrix3]`.
//!
//! [`SymmetryTable`] resolves the per-phase crystal structure ids handed over
//! by the ensemble data into families.

use nalgebra::{Matrix3, Quaternion, UnitQuaternion};
use serde::Serialize;
use std::sync::OnceLock;

/// Crystal structure id reserved for "unknown" in EBSD ensemble tables.
pub const UNKNOWN_CRYSTAL_STRUCTURE: u32 = 999;

const R2: f64 = std::f64::consts::FRAC_1_SQRT_2;
const S3_2: f64 = 0.866_025_403_784_438_6;

// Quaternion tables stored as (x, y, z, w).
const CUBIC_HIGH: [[f64; 4]; 24] = [
    [0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [R2, 0.0, 0.0, R2],
    [0.0, R2, 0.0, R2],
    [0.0, 0.0, R2, R2],
    [-R2, 0.0, 0.0, R2],
    [0.0, -R2, 0.0, R2],
    [0.0, 0.0, -R2, R2],
    [R2, R2, 0.0, 0.0],
    [-R2, R2, 0.0, 0.0],
    [0.0, R2, R2, 0.0],
    [0.0, -R2, R2, 0.0],
    [R2, 0.0, R2, 0.0],
    [-R2, 0.0, R2, 0.0],
    [0.5, 0.5, 0.5, 0.5],
    [-0.5, -0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5, 0.5],
    [-0.5, 0.5, -0.5, 0.5],
    [-0.5, 0.5, 0.5, 0.5],
    [0.5, -0.5, -0.5, 0.5],
    [-0.5, -0.5, 0.5, 0.5],
    [0.5, 0.5, -0.5, 0.5],
];

const CUBIC_LOW: [[f64; 4]; 12] = [
    [0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.5, 0.5, 0.5, 0.5],
    [-0.5, -0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5, 0.5],
    [-0.5, 0.5, -0.5, 0.5],
    [-0.5, 0.5, 0.5, 0.5],
    [0.5, -0.5, -0.5, 0.5],
    [-0.5, -0.5, 0.5, 0.5],
    [0.5, 0.5, -0.5, 0.5],
];

const HEXAGONAL_HIGH: [[f64; 4]; 12] = [
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, 0.5, S3_2],
    [0.0, 0.0, S3_2, 0.5],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, S3_2, -0.5],
    [0.0, 0.0, 0.5, -S3_2],
    [1.0, 0.0, 0.0, 0.0],
    [S3_2, 0.5, 0.0, 0.0],
    [0.5, S3_2, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [-0.5, S3_2, 0.0, 0.0],
    [-S3_2, 0.5, 0.0, 0.0],
];

const HEXAGONAL_LOW: [[f64; 4]; 6] = [
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, 0.5, S3_2],
    [0.0, 0.0, S3_2, 0.5],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, S3_2, -0.5],
    [0.0, 0.0, 0.5, -S3_2],
];

const TETRAGONAL_HIGH: [[f64; 4]; 8] = [
    [0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, R2, R2],
    [0.0, 0.0, -R2, R2],
    [R2, R2, 0.0, 0.0],
    [-R2, R2, 0.0, 0.0],
];

const TETRAGONAL_LOW: [[f64; 4]; 4] = [
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, R2, -R2],
    [0.0, 0.0, R2, R2],
];

const TRIGONAL_HIGH: [[f64; 4]; 6] = [
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, S3_2, 0.5],
    [0.0, 0.0, S3_2, -0.5],
    [1.0, 0.0, 0.0, 0.0],
    [-0.5, S3_2, 0.0, 0.0],
    [-0.5, -S3_2, 0.0, 0.0],
];

const TRIGONAL_LOW: [[f64; 4]; 3] = [
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, S3_2, 0.5],
    [0.0, 0.0, S3_2, -0.5],
];

const ORTHORHOMBIC: [[f64; 4]; 4] = [
    [0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
];

const MONOCLINIC: [[f64; 4]; 2] = [[0.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 0.0]];

const TRICLINIC: [[f64; 4]; 1] = [[0.0, 0.0, 0.0, 1.0]];

/// Laue class of a phase. Discriminants follow the EBSD crystal structure ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrystalFamily {
    HexagonalHigh = 0,
    CubicHigh = 1,
    HexagonalLow = 2,
    CubicLow = 3,
    Triclinic = 4,
    Monoclinic = 5,
    Orthorhombic = 6,
    TetragonalLow = 7,
    TetragonalHigh = 8,
    TrigonalLow = 9,
    TrigonalHigh = 10,
}

impl CrystalFamily {
    pub const ALL: [CrystalFamily; 11] = [
        CrystalFamily::HexagonalHigh,
        CrystalFamily::CubicHigh,
        CrystalFamily::HexagonalLow,
        CrystalFamily::CubicLow,
        CrystalFamily::Triclinic,
        CrystalFamily::Monoclinic,
        CrystalFamily::Orthorhombic,
        CrystalFamily::TetragonalLow,
        CrystalFamily::TetragonalHigh,
        CrystalFamily::TrigonalLow,
        CrystalFamily::TrigonalHigh,
    ];

    /// Resolves an EBSD crystal structure id. Returns `None` for unknown ids
    /// (including [`UNKNOWN_CRYSTAL_STRUCTURE`]).
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    #[inline]
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Hermann–Mauguin symbol of the Laue group.
    pub fn laue_symbol(self) -> &'static str {
        match self {
            CrystalFamily::HexagonalHigh => "6/mmm",
            CrystalFamily::CubicHigh => "m-3m",
            CrystalFamily::HexagonalLow => "6/m",
            CrystalFamily::CubicLow => "m-3",
            CrystalFamily::Triclinic => "-1",
            CrystalFamily::Monoclinic => "2/m",
            CrystalFamily::Orthorhombic => "mmm",
            CrystalFamily::TetragonalLow => "4/m",
            CrystalFamily::TetragonalHigh => "4/mmm",
            CrystalFamily::TrigonalLow => "-3",
            CrystalFamily::TrigonalHigh => "-3m",
        }
    }

    fn quaternion_table(self) -> &'static [[f64; 4]] {
        match self {
            CrystalFamily::HexagonalHigh => &HEXAGONAL_HIGH,
            CrystalFamily::CubicHigh => &CUBIC_HIGH,
            CrystalFamily::HexagonalLow => &HEXAGONAL_LOW,
            CrystalFamily::CubicLow => &CUBIC_LOW,
            CrystalFamily::Triclinic => &TRICLINIC,
            CrystalFamily::Monoclinic => &MONOCLINIC,
            CrystalFamily::Orthorhombic => &ORTHORHOMBIC,
            CrystalFamily::TetragonalLow => &TETRAGONAL_LOW,
            CrystalFamily::TetragonalHigh => &TETRAGONAL_HIGH,
            CrystalFamily::TrigonalLow => &TRIGONAL_LOW,
            CrystalFamily::TrigonalHigh => &TRIGONAL_HIGH,
        }
    }

    /// Number of proper rotations in the point group.
    #[inline]
    pub fn num_sym_ops(self) -> usize {
        self.quaternion_table().len()
    }

    /// Symmetry operators as unit quaternions, in table order.
    pub fn quaternions(self) -> impl Iterator<Item = UnitQuaternion<f64>> {
        self.quaternion_table()
            .iter()
            .map(|q| UnitQuaternion::new_normalize(Quaternion::new(q[3], q[0], q[1], q[2])))
    }

    /// Symmetry operators as rotation matrices, in table order.
    pub fn operators(self) -> &'static [Matrix3<f64>] {
        static TABLES: OnceLock<Vec<Vec<Matrix3<f64>>>> = OnceLock::new();
        let tables = TABLES.get_or_init(|| {
            CrystalFamily::ALL
                .iter()
                .map(|family| {
                    family
                        .quaternions()
                        .map(|q| q.to_rotation_matrix().into_inner())
                        .collect()
                })
                .collect()
        });
        &tables[self as usize]
    }
}

/// Per-phase crystal family lookup built from the ensemble crystal structure ids.
///
/// Index 0 is the reserved dummy ensemble entry and never resolves.
#[derive(Clone, Debug)]
pub struct SymmetryTable {
    families: Vec<Option<CrystalFamily>>,
}

impl SymmetryTable {
    pub fn from_crystal_structures(crystal_structures: &[u32]) -> Self {
        let families = crystal_structures
            .iter()
            .enumerate()
            .map(|(phase, &id)| {
                if phase == 0 {
                    None
                } else {
                    CrystalFamily::from_id(id)
                }
            })
            .collect();
        Self { families }
    }

    /// Number of ensemble entries, including the reserved slot 0.
    #[inline]
    pub fn num_phases(&self) -> usize {
        self.families.len()
    }

    #[inline]
    pub fn family(&self, phase: usize) -> Option<CrystalFamily> {
        self.families.get(phase).copied().flatten()
    }

    pub fn operators(&self, phase: usize) -> Option<&'static [Matrix3<f64>]> {
        self.family(phase).map(CrystalFamily::operators)
    }

    /// Largest operator count over all resolved phases (1 when none resolve).
    pub fn max_sym_ops(&self) -> usize {
        self.families
            .iter()
            .flatten()
            .map(|f| f.num_sym_ops())
            .max()
            .unwrap_or(1)
    }
}
