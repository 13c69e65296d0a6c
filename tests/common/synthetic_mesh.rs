use gbcd_engine::{GbcdDataset, Orientation};
use std::f64::consts::{PI, TAU};

pub const UNKNOWN: u32 = 999;
pub const CUBIC_HIGH: u32 = 1;
pub const ORTHORHOMBIC: u32 = 6;

/// Small deterministic generator so fixtures are reproducible.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed ^ 0x9E37_79B9_7F4A_7C15)
    }

    /// Uniform value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn next_index(&mut self, n: usize) -> usize {
        ((self.next_f64() * n as f64) as usize).min(n - 1)
    }

    pub fn unit_vector(&mut self) -> [f64; 3] {
        let z = 2.0 * self.next_f64() - 1.0;
        let phi = TAU * self.next_f64();
        let r = (1.0 - z * z).max(0.0).sqrt();
        [r * phi.cos(), r * phi.sin(), z]
    }

    /// Uniformly distributed orientation.
    pub fn orientation(&mut self) -> Orientation {
        let phi1 = TAU * self.next_f64();
        let big_phi = (2.0 * self.next_f64() - 1.0).acos();
        let phi2 = TAU * self.next_f64();
        Orientation::from_bunge_euler(phi1, big_phi, phi2)
    }
}

/// Roughly uniform unit normals on a Fibonacci spiral.
pub fn fibonacci_normals(n: usize) -> Vec<[f64; 3]> {
    let golden = PI * (3.0 - 5.0f64.sqrt());
    (0..n)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - z * z).sqrt();
            let theta = golden * i as f64;
            [r * theta.cos(), r * theta.sin(), z]
        })
        .collect()
}

/// Two grains of one phase sharing a boundary with the given normals.
pub fn bicrystal(
    g1: Orientation,
    g2: Orientation,
    crystal_structure: u32,
    normals: &[[f64; 3]],
    area: f64,
) -> GbcdDataset {
    let mut ds = GbcdDataset {
        feature_orientations: vec![Orientation::identity(), g1, g2],
        feature_phases: vec![0, 1, 1],
        crystal_structures: vec![UNKNOWN, crystal_structure],
        ..Default::default()
    };
    for n in normals {
        ds.push_triangle([1, 2], *n, area);
    }
    ds
}

/// Random two-phase polycrystal: grains with `index % 3 == 0` are
/// orthorhombic (phase 2), the rest cubic (phase 1). Every 11th triangle
/// touches the sentinel feature 0.
pub fn polycrystal(num_grains: usize, num_triangles: usize, seed: u64) -> GbcdDataset {
    assert!(num_grains >= 2, "need at least two grains");
    let mut rng = Lcg::new(seed);
    let mut ds = GbcdDataset {
        feature_orientations: vec![Orientation::identity()],
        feature_phases: vec![0],
        crystal_structures: vec![UNKNOWN, CUBIC_HIGH, ORTHORHOMBIC],
        ..Default::default()
    };
    for grain in 1..=num_grains {
        ds.feature_orientations.push(rng.orientation());
        ds.feature_phases.push(if grain % 3 == 0 { 2 } else { 1 });
    }
    for t in 0..num_triangles {
        let a = 1 + rng.next_index(num_grains);
        let mut b = 1 + rng.next_index(num_grains);
        if b == a {
            b = a % num_grains + 1;
        }
        let labels = if t % 11 == 0 { [0, b as i32] } else { [a as i32, b as i32] };
        let area = 0.1 + rng.next_f64();
        let normal = rng.unit_vector();
        ds.push_triangle(labels, normal, area);
    }
    ds
}
