//! Borrowed views over the boundary mesh and feature/ensemble tables.
//!
//! All per-feature and per-phase arrays reserve index 0: feature label 0 is
//! the "no feature" sentinel and phase 0 is the dummy ensemble entry.
//! [`GbcdInput::validate`] checks strides, label ranges and phase references
//! once so the hot loops can index without further checks.

use crate::error::GbcdError;
use crate::orientation::Orientation;
use crate::symmetry::SymmetryTable;
use nalgebra::Vector3;

/// Read-only inputs of one GBCD run.
#[derive(Clone, Copy, Debug)]
pub struct GbcdInput<'a> {
    /// Feature label pairs, stride 2.
    pub face_labels: &'a [i32],
    /// Unit boundary normals in the sample frame, stride 3.
    pub face_normals: &'a [f64],
    /// Triangle areas, stride 1.
    pub face_areas: &'a [f64],
    /// Average orientation per feature (slot 0 reserved).
    pub feature_orientations: &'a [Orientation],
    /// Phase id per feature (slot 0 reserved).
    pub feature_phases: &'a [i32],
    /// Crystal structure id per phase (slot 0 reserved).
    pub crystal_structures: &'a [u32],
}

impl<'a> GbcdInput<'a> {
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.face_areas.len()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.feature_phases.len()
    }

    #[inline]
    pub fn labels(&self, triangle: usize) -> [i32; 2] {
        [
            self.face_labels[2 * triangle],
            self.face_labels[2 * triangle + 1],
        ]
    }

    #[inline]
    pub fn normal(&self, triangle: usize) -> Vector3<f64> {
        let n = &self.face_normals[3 * triangle..3 * triangle + 3];
        Vector3::new(n[0], n[1], n[2])
    }

    #[inline]
    pub fn area(&self, triangle: usize) -> f64 {
        self.face_areas[triangle]
    }

    #[inline]
    pub fn orientation(&self, feature: usize) -> &Orientation {
        &self.feature_orientations[feature]
    }

    #[inline]
    pub fn phase(&self, feature: usize) -> i32 {
        self.feature_phases[feature]
    }

    /// Checks the collaborator contract: strides, reserved slots, label and
    /// phase ranges, finite geometry, and a symmetry entry for every phase
    /// that a boundary triangle actually references.
    pub fn validate(&self, symmetry: &SymmetryTable) -> Result<(), GbcdError> {
        let n = self.num_triangles();
        check_stride("face_labels", 2 * n, self.face_labels.len())?;
        check_stride("face_normals", 3 * n, self.face_normals.len())?;
        if self.feature_phases.is_empty() {
            return Err(GbcdError::EmptyFeatureTable);
        }
        check_stride(
            "feature_orientations",
            self.feature_phases.len(),
            self.feature_orientations.len(),
        )?;
        if self.crystal_structures.is_empty() {
            return Err(GbcdError::EmptyEnsembleTable);
        }

        let num_features = self.num_features();
        let mut phase_checked = vec![false; num_features];
        for t in 0..n {
            let area = self.area(t);
            if !area.is_finite() || area < 0.0 {
                return Err(GbcdError::InvalidArea { triangle: t, area });
            }
            if !self.normal(t).iter().all(|c| c.is_finite()) {
                return Err(GbcdError::InvalidNormal { triangle: t });
            }
            for label in self.labels(t) {
                if label < 0 || label as usize >= num_features {
                    return Err(GbcdError::LabelOutOfRange {
                        triangle: t,
                        label,
                        num_features,
                    });
                }
                let feature = label as usize;
                if feature == 0 || phase_checked[feature] {
                    continue;
                }
                self.check_feature_phase(feature, symmetry)?;
                phase_checked[feature] = true;
            }
        }
        Ok(())
    }

    fn check_feature_phase(&self, feature: usize, symmetry: &SymmetryTable) -> Result<(), GbcdError> {
        let phase = self.phase(feature);
        let num_phases = symmetry.num_phases();
        if phase < 0 || phase as usize >= num_phases {
            return Err(GbcdError::PhaseOutOfRange {
                feature,
                phase,
                num_phases,
            });
        }
        let phase = phase as usize;
        if phase > 0 && symmetry.family(phase).is_none() {
            return Err(GbcdError::MissingSymmetry {
                phase,
                crystal_structure: self.crystal_structures[phase],
            });
        }
        Ok(())
    }
}

fn check_stride(array: &'static str, expected: usize, found: usize) -> Result<(), GbcdError> {
    if expected != found {
        return Err(GbcdError::StrideMismatch {
            array,
            expected,
            found,
        });
    }
    Ok(())
}

/// Owned counterpart of [`GbcdInput`], e.g. as loaded from disk.
#[derive(Clone, Debug, Default)]
pub struct GbcdDataset {
    pub face_labels: Vec<i32>,
    pub face_normals: Vec<f64>,
    pub face_areas: Vec<f64>,
    pub feature_orientations: Vec<Orientation>,
    pub feature_phases: Vec<i32>,
    pub crystal_structures: Vec<u32>,
}

impl GbcdDataset {
    pub fn as_input(&self) -> GbcdInput<'_> {
        GbcdInput {
            face_labels: &self.face_labels,
            face_normals: &self.face_normals,
            face_areas: &self.face_areas,
            feature_orientations: &self.feature_orientations,
            feature_phases: &self.feature_phases,
            crystal_structures: &self.crystal_structures,
        }
    }

    /// Appends a boundary triangle.
    pub fn push_triangle(&mut self, labels: [i32; 2], normal: [f64; 3], area: f64) {
        self.face_labels.extend_from_slice(&labels);
        self.face_normals.extend_from_slice(&normal);
        self.face_areas.push(area);
    }

    pub fn num_triangles(&self) -> usize {
        self.face_areas.len()
    }
}
