use super::run::GbcdDiagnostics;
use crate::gbcd::{GbcdLayout, GbcdResult, PhaseGbcd};
use crate::pole_figure::GbcdPoleFigure;
use crate::symmetry::CrystalFamily;
use serde::Serialize;

/// Summary of one phase histogram.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseReport {
    pub phase: usize,
    pub crystal_family: Option<CrystalFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laue_group: Option<&'static str>,
    pub dimensions: [usize; 5],
    pub hemisphere_area: [f64; 2],
    pub mrd_factor: [f64; 2],
    pub max_mrd: f64,
    pub nonzero_bins: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
}

impl PhaseReport {
    pub fn from_phase(phase: &PhaseGbcd, layout: &GbcdLayout, include_values: bool) -> Self {
        Self {
            phase: phase.phase,
            crystal_family: phase.family,
            laue_group: phase.family.map(CrystalFamily::laue_symbol),
            dimensions: layout.sizes,
            hemisphere_area: phase.hemisphere_area,
            mrd_factor: phase.mrd_factor,
            max_mrd: phase.max_value(),
            nonzero_bins: phase.values.iter().filter(|&&v| v > 0.0).count(),
            values: include_values.then(|| phase.values.clone()),
        }
    }
}

/// JSON document written by the demo tool.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GbcdReport {
    pub layout: GbcdLayout,
    pub phases: Vec<PhaseReport>,
    pub diagnostics: GbcdDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pole_figure: Option<GbcdPoleFigure>,
}

impl GbcdReport {
    pub fn new(result: &GbcdResult, include_values: bool) -> Self {
        Self {
            layout: result.layout.clone(),
            phases: result
                .phases
                .iter()
                .map(|p| PhaseReport::from_phase(p, &result.layout, include_values))
                .collect(),
            diagnostics: result.diagnostics.clone(),
            pole_figure: None,
        }
    }

    pub fn with_pole_figure(mut self, pole_figure: GbcdPoleFigure) -> Self {
        self.pole_figure = Some(pole_figure);
        self
    }
}
