mod common;

use common::init_logging;
use common::synthetic_mesh::{bicrystal, fibonacci_normals, polycrystal, CUBIC_HIGH, ORTHORHOMBIC};
use gbcd_engine::diagnostics::GbcdReport;
use gbcd_engine::lambert::Hemisphere;
use gbcd_engine::pole_figure::{gbcd_pole_figure, PoleFigureParams};
use gbcd_engine::{
    CancelFlag, GbcdEngine, GbcdError, GbcdLayout, GbcdParams, GbcdResult, MisorientationDomain,
    Orientation, ParallelOptions,
};
use nalgebra::Vector3;

fn params(resolution_deg: f64) -> GbcdParams {
    GbcdParams {
        resolution_deg,
        chunk_size: 16,
        parallel: ParallelOptions::disabled(),
        ..Default::default()
    }
}

fn compute(ds: &gbcd_engine::GbcdDataset, params: GbcdParams) -> GbcdResult {
    GbcdEngine::new(params)
        .compute(ds.as_input())
        .expect("GBCD run should succeed")
}

fn approx_rel(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn nine_degree_resolution_layout() {
    let layout = GbcdLayout::from_resolution(9.0, MisorientationDomain::Full).unwrap();
    assert_eq!(layout.sizes, [40, 20, 40, 20, 20]);
    let limit = (std::f64::consts::PI / 2.0).sqrt();
    assert!((layout.upper[3] - limit).abs() < 1e-12);
    assert!((layout.lower[4] + limit).abs() < 1e-12);
}

#[test]
fn dimensions_are_replicated_per_ensemble_entry() {
    init_logging();
    let ds = polycrystal(6, 20, 3);
    let result = compute(&ds, params(30.0));
    assert_eq!(result.phases.len(), 3);
    assert_eq!(result.dimensions(), vec![[12, 6, 12, 6, 6]; 3]);
    assert_eq!(
        result.flat_values().len(),
        3 * result.layout.total_bins()
    );
}

#[test]
fn mass_is_conserved_per_hemisphere() {
    init_logging();
    let ds = polycrystal(12, 150, 7);
    let result = compute(&ds, params(30.0));

    let mut expected_total = 0.0;
    for t in 0..ds.num_triangles() {
        let (a, b) = (ds.face_labels[2 * t], ds.face_labels[2 * t + 1]);
        if a == 0 || b == 0 {
            continue;
        }
        let (pa, pb) = (ds.feature_phases[a as usize], ds.feature_phases[b as usize]);
        if pa != pb {
            continue;
        }
        let nsym = if pa == 1 { 24.0 } else { 4.0 };
        expected_total += ds.face_areas[t] * 4.0 * nsym * nsym;
    }

    let mut total = 0.0;
    for phase in result.phases.iter().skip(1) {
        for h in [Hemisphere::North, Hemisphere::South] {
            let factor = phase.mrd_factor[h.offset()];
            assert!(factor > 0.0, "phase {} has no area", phase.phase);
            let sum: f64 = phase.values.iter().skip(h.offset()).step_by(2).sum();
            assert!(
                approx_rel(sum / factor, phase.hemisphere_area[h.offset()]),
                "phase {} {:?}: {} vs {}",
                phase.phase,
                h,
                sum / factor,
                phase.hemisphere_area[h.offset()]
            );
            total += phase.hemisphere_area[h.offset()];
        }
    }
    assert!(approx_rel(total, expected_total), "{total} vs {expected_total}");
}

#[test]
fn uniform_population_reads_one_mrd_on_average() {
    let ds = polycrystal(9, 60, 11);
    let result = compute(&ds, params(30.0));
    let phase = &result.phases[1];
    let north: f64 = phase.values.iter().step_by(2).sum();
    let mean = north / result.layout.num_bins() as f64;
    assert!((mean - 1.0).abs() < 1e-9, "mean MRD per hemisphere bin {mean}");
}

#[test]
fn swapping_grains_and_negating_normal_is_invariant() {
    let g1 = Orientation::from_bunge_euler(0.4, 1.1, 2.3);
    let g2 = Orientation::from_bunge_euler(3.0, 0.7, 0.9);
    let normals = fibonacci_normals(12);
    let flipped: Vec<[f64; 3]> = normals.iter().map(|n| [-n[0], -n[1], -n[2]]).collect();

    let forward = compute(&bicrystal(g1, g2, CUBIC_HIGH, &normals, 1.0), params(30.0));
    let swapped = compute(&bicrystal(g2, g1, CUBIC_HIGH, &flipped, 1.0), params(30.0));

    let (a, b) = (&forward.phases[1], &swapped.phases[1]);
    assert_eq!(a.hemisphere_area, b.hemisphere_area);
    for (x, y) in a.values.iter().zip(&b.values) {
        assert!((x - y).abs() < 1e-9);
    }
}

#[test]
fn cubic_identical_orientations_fill_identity_cell() {
    let g = Orientation::from_bunge_euler(0.3, 0.4, 0.5);
    let area = 2.0;
    let ds = bicrystal(g, g, CUBIC_HIGH, &[[0.0, 0.6, 0.8]], area);
    let result = compute(&ds, params(30.0));
    let layout = &result.layout;
    let phase = &result.phases[1];

    // 24 operator pairs with j == k, two normals each, two passes.
    let identity_pairs = 24.0 * 2.0 * 2.0;
    let mut identity_raw = 0.0;
    let mut identity_mrd = 0.0;
    for bin in 0..layout.num_bins() {
        let idx = layout.unflatten(bin);
        if idx[0] != 0 || idx[1] != layout.sizes[1] - 1 || idx[2] != 0 {
            continue;
        }
        for h in [Hemisphere::North, Hemisphere::South] {
            identity_raw += phase.raw_value(bin, h);
            identity_mrd += phase.value(bin, h);
        }
    }
    assert!(approx_rel(identity_raw, area * identity_pairs));

    let total_area = phase.hemisphere_area[0] + phase.hemisphere_area[1];
    assert!(approx_rel(total_area, area * 4.0 * 24.0 * 24.0));
    let bins = layout.num_bins() as f64;
    let expected_mrd = bins / phase.hemisphere_area[0] * area * identity_pairs;
    assert!(approx_rel(identity_mrd, expected_mrd), "{identity_mrd} vs {expected_mrd}");
}

#[test]
fn cross_phase_boundaries_contribute_nothing() {
    let mut ds = bicrystal(
        Orientation::from_bunge_euler(0.1, 0.2, 0.3),
        Orientation::from_bunge_euler(1.1, 1.2, 1.3),
        CUBIC_HIGH,
        &fibonacci_normals(5),
        1.0,
    );
    ds.crystal_structures.push(ORTHORHOMBIC);
    ds.feature_phases[2] = 2;

    let result = compute(&ds, params(30.0));
    assert_eq!(result.diagnostics.skipped.cross_phase, 5);
    assert_eq!(result.diagnostics.triangles_reduced, 0);
    for phase in &result.phases {
        assert_eq!(phase.hemisphere_area, [0.0, 0.0]);
        assert!(phase.values.iter().all(|&v| v == 0.0));
    }
}

#[test]
fn sentinel_triangles_are_counted_and_skipped() {
    let ds = polycrystal(5, 44, 2);
    let result = compute(&ds, params(30.0));
    let diag = &result.diagnostics;
    assert_eq!(diag.skipped.sentinel_label, 4);
    assert_eq!(diag.triangles_seen(), 44);
    assert_eq!(diag.triangles_total, 44);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    init_logging();
    let ds = polycrystal(10, 120, 5);
    let sequential = compute(&ds, params(30.0));
    let parallel = compute(
        &ds,
        GbcdParams {
            parallel: ParallelOptions::new(true, 1),
            ..params(30.0)
        },
    );
    if cfg!(feature = "parallel") {
        assert_eq!(parallel.diagnostics.parallel_chunks, parallel.diagnostics.chunks);
    }
    for (a, b) in sequential.phases.iter().zip(&parallel.phases) {
        assert_eq!(a.hemisphere_area, b.hemisphere_area);
        assert_eq!(a.values, b.values);
    }
}

#[test]
fn cubic_reduced_domain_drops_candidates_outside_zone() {
    let ds = bicrystal(
        Orientation::from_bunge_euler(0.2, 0.9, 1.7),
        Orientation::from_bunge_euler(2.5, 0.4, 0.8),
        CUBIC_HIGH,
        &fibonacci_normals(8),
        1.0,
    );
    let result = compute(
        &ds,
        GbcdParams {
            domain: MisorientationDomain::CubicReduced,
            ..params(10.0)
        },
    );
    let diag = &result.diagnostics;
    assert_eq!(result.layout.sizes[..3], [9, 9, 9]);
    assert_eq!(
        diag.candidates_accepted + diag.candidates_out_of_range,
        8 * 4 * 24 * 24
    );
    assert!(diag.candidates_accepted > 0);
    assert!(diag.candidates_out_of_range > diag.candidates_accepted);
}

#[test]
fn cancellation_yields_no_histogram() {
    let ds = polycrystal(4, 30, 1);
    let cancel = CancelFlag::new();
    cancel.cancel();
    let err = GbcdEngine::new(params(30.0))
        .compute_with_cancel(ds.as_input(), &cancel)
        .unwrap_err();
    assert_eq!(err, GbcdError::Cancelled { chunks_completed: 0 });
}

#[test]
fn configuration_errors_are_reported_before_work() {
    let mut ds = polycrystal(4, 10, 9);
    let engine = GbcdEngine::new(params(30.0));

    let bad_resolution = GbcdEngine::new(params(-1.0)).compute(ds.as_input());
    assert!(matches!(bad_resolution, Err(GbcdError::InvalidResolution { .. })));

    // Grain 3 is the first orthorhombic grain.
    ds.push_triangle([1, 3], [0.0, 0.0, 1.0], 1.0);
    ds.crystal_structures[2] = 42;
    assert!(matches!(
        engine.compute(ds.as_input()),
        Err(GbcdError::MissingSymmetry { phase: 2, .. })
    ));
}

#[test]
fn twin_boundary_pole_figure_is_populated() {
    init_logging();
    let axis = Vector3::new(1.0, 1.0, 1.0);
    let twin = Orientation::from_axis_angle(&axis, 60f64.to_radians()).unwrap();
    let g1 = Orientation::from_bunge_euler(0.6, 0.8, 1.9);
    let g2 = Orientation::from_matrix(twin.matrix().transpose() * g1.matrix());
    let ds = bicrystal(g1, g2, CUBIC_HIGH, &fibonacci_normals(200), 1.0);
    let result = compute(&ds, params(30.0));

    let sigma3 = gbcd_pole_figure(
        &result,
        1,
        &PoleFigureParams {
            axis: [1.0, 1.0, 1.0],
            angle_deg: 60.0,
            dimension: 24,
        },
    )
    .unwrap();
    assert_eq!(sigma3.intensity.len(), 24 * 24);
    assert!(sigma3.max_intensity > 0.0);

    let unrelated = gbcd_pole_figure(
        &result,
        1,
        &PoleFigureParams {
            axis: [1.0, 0.0, 0.0],
            angle_deg: 20.0,
            dimension: 24,
        },
    )
    .unwrap();
    let sigma3_total: f64 = sigma3.intensity.iter().sum();
    let unrelated_total: f64 = unrelated.intensity.iter().sum();
    assert!(
        sigma3_total > unrelated_total,
        "{sigma3_total} vs {unrelated_total}"
    );
}

#[test]
fn report_serializes_to_camel_case_json() {
    let ds = polycrystal(5, 12, 4);
    let result = compute(&ds, params(30.0));
    let report = GbcdReport::new(&result, false);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["layout"]["sizes"][0], 12);
    assert_eq!(json["phases"].as_array().unwrap().len(), 3);
    assert_eq!(json["phases"][1]["crystalFamily"], "cubic_high");
    assert!(json["phases"][1].get("values").is_none());
    assert!(json["diagnostics"]["candidatesAccepted"].as_u64().unwrap() > 0);
    assert!(json.get("poleFigure").is_none());
}
