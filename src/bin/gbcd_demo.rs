use gbcd_engine::config::gbcd;
use gbcd_engine::diagnostics::GbcdReport;
use gbcd_engine::io::{load_dataset, save_intensity_png, write_json_file};
use gbcd_engine::pole_figure::gbcd_pole_figure;
use gbcd_engine::{GbcdEngine, GbcdResult};
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = gbcd::load_config(Path::new(&config_path))?;

    let dataset = load_dataset(&config.input)?;
    let engine = GbcdEngine::new(config.gbcd.to_params());
    let result = engine
        .compute(dataset.as_input())
        .map_err(|e| format!("GBCD computation failed: {e}"))?;
    print_text_summary(&result);

    let mut report = GbcdReport::new(&result, config.output.include_histogram);
    if let Some(pf) = &config.pole_figure {
        let figure = gbcd_pole_figure(&result, pf.phase, &pf.params)
            .map_err(|e| format!("Pole figure failed: {e}"))?;
        if let Some(path) = &config.output.pole_figure_image {
            save_intensity_png(&figure.intensity, figure.dimension, path)?;
            println!(
                "Saved pole figure ({:.1}° about {:?}, max {:.3} MRD) to {}",
                figure.angle_deg,
                figure.axis,
                figure.max_intensity,
                path.display()
            );
        }
        report = report.with_pole_figure(figure);
    }

    write_json_file(&config.output.result_json, &report)?;
    println!("JSON report written to {}", config.output.result_json.display());
    Ok(())
}

fn usage() -> String {
    "Usage: gbcd_demo <config.json>".to_string()
}

fn print_text_summary(result: &GbcdResult) {
    let diag = &result.diagnostics;
    println!("GBCD summary");
    println!(
        "  resolution: {}° ({:?})  sizes: {:?}",
        result.layout.resolution_deg, result.layout.domain, result.layout.sizes
    );
    println!(
        "  triangles: {} reduced / {} total  (skipped: {:?})",
        diag.triangles_reduced, diag.triangles_total, diag.skipped
    );
    println!(
        "  candidates: {} binned, {} out of range",
        diag.candidates_accepted, diag.candidates_out_of_range
    );
    println!(
        "  chunks: {} ({} parallel)  total_ms: {:.3}",
        diag.chunks, diag.parallel_chunks, diag.timings.total_ms
    );
    for phase in result.phases.iter().filter(|p| p.family.is_some()) {
        println!(
            "  phase {}: {:?} area N/S = {:.4}/{:.4} max MRD = {:.3}",
            phase.phase,
            phase.family,
            phase.hemisphere_area[0],
            phase.hemisphere_area[1],
            phase.max_value()
        );
    }
}
