use gbcd_engine::config::lambert;
use gbcd_engine::io::{load_dataset, save_intensity_png, write_json_file};
use gbcd_engine::lambert::LambertSquares;
use nalgebra::Vector3;
use serde::Serialize;
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
    let config = lambert::load_config(Path::new(&config_path))?;
    let opts = &config.lambert;
    if opts.image_dimension == 0 {
        return Err("lambert.image_dimension must be positive".to_string());
    }

    let dataset = load_dataset(&config.input)?;
    let mut squares = LambertSquares::new(opts.dimension, 1.0)
        .map_err(|e| format!("lambert.dimension: {e}"))?;
    let mut used = 0usize;
    for (normal, &area) in dataset.face_normals.chunks(3).zip(&dataset.face_areas) {
        let n = Vector3::new(normal[0], normal[1], normal[2]);
        let len = n.norm();
        if !len.is_finite() || len == 0.0 {
            continue;
        }
        let weight = if opts.area_weighted { area } else { 1.0 };
        // A boundary plane is seen from both sides.
        for dir in [n / len, -n / len] {
            let sq = squares.projector().square_coord(&dir);
            squares.add_interpolated_value(&sq, weight);
        }
        used += 1;
    }
    squares.normalize_to_mrd();
    let intensity = squares.stereographic_projection(opts.image_dimension);

    save_intensity_png(&intensity, opts.image_dimension, &config.output.image)?;
    println!(
        "Saved boundary-normal pole figure of {} triangles to {}",
        used,
        config.output.image.display()
    );

    if let Some(path) = &config.output.summary_json {
        let summary = NormalPoleFigureSummary {
            triangles: used,
            dimension: opts.dimension,
            image_dimension: opts.image_dimension,
            area_weighted: opts.area_weighted,
            max_mrd: intensity.iter().copied().fold(0.0, f64::max),
        };
        write_json_file(path, &summary)?;
        println!("Summary written to {}", path.display());
    }
    Ok(())
}

fn usage() -> String {
    "Usage: lambert_demo <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NormalPoleFigureSummary {
    triangles: usize,
    dimension: usize,
    image_dimension: usize,
    area_weighted: bool,
    max_mrd: f64,
}
