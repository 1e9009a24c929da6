// Copyright 2020 TwoCookingMice

use canestra::core::error::RadiosityResult;
use canestra::core::pattern::Pattern;
use canestra::core::rng::Sampler;
use canestra::core::scene::Scene;
use canestra::core::settings::SimulationSettings;
use canestra::emitters::directional::DirectionalLight;
use canestra::integrators::radiosity::{RadiosityIntegrator, RadiosityReport};
use canestra::materials::lambertian_diffuse::LambertianDiffuse;
use canestra::math::constants::{Float, Vector3f, PI};
use canestra::shapes::triangle::Triangle;
use canestra::solvers::SolverKind;

use std::env;
use std::sync::Arc;

const LEAF_COUNT: usize = 24;

const SOIL_HALF_WIDTH: Float = 5.0;

/// Settings plus whether the demo scene repeats periodically.
fn parse_settings(args: &[String]) -> (SimulationSettings, bool) {
    let mut settings = SimulationSettings { show_progress: true, ..Default::default() };
    let mut toric = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--samples" => {
                i += 1;
                if let Some(v) = args.get(i).and_then(|v| v.parse::<usize>().ok()) {
                    settings.samples_per_face = v;
                }
            }
            "--seed" => {
                i += 1;
                settings.seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
            }
            "--solver" => {
                i += 1;
                match args.get(i).map(|v| v.parse::<SolverKind>()) {
                    Some(Ok(kind)) => settings.solver = kind,
                    Some(Err(e)) => log::warn!("{}, keeping {}.", e, settings.solver),
                    None => {}
                }
            }
            "--tol" => {
                i += 1;
                if let Some(v) = args.get(i).and_then(|v| v.parse::<Float>().ok()) {
                    settings.tolerance = v;
                }
            }
            "--max-iter" => {
                i += 1;
                if let Some(v) = args.get(i).and_then(|v| v.parse::<usize>().ok()) {
                    settings.max_iterations = v;
                }
            }
            "--leaf" => {
                i += 1;
                if let Some(v) = args.get(i).and_then(|v| v.parse::<usize>().ok()) {
                    settings.bsp.max_leaf_size = v;
                }
            }
            "--depth" => {
                i += 1;
                if let Some(v) = args.get(i).and_then(|v| v.parse::<usize>().ok()) {
                    settings.bsp.max_depth = v;
                }
            }
            "--direct-only" => settings.direct_only = true,
            "--toric" => toric = true,
            other => log::warn!("Ignoring unknown argument {}.", other),
        }
        i += 1;
    }

    (settings, toric)
}

/// Soil plane under a loose canopy of translucent leaves, with one sensor
/// halfway up.
fn build_demo_scene(seed: u64) -> RadiosityResult<Scene> {
    let mut scene = Scene::new();
    let soil = Arc::new(LambertianDiffuse::opaque(0.15)?);
    let upper = Arc::new(LambertianDiffuse::new(0.08, 0.05)?);
    let lower = Arc::new(LambertianDiffuse::new(0.12, 0.05)?);

    let half = SOIL_HALF_WIDTH;
    let corners = [
        Vector3f::new(-half, -half, 0.0),
        Vector3f::new(half, -half, 0.0),
        Vector3f::new(half, half, 0.0),
        Vector3f::new(-half, half, 0.0),
    ];
    scene.add_opaque(Box::new(Triangle::new(corners[0], corners[1], corners[2], 0)?), soil.clone());
    scene.add_opaque(Box::new(Triangle::new(corners[0], corners[2], corners[3], 0)?), soil);

    let mut sampler = Sampler::new(seed);
    for leaf in 0..LEAF_COUNT {
        let centre = Vector3f::new(6.0 * sampler.next_float() - 3.0,
                                   6.0 * sampler.next_float() - 3.0,
                                   0.5 + 1.5 * sampler.next_float());
        let heading = 2.0 * PI * sampler.next_float();
        let tilt = 0.5 * PI * sampler.next_float();
        let along = Vector3f::new(heading.cos(), heading.sin(), 0.0);
        let across = Vector3f::new(-heading.sin() * tilt.cos(), heading.cos() * tilt.cos(), tilt.sin());

        let tip = centre + along * 0.4;
        let left = centre - along * 0.2 + across * 0.25;
        let right = centre - along * 0.2 - across * 0.25;
        scene.add_translucent(Box::new(Triangle::new(tip, left, right, 1 + leaf as u64)?),
                              upper.clone(),
                              lower.clone());
    }

    scene.add_sensor(Box::new(Triangle::new(Vector3f::new(-1.0, -1.0, 0.3),
                                            Vector3f::new(1.0, -1.0, 0.3),
                                            Vector3f::new(0.0, 1.0, 0.3),
                                            1000)?),
                     None);
    Ok(scene)
}

fn log_report(report: &RadiosityReport) {
    for face in &report.faces {
        log::info!("diffuser {:3} (name {:4}) {:?}: E = {:9.4}, B = {:9.4}, absorbed = {:9.4}",
                   face.diffuser, face.name, face.face,
                   face.incident_irradiance, face.radiosity, face.absorbed);
    }
    for sensor in &report.sensors {
        log::info!("sensor {} (name {}): E = {:.4}", sensor.diffuser, sensor.name, sensor.irradiance);
    }
    log::info!("Total absorbed: {:.4} ({} iterations, converged: {}).",
               report.total_absorbed(), report.iterations, report.converged);
}

fn run(settings: SimulationSettings, toric: bool) -> RadiosityResult<()> {
    let mut scene = build_demo_scene(settings.seed)?;
    if toric {
        let half = SOIL_HALF_WIDTH;
        scene.set_pattern(Some(Pattern::new(-half, -half, half, half)?));
    }
    log::info!("Demo scene: {} diffusers, {} faces.", scene.len(), scene.face_count());

    let elevation = PI / 3.0;
    let sun = DirectionalLight::new(Vector3f::new(elevation.cos(), 0.0, -elevation.sin()), 500.0)?;
    let report = RadiosityIntegrator::new(settings).run(&mut scene, &[sun])?;
    log_report(&report);
    Ok(())
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let (settings, toric) = parse_settings(&args);

    if let Err(e) = run(settings, toric) {
        log::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}
