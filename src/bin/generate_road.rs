//! Road generator binary: drives a simulated observer along an endless road
//! and reports what the pipeline produced.
//!
//! Usage: cargo run --release --bin generate_road -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   JSON road configuration (default: built-in)
//!   --seed <SEED>     Random seed, overrides the config
//!   --points <N>      Sliding window size, overrides the config
//!   --ticks <N>       Observer updates to simulate (default: 2000)
//!   --speed <UNITS>   Observer distance per tick (default: 0.5)
//!   --dump-config     Print the effective configuration as JSON and exit
//!   --no-cap-material Report end caps as drawn with the road material

use std::process::ExitCode;
use std::time::Instant;

use roadgen::road::{RoadConfig, RoadStream};

fn main() -> ExitCode {
    roadgen::core::logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> roadgen::core::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => RoadConfig::load(path)?,
        None => RoadConfig::default(),
    };
    if let Some(seed) = parse_u64_arg(&args, "--seed") {
        config.seed = Some(seed);
    }
    if let Some(points) = parse_usize_arg(&args, "--points") {
        config.max_points = points;
    }
    config.validate()?;

    if args.iter().any(|a| a == "--dump-config") {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    let ticks = parse_usize_arg(&args, "--ticks").unwrap_or(2000);
    let speed = parse_f32_arg(&args, "--speed").unwrap_or(0.5);
    let has_cap_material = !args.iter().any(|a| a == "--no-cap-material");

    println!("=== Road Generator ===");
    println!("Seed:   {:?}", config.seed);
    println!("Window: {} points, step {}", config.max_points, config.generator.step_size);
    println!("Ticks:  {} at {} units/tick", ticks, speed);
    println!();

    let start = Instant::now();
    let mut stream = RoadStream::from_config(config)?;
    let mut observer_distance = stream.checkpoint_distance();
    let mut extensions = 0usize;
    let mut rebuild_time = std::time::Duration::ZERO;

    for _ in 0..ticks {
        observer_distance += speed;
        let observer = stream.path().point_at_distance(observer_distance)?;

        let before = Instant::now();
        if stream.update_observer(observer)? {
            extensions += 1;
            rebuild_time += before.elapsed();
            // The window slid forward under the observer
            observer_distance = stream.path().closest_distance_along_path(observer)?;
        }
    }

    let mesh = stream.mesh();
    let pose = stream.checkpoint_pose()?;

    println!("=== Generation Complete ===");
    println!("Points generated: {}", stream.points_generated());
    println!("Segments sampled: {}", stream.generator().segments_started());
    if let Some(segment) = stream.generator().active_segment() {
        println!("Active segment:   {:.0}% of {:.1}", segment.progress() * 100.0, segment.total_length);
    }
    println!("Extensions:       {} ({:.1} us avg rebuild)",
        extensions,
        if extensions > 0 { rebuild_time.as_secs_f64() * 1e6 / extensions as f64 } else { 0.0 });
    println!("Window length:    {:.1}", stream.path().total_length()?);
    println!("Mesh:             {} vertices, {} triangles, caps {}",
        mesh.vertex_count(), mesh.total_triangle_count(), if mesh.has_caps() { "on" } else { "off" });
    println!("Vertex upload:    {} bytes", mesh.vertex_bytes().len());
    for (submesh, slot) in mesh.submeshes.iter().zip(mesh.material_slots(has_cap_material)) {
        println!("  {:?}: {} triangles ({:?})", submesh.kind, submesh.triangle_count(), slot);
    }
    println!("Bounds:           center {:?}, size {:?}", mesh.bounds.center(), mesh.bounds.size());
    println!("Checkpoint:       {:?} facing {:?}", pose.position, pose.forward);
    println!("Elapsed:          {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
