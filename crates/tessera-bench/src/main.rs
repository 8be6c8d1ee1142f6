use std::path::PathBuf;
use std::process;

use tessera_bench::report;
use tessera_bench::runner::BenchmarkRunner;
use tessera_bench::scenes;
use tessera_core::config::ViewConfig;
use tessera_core::constants::DEFAULT_UNITS_PER_VOXEL;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut regression_threshold = 10.0f64;
    let mut tick_count = 120u32;
    let mut seed = 42u64;
    let mut units_per_voxel = DEFAULT_UNITS_PER_VOXEL;
    let mut background = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(PathBuf::from(value(&args, i, "--config")));
            }
            "--baseline" => {
                i += 1;
                baseline_path = Some(PathBuf::from(value(&args, i, "--baseline")));
            }
            "--output" => {
                i += 1;
                output_path = Some(PathBuf::from(value(&args, i, "--output")));
            }
            "--regression-threshold" => {
                i += 1;
                regression_threshold = parse(&args, i, "--regression-threshold");
            }
            "--ticks" => {
                i += 1;
                tick_count = parse(&args, i, "--ticks");
            }
            "--seed" => {
                i += 1;
                seed = parse(&args, i, "--seed");
            }
            "--units-per-voxel" => {
                i += 1;
                units_per_voxel = parse(&args, i, "--units-per-voxel");
            }
            "--background" => background = true,
            "--help" | "-h" => {
                eprintln!("Usage: walk-runner [OPTIONS]");
                eprintln!("  --config <path>                View config in RON");
                eprintln!("  --baseline <path>              Load baseline JSON for comparison");
                eprintln!("  --output <path>                Save current results as JSON baseline");
                eprintln!(
                    "  --regression-threshold <pct>   Regression threshold percentage (default: 10)"
                );
                eprintln!("  --ticks <n>                    Ticks per scene (default: 120)");
                eprintln!("  --seed <n>                     Terrain seed (default: 42)");
                eprintln!("  --units-per-voxel <f>          Camera units per voxel (default: 1)");
                eprintln!("  --background                   Generate chunks on worker threads");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(ref path) => {
            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(err) => {
                    eprintln!("Failed to read {}: {}", path.display(), err);
                    process::exit(1);
                }
            };
            match ViewConfig::from_ron_str(&text) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("Invalid config {}: {}", path.display(), err);
                    process::exit(1);
                }
            }
        }
        None => ViewConfig::default(),
    };

    if units_per_voxel <= 0.0 {
        eprintln!("--units-per-voxel must be positive");
        process::exit(1);
    }

    let runner = BenchmarkRunner::new(config.clone(), tick_count, seed, units_per_voxel)
        .with_background(background);

    let mut results = Vec::new();
    for scene in &scenes::standard_scenes() {
        results.push(runner.run_scene(scene));
    }

    println!("\n## Walk Results\n");
    println!("{}", report::format_markdown(&results));

    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            timestamp: run_stamp(),
            config: config.clone(),
            results: results.clone(),
        };
        if let Err(err) = report::save_baseline(path, &baseline) {
            eprintln!("Failed to save baseline {}: {}", path.display(), err);
            process::exit(1);
        }
        log::info!("Saved baseline to {}", path.display());
    }

    if let Some(ref path) = baseline_path {
        match report::load_baseline(path) {
            Ok(Some(baseline)) => {
                if baseline.config != config {
                    log::warn!(
                        "Baseline {} was recorded with a different view config: {:?}",
                        path.display(),
                        baseline.config
                    );
                }
                let regressions = report::compare(&results, &baseline, regression_threshold);
                println!(
                    "{}",
                    report::format_comparison(&regressions, regression_threshold)
                );
                if !regressions.is_empty() {
                    eprintln!(
                        "ERROR: {} regressions detected, exiting with code 1",
                        regressions.len()
                    );
                    process::exit(1);
                }
            }
            Ok(None) => log::warn!("Baseline file not found: {}", path.display()),
            Err(err) => {
                eprintln!("Failed to read baseline {}: {}", path.display(), err);
                process::exit(1);
            }
        }
    }

    log::info!("Walk benchmark complete.");
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v,
        None => {
            eprintln!("Missing value for {}", flag);
            process::exit(1);
        }
    }
}

fn parse<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match value(args, i, flag).parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Invalid {} value", flag);
            process::exit(1);
        }
    }
}

fn run_stamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("bench-{}", secs)
}
