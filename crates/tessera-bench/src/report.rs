use std::io;
use std::path::Path;

use tessera_core::config::ViewConfig;

use crate::runner::BenchmarkResult;

/// A complete baseline containing results from all scenes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub timestamp: String,
    /// View the walks ran with. Older baselines without it read as the default.
    #[serde(default)]
    pub config: ViewConfig,
    pub results: Vec<BenchmarkResult>,
}

/// Load a baseline from a JSON file. Ok(None) if the file doesn't exist; a
/// file that exists but does not parse is an `InvalidData` error.
pub fn load_baseline(path: &Path) -> io::Result<Option<Baseline>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Save a baseline to a JSON file.
pub fn save_baseline(path: &Path, baseline: &Baseline) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(baseline).map_err(io::Error::other)?;
    std::fs::write(path, json)
}

/// How a scene drifted from its baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum Regression {
    /// Mean frame time grew by more than the threshold, in percent.
    Slower { scene: String, pct: f64 },
    /// Same walk, different streaming work. Walks are seeded, so any change in
    /// load or unload counts means the window logic changed.
    Streaming {
        scene: String,
        loads: (u64, u64),
        unloads: (u64, u64),
    },
}

/// Compare current results against a baseline. Timing regressions need to
/// exceed `threshold_pct`; streaming counts are compared only for runs with the
/// same tick count.
pub fn compare(
    current: &[BenchmarkResult],
    baseline: &Baseline,
    threshold_pct: f64,
) -> Vec<Regression> {
    let mut regressions = Vec::new();

    for result in current {
        let Some(base) = baseline
            .results
            .iter()
            .find(|b| b.scene_name == result.scene_name)
        else {
            continue;
        };

        if base.tick_count == result.tick_count
            && (base.loads != result.loads || base.unloads != result.unloads)
        {
            regressions.push(Regression::Streaming {
                scene: result.scene_name.clone(),
                loads: (base.loads, result.loads),
                unloads: (base.unloads, result.unloads),
            });
        }

        if base.timings.mean_ms > 0.0 {
            let pct = (result.timings.mean_ms - base.timings.mean_ms) / base.timings.mean_ms * 100.0;
            if pct > threshold_pct {
                regressions.push(Regression::Slower {
                    scene: result.scene_name.clone(),
                    pct,
                });
            }
        }
    }

    regressions
}

/// Format results as a markdown summary table.
pub fn format_markdown(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    out.push_str("| Scene | Loads | Unloads | Rebuilds | Saved | Mean (ms) | Median (ms) | P95 (ms) | P99 (ms) | Min (ms) | Max (ms) |\n");
    out.push_str("|-------|-------|---------|----------|-------|-----------|-------------|----------|----------|----------|----------|\n");

    for r in results {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} |\n",
            r.scene_name,
            r.loads,
            r.unloads,
            r.rebuilds,
            r.saved_chunks,
            r.timings.mean_ms,
            r.timings.median_ms,
            r.timings.p95_ms,
            r.timings.p99_ms,
            r.timings.min_ms,
            r.timings.max_ms,
        ));
    }

    out
}

/// Format a comparison report showing regressions.
pub fn format_comparison(regressions: &[Regression], threshold_pct: f64) -> String {
    if regressions.is_empty() {
        return format!(
            "All scenes within {:.0}% threshold with unchanged streaming. No regressions detected.\n",
            threshold_pct
        );
    }

    let mut out = format!("REGRESSIONS DETECTED (>{:.0}% threshold):\n", threshold_pct);
    for regression in regressions {
        match regression {
            Regression::Slower { scene, pct } => {
                out.push_str(&format!("  - {}: +{:.1}%\n", scene, pct));
            }
            Regression::Streaming {
                scene,
                loads,
                unloads,
            } => {
                out.push_str(&format!(
                    "  - {}: loads {} -> {}, unloads {} -> {}\n",
                    scene, loads.0, loads.1, unloads.0, unloads.1
                ));
            }
        }
    }
    out
}
