use std::path::Path;

use evalview_core::config::EvalViewConfig;
use evalview_core::drift::DriftTracker;

use crate::cli::args::{DriftArgs, DriftSub};
use crate::exit_codes::{GATE_FAILED, SUCCESS};

pub fn run(args: DriftArgs, config_path: &Path) -> anyhow::Result<i32> {
    let cfg = EvalViewConfig::load_or_default(config_path)?;
    let tracker = DriftTracker::new(&cfg.history_file);

    match args.cmd {
        DriftSub::History(args) => {
            let entries = tracker.get_test_history(&args.test, args.limit);
            if entries.is_empty() {
                println!("no recorded checks for '{}'", args.test);
                return Ok(SUCCESS);
            }
            for e in entries {
                println!(
                    "{}  {}  score {:+.1}  similarity {:.3}  tool changes {}{}",
                    e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    e.status,
                    e.score_diff,
                    e.output_similarity,
                    e.tool_changes,
                    if e.model_changed { "  (model changed)" } else { "" }
                );
            }
            Ok(SUCCESS)
        }

        DriftSub::Report(args) => {
            match tracker.detect_gradual_drift(&args.test, args.window, args.threshold) {
                Some(warning) => {
                    println!("{warning}");
                    Ok(GATE_FAILED)
                }
                None => {
                    println!(
                        "no gradual drift detected for '{}' (window {}, threshold {})",
                        args.test, args.window, args.threshold
                    );
                    Ok(SUCCESS)
                }
            }
        }
    }
}
