use std::path::Path;

use evalview_core::config::EvalViewConfig;
use evalview_core::diff::DiffEngine;
use evalview_core::drift::{DriftTracker, DEFAULT_DRIFT_WINDOW, DEFAULT_SLOPE_THRESHOLD};
use evalview_core::golden::GoldenStore;
use evalview_core::report;
use evalview_core::trace::RunRecord;

use crate::cli::args::{CheckArgs, OutputFormat};
use crate::exit_codes::{GATE_FAILED, INTERNAL_ERROR, SUCCESS};

pub fn run(args: CheckArgs, config_path: &Path) -> anyhow::Result<i32> {
    let cfg = EvalViewConfig::load_or_default(config_path)?;
    let record = RunRecord::from_file(&args.run)?;

    let store = GoldenStore::new(&cfg.golden_dir);
    let variants = match args.variant.as_deref() {
        Some(v) => store
            .load(&record.test_name, Some(v))?
            .into_iter()
            .collect(),
        None => store.load_all_variants(&record.test_name)?,
    };
    if variants.is_empty() {
        eprintln!(
            "no golden found for '{}'; bless one first: evalview golden bless --run {}",
            record.test_name,
            args.run.display()
        );
        return Ok(INTERNAL_ERROR);
    }

    let engine = DiffEngine::new(cfg.diff.clone());
    let diff = engine.compare_multi_reference(&variants, &record.trace, record.score)?;
    match args.format {
        OutputFormat::Text => report::print_diff(&diff),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
    }

    if !args.no_history {
        let tracker = DriftTracker::new(&cfg.history_file);
        tracker.record_check(&record.test_name, &diff);
        if let Some(warning) = tracker.detect_gradual_drift(
            &record.test_name,
            DEFAULT_DRIFT_WINDOW,
            DEFAULT_SLOPE_THRESHOLD,
        ) {
            eprintln!("warning: {warning}");
        }
    }

    if args.fail_on.gates(diff.status) {
        Ok(GATE_FAILED)
    } else {
        Ok(SUCCESS)
    }
}
