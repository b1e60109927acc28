//! Exit-code contract of the `evalview` binary: 0 on pass, 1 when the
//! severity gate trips, 2 when no comparison could be produced.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn write_config(dir: &Path) -> std::path::PathBuf {
    let config = dir.join("evalview.yaml");
    let golden_dir = dir.join("golden");
    let history = dir.join("history.jsonl");
    std::fs::write(
        &config,
        format!(
            "golden_dir: {}\nhistory_file: {}\n",
            golden_dir.display(),
            history.display()
        ),
    )
    .unwrap();
    config
}

fn write_run(dir: &Path, name: &str, tools: &[&str], output: &str, score: f64) -> std::path::PathBuf {
    let steps: Vec<serde_json::Value> = tools
        .iter()
        .enumerate()
        .map(|(i, tool)| {
            serde_json::json!({
                "step_id": format!("s{i}"),
                "tool_name": tool,
                "parameters": {},
                "output": null,
                "success": true,
                "latency_ms": 25.0
            })
        })
        .collect();
    let record = serde_json::json!({
        "test_name": "weather-lookup",
        "trace": {
            "session_id": "sess-cli",
            "started_at": "2026-08-01T10:00:00Z",
            "completed_at": "2026-08-01T10:00:02Z",
            "steps": steps,
            "final_output": output,
            "total_cost": 0.003,
            "total_latency_ms": 2000.0
        },
        "score": score
    });
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(&record).unwrap()).unwrap();
    path
}

fn evalview(config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_evalview"))
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("binary runs")
}

#[test]
fn bless_then_clean_check_exits_zero() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    let run = write_run(
        tmp.path(),
        "run.json",
        &["geocode", "fetch_weather"],
        "Sunny, 72°F",
        92.0,
    );

    let bless = evalview(&config, &["golden", "bless", "--run", run.to_str().unwrap()]);
    assert!(bless.status.success(), "bless failed: {bless:?}");

    let check = evalview(&config, &["check", "--run", run.to_str().unwrap()]);
    assert_eq!(check.status.code(), Some(0), "check output: {check:?}");
}

#[test]
fn tool_change_trips_the_default_gate() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    let golden_run = write_run(
        tmp.path(),
        "golden.json",
        &["geocode", "fetch_weather"],
        "Sunny, 72°F",
        92.0,
    );
    evalview(&config, &["golden", "bless", "--run", golden_run.to_str().unwrap()]);

    let drifted = write_run(
        tmp.path(),
        "drifted.json",
        &["geocode", "search_web"],
        "Sunny, 72°F",
        92.0,
    );
    let check = evalview(&config, &["check", "--run", drifted.to_str().unwrap()]);
    assert_eq!(check.status.code(), Some(1));

    // The same result passes when the gate only fires on regressions.
    let lenient = evalview(
        &config,
        &[
            "check",
            "--run",
            drifted.to_str().unwrap(),
            "--fail-on",
            "regression",
        ],
    );
    assert_eq!(lenient.status.code(), Some(0));
}

#[test]
fn missing_golden_exits_two() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    let run = write_run(tmp.path(), "run.json", &["geocode"], "Sunny", 90.0);

    let check = evalview(&config, &["check", "--run", run.to_str().unwrap()]);
    assert_eq!(check.status.code(), Some(2));
}

#[test]
fn json_format_emits_a_parsable_diff() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path());
    let run = write_run(tmp.path(), "run.json", &["geocode"], "Sunny", 90.0);
    evalview(&config, &["golden", "bless", "--run", run.to_str().unwrap()]);

    let check = evalview(
        &config,
        &["check", "--run", run.to_str().unwrap(), "--format", "json"],
    );
    assert_eq!(check.status.code(), Some(0));
    let diff: serde_json::Value = serde_json::from_slice(&check.stdout).unwrap();
    assert_eq!(diff["status"], "passed");
    assert_eq!(diff["matched_variant"], "default");
}
