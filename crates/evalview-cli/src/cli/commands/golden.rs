use std::path::Path;

use evalview_core::config::EvalViewConfig;
use evalview_core::golden::GoldenStore;
use evalview_core::trace::RunRecord;

use crate::cli::args::{GoldenArgs, GoldenSub};
use crate::exit_codes::{INTERNAL_ERROR, SUCCESS};

pub fn run(args: GoldenArgs, config_path: &Path) -> anyhow::Result<i32> {
    let cfg = EvalViewConfig::load_or_default(config_path)?;
    let store = GoldenStore::new(&cfg.golden_dir);

    match args.cmd {
        GoldenSub::Bless(args) => {
            let record = RunRecord::from_file(&args.run)?;
            let blessed_by = args
                .by
                .or_else(|| std::env::var("USER").ok())
                .unwrap_or_else(|| "unknown".to_string());
            let path = store.save(
                &record,
                &blessed_by,
                args.notes,
                args.variant.as_deref(),
            )?;
            println!(
                "blessed '{}' (score {:.1}) -> {}",
                record.test_name,
                record.score,
                path.display()
            );
            Ok(SUCCESS)
        }

        GoldenSub::List => {
            let goldens = store.list()?;
            if goldens.is_empty() {
                println!("no goldens in {}", store.dir().display());
                return Ok(SUCCESS);
            }
            for meta in goldens {
                let variants = store.count_variants(&meta.test_name);
                println!(
                    "{}  score {:.1}  blessed {} by {}  variants {}",
                    meta.test_name,
                    meta.score,
                    meta.blessed_at.format("%Y-%m-%d"),
                    meta.blessed_by,
                    variants
                );
            }
            Ok(SUCCESS)
        }

        GoldenSub::Show(args) => {
            let Some(golden) = store.load(&args.test, args.variant.as_deref())? else {
                eprintln!("no golden found for '{}'", args.test);
                return Ok(INTERNAL_ERROR);
            };
            let meta = &golden.metadata;
            println!("test:        {}", meta.test_name);
            println!("blessed at:  {}", meta.blessed_at.to_rfc3339());
            println!("blessed by:  {}", meta.blessed_by);
            println!("score:       {:.1}", meta.score);
            if let Some(model) = &meta.model {
                let provider = model.provider.as_deref().unwrap_or("-");
                println!("model:       {} ({})", model.model, provider);
            }
            if let Some(notes) = &meta.notes {
                println!("notes:       {notes}");
            }
            println!("tools:       {}", golden.tool_sequence.join(" -> "));
            println!("output hash: {}", golden.output_hash);
            Ok(SUCCESS)
        }

        GoldenSub::Delete(args) => {
            if store.delete(&args.test, args.variant.as_deref())? {
                println!("deleted golden for '{}'", args.test);
            } else {
                println!("nothing to delete for '{}'", args.test);
            }
            Ok(SUCCESS)
        }
    }
}
