//! seedprint – command-line print job runner.
//!
//! Usage:
//!   seedprint <job.json> [output.pdf] [--dry-run] [--copies N] [--config engine.json]
//!
//! If `output.pdf` is omitted the PDF is written next to the job file with
//! the same stem (e.g. `order-1042.json` → `order-1042.pdf`). With several
//! copies each pass gets its own file, `order-1042-1.pdf`, `order-1042-2.pdf`, …

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use seedprint::layout_config::EngineConfig;
use seedprint::pipeline::{render_copies, PrintContext, PrintJob, PrintOutcome};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut job_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut dry_run = false;
    let mut copies = 1u32;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dry-run" | "-n" => dry_run = true,
            "--copies" | "-c" => match iter.next().and_then(|v| v.parse::<u32>().ok()) {
                Some(n) if n > 0 => copies = n,
                _ => {
                    eprintln!("--copies needs a positive number");
                    process::exit(1);
                }
            },
            "--config" => match iter.next() {
                Some(v) => config_path = Some(PathBuf::from(v)),
                None => {
                    eprintln!("--config needs a file path");
                    process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    job_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match job_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no job file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    // Configuration is validated before anything is read or printed.
    let config = match &config_path {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    };
    let config = match config.and_then(|c| c.validate().map(|()| c)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let job = match PrintJob::from_json(&json) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let ctx = PrintContext {
        dry_run,
        copies,
        config,
    };

    let outcomes = match render_copies(&job, &ctx) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error printing {}: {e}", job.name());
            process::exit(1);
        }
    };

    // Issues are the same on every pass; report them once.
    if let Some(first) = outcomes.first() {
        report_manifest(first);
    }

    if dry_run {
        for outcome in &outcomes {
            eprintln!(
                "Dry run: {} printed on {} page{}",
                outcome.printed_count,
                outcome.page_count,
                plural(outcome.page_count)
            );
        }
        return;
    }

    let output = output_path.unwrap_or_else(|| {
        let mut o = input.clone();
        o.set_extension("pdf");
        o
    });

    for (i, outcome) in outcomes.iter().enumerate() {
        let path = if outcomes.len() == 1 {
            output.clone()
        } else {
            numbered(&output, i + 1)
        };
        let Some(bytes) = outcome.document.pdf_bytes() else {
            continue;
        };
        // Create output directory if necessary.
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    eprintln!("Error creating output directory: {e}");
                    process::exit(1);
                }
            }
        }
        if let Err(e) = fs::write(&path, bytes) {
            eprintln!("Error writing '{}': {e}", path.display());
            process::exit(1);
        }
        eprintln!(
            "Wrote '{}' ({} bytes, {} printed, {} page{})",
            path.display(),
            bytes.len(),
            outcome.printed_count,
            outcome.page_count,
            plural(outcome.page_count)
        );
    }
}

fn report_manifest(outcome: &PrintOutcome) {
    if outcome.manifest.is_empty() {
        return;
    }
    eprintln!("Manifest ({} entries):", outcome.manifest.entries.len());
    for entry in &outcome.manifest.entries {
        eprintln!("  {}: {}", entry.subject, entry.issue);
    }
}

/// `out.pdf` → `out-2.pdf`
fn numbered(path: &Path, n: usize) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("seedprint");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("pdf");
    path.with_file_name(format!("{stem}-{n}.{ext}"))
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn print_usage(prog: &str) {
    eprintln!("seedprint – packing slips, invoices, pick lists and seed labels");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <job.json> [output.pdf] [--dry-run] [--copies N] [--config engine.json]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <job.json>     Print job; \"kind\" is one of packing_slip, store_invoice, pick_list,");
    eprintln!("                 front_labels, back_labels, germ_label");
    eprintln!("  [output.pdf]   Output path  (default: same stem as the job with .pdf)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --dry-run, -n  Log the drawing calls instead of writing a PDF");
    eprintln!("  --copies, -c   Number of full print passes (default: 1)");
    eprintln!("  --config       Engine configuration JSON (capacities, geometry, logo)");
    eprintln!("  --help         Print this message");
    eprintln!();
    eprintln!("Set RUST_LOG=info to see job progress.");
}
