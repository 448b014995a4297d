use crate::cli::{CompareArgs, MergeArgs, StatsArgs};
use crate::compare::{compare_entries, CompareOptions};
use crate::entry::LogEntry;
use crate::filter::filter_entries;
use crate::formatter;
use crate::merge::{merge_entries, FollowState, MergeOptions};
use crate::parser::{GenericLogParser, LogParser};
use crate::reader;
use crate::stats::{compute_stats, StatsOptions, StatsSummary};
use anyhow::{bail, Result};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Poll interval for the live merge loop.
const MERGE_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Poll interval for the live stats loop.
const STATS_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub fn run_stats(args: &StatsArgs) -> Result<()> {
    let parser = GenericLogParser;
    let entries = read_all(&args.files, &parser)?;

    if entries.is_empty() {
        println!("No log entries found in the specified files");
        return Ok(());
    }

    let entries = apply_only_filter(entries, args.only.as_deref());

    let options = StatsOptions {
        group_by: args.group_by,
        top_n: args.top.unwrap_or(10),
        patterns: args.patterns.clone(),
    };

    let stats = compute_stats(&entries, &options);
    println!("{}", render_stats(&stats, args, &options)?);

    if args.follow {
        println!("\n--- Following files for new entries (Ctrl+C to stop) ---");
        follow_stats(args, &options, stats)?;
    }

    Ok(())
}

pub fn run_compare(args: &CompareArgs) -> Result<()> {
    let parser = GenericLogParser;
    let entries_a = apply_only_filter(
        reader::read_entries(&args.file1, &parser)?,
        args.only.as_deref(),
    );
    let entries_b = apply_only_filter(
        reader::read_entries(&args.file2, &parser)?,
        args.only.as_deref(),
    );

    let options = CompareOptions {
        ignore_timestamps: args.ignore_timestamps,
        fuzzy: args.fuzzy,
    };
    let result = compare_entries(&entries_a, &entries_b, &options);

    if args.json {
        println!("{}", formatter::format_comparison_json(&result)?);
    } else {
        let color = args.color && atty::is(atty::Stream::Stdout);
        println!(
            "{}",
            formatter::format_comparison_text(&result, args.summary, color)
        );
    }

    Ok(())
}

pub fn run_merge(args: &MergeArgs) -> Result<()> {
    if args.files.len() < 2 {
        bail!("at least two files are required for merging");
    }

    if args.follow {
        for file in &args.files {
            if reader::is_compressed(file)? {
                bail!("cannot follow compressed file: {}", file);
            }
        }
        return follow_merge(args);
    }

    let parser = GenericLogParser;
    let streams = args
        .files
        .iter()
        .map(|file| reader::read_entries(file, &parser))
        .collect::<Result<Vec<_>>>()?;

    let options = MergeOptions {
        deduplicate: args.deduplicate,
        tag_source: args.tag,
    };
    let merged = merge_entries(streams, &options);

    match &args.output {
        Some(path) => {
            let mut out = File::create(path)?;
            for entry in merged {
                writeln!(
                    out,
                    "{}",
                    formatter::format_entry_line(&entry, args.normalize_timestamps)
                )?;
            }
            out.flush()?;
            println!("Merged {} files into {}", args.files.len(), path);
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for entry in merged {
                writeln!(
                    out,
                    "{}",
                    formatter::format_entry_line(&entry, args.normalize_timestamps)
                )?;
            }
        }
    }

    Ok(())
}

/// Live merge: poll the files, emit only newly appended entries, keep
/// going until interrupted. Pre-existing content is skipped.
fn follow_merge(args: &MergeArgs) -> Result<()> {
    let parser = GenericLogParser;
    let running = cancellation_flag()?;

    eprintln!(
        "Following {} files for new entries (Ctrl+C to stop)...",
        args.files.len()
    );

    // Baselines at loop start: current entry count per file
    let mut initial_counts = FxHashMap::default();
    for file in &args.files {
        let count = match reader::read_entries(file, &parser) {
            Ok(entries) => entries.len(),
            Err(err) => {
                eprintln!("Warning: error reading {}: {}", file, err);
                0
            }
        };
        initial_counts.insert(file.clone(), count);
    }

    let options = MergeOptions {
        deduplicate: args.deduplicate,
        tag_source: args.tag,
    };
    let mut state = FollowState::new(initial_counts, options);

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    while running.load(Ordering::SeqCst) {
        let mut batch: Vec<LogEntry> = Vec::new();

        for file in &args.files {
            match reader::read_entries(file, &parser) {
                Ok(entries) => batch.extend(state.collect_new(file, entries)),
                Err(err) => eprintln!("Warning: error reading {}: {}", file, err),
            }
        }

        if !batch.is_empty() {
            FollowState::sort_batch(&mut batch);
            for entry in &batch {
                writeln!(out, "{}", formatter::format_entry_line(entry, false))?;
            }
            out.flush()?;
        }

        std::thread::sleep(MERGE_POLL_INTERVAL);
    }

    out.flush()?;
    Ok(())
}

/// Live stats: recompute over the full files each tick and repaint
/// when the summary changes.
fn follow_stats(args: &StatsArgs, options: &StatsOptions, initial: StatsSummary) -> Result<()> {
    let parser = GenericLogParser;
    let running = cancellation_flag()?;
    let mut last_stats = initial;

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(STATS_POLL_INTERVAL);

        let entries = match read_all(&args.files, &parser) {
            Ok(entries) => entries,
            Err(err) => {
                eprintln!("Warning: {}", err);
                continue;
            }
        };
        let entries = apply_only_filter(entries, args.only.as_deref());
        let stats = compute_stats(&entries, options);

        if stats != last_stats {
            // Clear screen and repaint
            print!("\x1b[2J\x1b[H");
            println!(
                "Last updated: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            );
            println!("{}", render_stats(&stats, args, options)?);
            io::stdout().flush()?;
            last_stats = stats;
        }
    }

    Ok(())
}

fn render_stats(stats: &StatsSummary, args: &StatsArgs, options: &StatsOptions) -> Result<String> {
    if args.json {
        return formatter::format_stats_json(stats);
    }
    if args.csv {
        return formatter::format_stats_csv(stats);
    }

    let mut sections = formatter::StatsSections {
        levels: args.levels,
        patterns: !options.patterns.is_empty(),
        time_groups: options.group_by.is_some(),
        top: args.top.is_some(),
    };
    // No explicit section flags: show everything
    if !sections.levels && !sections.patterns && !sections.time_groups && !sections.top {
        sections = formatter::StatsSections::all();
    }
    // With a level filter active, top messages add no information
    if args.only.is_some() {
        sections.top = false;
    }

    let color = atty::is(atty::Stream::Stdout);
    Ok(formatter::format_stats_text(stats, sections, color))
}

fn read_all(files: &[String], parser: &dyn LogParser) -> Result<Vec<LogEntry>> {
    let mut entries = Vec::new();
    for file in files {
        entries.extend(reader::read_entries(file, parser)?);
    }
    Ok(entries)
}

fn apply_only_filter(entries: Vec<LogEntry>, only: Option<&str>) -> Vec<LogEntry> {
    match only {
        Some(level) => filter_entries(entries.into_iter(), Some(level), &[]).collect(),
        None => entries,
    }
}

/// Flag flipped to false by the interrupt handler; loops poll it and
/// exit cleanly so output handles get flushed.
fn cancellation_flag() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    })?;
    Ok(running)
}
