use clap::Parser;

use sawmill::cli::{Args, Command};
use sawmill::commands;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match &args.command {
        Command::Stats(stats_args) => commands::run_stats(stats_args),
        Command::Compare(compare_args) => commands::run_compare(compare_args),
        Command::Merge(merge_args) => commands::run_merge(merge_args),
    }
}
