use anyhow::{Context, Result};
use clap::Parser;

use decomment::{build_options, run_decomment, Args, Markers};

fn main() -> Result<()> {
    let args = Args::parse();

    let input = args.input.canonicalize().context("Invalid input path")?;

    if let Some(output) = &args.output {
        if output.exists() {
            let out_abs = output.canonicalize()?;
            if out_abs == input || out_abs.starts_with(&input) {
                anyhow::bail!("output cannot be inside the input nor be equal to it.");
            }
        }
    }

    let opts = build_options(&args)?;
    let markers = Markers::default();

    let counters = run_decomment(&input, args.output.as_deref(), &markers, &opts)?;

    println!("== decomment: Summary ==");
    if opts.dry_run || opts.diff {
        println!("Would change:         {}", counters.changed);
    } else {
        println!("Changed:              {}", counters.changed);
    }
    println!("Unchanged:            {}", counters.unchanged);
    println!("Skipped (extension):  {}", counters.skipped_unsupported);
    println!("Skipped (binary):     {}", counters.skipped_binary);
    println!("Skipped (too large):  {}", counters.skipped_large);
    println!("Lines removed:        {}", counters.lines_removed);
    println!("Lines kept:           {}", counters.lines_kept);
    if let Some(output) = &args.output {
        if !opts.dry_run && !opts.diff {
            println!("Output at:            {:?}", output);
        }
    }

    Ok(())
}
