use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use similar::{ChangeTag, TextDiff};

use crate::cli::Options;
use crate::comment::{supported_extension, Markers};
use crate::scanner::scan_dir;
use crate::utils::{is_probably_binary, read_text_best_effort, write_atomic};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterState {
    Normal,
    InBlockComment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Keep,
    Drop,
}

#[derive(Default, Debug)]
pub struct LineStats {
    pub kept: usize,
    pub removed: usize,
}

#[derive(Debug)]
pub struct Filtered {
    pub output: String,
    pub stats: LineStats,
}

#[derive(Default, Debug)]
pub struct Counters {
    pub changed: usize,
    pub unchanged: usize,
    pub skipped_unsupported: usize,
    pub skipped_binary: usize,
    pub skipped_large: usize,
    pub lines_kept: usize,
    pub lines_removed: usize,
}

// Pattern checks run on the trimmed line; the caller emits the original.
pub fn classify_line(
    state: FilterState,
    line: &str,
    markers: &Markers,
) -> (FilterState, Disposition) {
    let trimmed = line.trim();
    let has_open = trimmed.contains(markers.block_open.as_str());
    let has_close = trimmed.contains(markers.block_close.as_str());

    // An open marker without its close on the same line starts a block span.
    if has_open && !has_close {
        return (FilterState::InBlockComment, Disposition::Drop);
    }
    if has_close && state == FilterState::InBlockComment {
        return (FilterState::Normal, Disposition::Drop);
    }
    if state == FilterState::InBlockComment {
        return (state, Disposition::Drop);
    }
    // Whitelist wins over the comment prefixes.
    if markers.is_whitelisted(trimmed) {
        return (state, Disposition::Keep);
    }
    if markers.is_comment_prefix(trimmed) {
        return (state, Disposition::Drop);
    }
    (state, Disposition::Keep)
}

pub fn filter_text(text: &str, markers: &Markers) -> Filtered {
    let mut output = String::with_capacity(text.len());
    let mut stats = LineStats::default();
    let mut state = FilterState::Normal;

    for line in text.split_inclusive('\n') {
        let (next, disposition) = classify_line(state, line, markers);
        state = next;
        match disposition {
            Disposition::Keep => {
                output.push_str(line);
                stats.kept += 1;
            }
            Disposition::Drop => stats.removed += 1,
        }
    }

    Filtered { output, stats }
}

pub fn removal_diff(before: &str, after: &str) -> String {
    let diff = TextDiff::from_lines(before, after);
    let mut out = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "- ",
            ChangeTag::Insert => "+ ",
            ChangeTag::Equal => continue,
        };
        out.push_str(sign);
        out.push_str(change.value());
        if !change.value().ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

enum Destination {
    InPlace,
    Mirror(PathBuf),
}

pub fn run_decomment(
    input: &Path,
    output: Option<&Path>,
    markers: &Markers,
    opts: &Options,
) -> Result<Counters> {
    let mut counters = Counters::default();

    if input.is_dir() {
        let scan = scan_dir(input, &opts.ignore_patterns);
        let mut rels: Vec<PathBuf> = scan.files.keys().cloned().collect();
        rels.sort();

        for rel in &rels {
            let abs = &scan.files[rel];
            if !supported_extension(rel) {
                counters.skipped_unsupported += 1;
                continue;
            }
            let dest = match output {
                Some(out_root) => Destination::Mirror(out_root.join(rel)),
                None => Destination::InPlace,
            };
            process_file(abs, rel, dest, markers, opts, &mut counters)?;
        }
    } else {
        let dest = match output {
            Some(out_path) => Destination::Mirror(out_path.to_path_buf()),
            None => Destination::InPlace,
        };
        // A file named on the command line is processed whatever its
        // extension; eligibility gating only applies to scanned trees.
        process_file(input, input, dest, markers, opts, &mut counters)?;
    }

    Ok(counters)
}

fn process_file(
    abs: &Path,
    shown: &Path,
    dest: Destination,
    markers: &Markers,
    opts: &Options,
    counters: &mut Counters,
) -> Result<()> {
    let size = fs::metadata(abs)
        .with_context(|| format!("Failed to stat {}", abs.display()))?
        .len();
    if size > opts.max_text_size {
        counters.skipped_large += 1;
        return Ok(());
    }
    if is_probably_binary(abs) {
        counters.skipped_binary += 1;
        return Ok(());
    }

    let original = read_text_best_effort(abs, opts.normalize_eol)
        .with_context(|| format!("Failed to read {}", abs.display()))?;
    let filtered = filter_text(&original, markers);
    counters.lines_kept += filtered.stats.kept;
    counters.lines_removed += filtered.stats.removed;

    let same = filtered.output == original;
    if same {
        counters.unchanged += 1;
    } else {
        counters.changed += 1;
    }

    if opts.diff {
        if !same {
            println!("--- {}", shown.display());
            print!("{}", removal_diff(&original, &filtered.output));
        }
        return Ok(());
    }
    if opts.dry_run {
        return Ok(());
    }

    match dest {
        // Files the pass leaves unchanged are never touched in place.
        Destination::InPlace => {
            if !same {
                write_atomic(abs, filtered.output.as_bytes())?;
            }
        }
        Destination::Mirror(dst) => {
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            write_atomic(&dst, filtered.output.as_bytes())?;
        }
    }
    Ok(())
}
