use crate::chunking::split_into_segments;
use crate::config::{CondenseOptions, IGNORE_FILE_NAME};
use crate::error::{AppError, Result};
use crate::gather::{collect_tree, render_structure_summary};
use crate::reader::read_record;
use crate::rules::{ExclusionEngine, load_ignore_file};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of a completed run. Read errors are non-fatal and reported here;
/// configuration and write errors abort the run instead.
#[derive(Debug, Default)]
pub struct CondenseReport {
    pub written_files: Vec<PathBuf>,
    pub included_files: usize,
    pub read_errors: Vec<String>,
}

/// Runs the whole pipeline as one sequential worker: load ignore patterns,
/// collect the tree, read contents, split, write. Progress is reported
/// through the injected callback as human-readable status strings with
/// coarse percentage markers (0 means "no percentage update").
pub fn run_condense(
    options: &CondenseOptions,
    progress: &mut dyn FnMut(&str, u8),
) -> Result<CondenseReport> {
    options.validate()?;

    // The rule set is frozen here; the scan never mutates it afterwards.
    let mut rules = options.rules.clone();
    if rules.use_ignore_file && rules.ignore_patterns.is_empty() {
        if options.root_dir.join(IGNORE_FILE_NAME).is_file() {
            progress("Reading .gitignore...", 0);
            match load_ignore_file(&options.root_dir) {
                Ok(patterns) => {
                    progress(
                        &format!("Loaded {} patterns from .gitignore.", patterns.len()),
                        0,
                    );
                    rules.ignore_patterns = patterns;
                }
                Err(e) => {
                    progress(&format!("Warning: Could not read .gitignore: {}", e), 0);
                }
            }
        } else {
            progress(".gitignore not found.", 0);
        }
    }
    let engine = ExclusionEngine::new(&rules)?;

    progress("Starting directory scan...", 10);
    let tree = collect_tree(&options.root_dir, &engine);

    progress("Processing files...", 30);
    let structure_summary = if options.include_structure || options.structure_only {
        render_structure_summary(&tree)
    } else {
        String::new()
    };

    let mut report = CondenseReport::default();
    let mut combined = structure_summary;

    if !options.structure_only {
        let file_entries: Vec<&str> = tree
            .iter()
            .filter(|e| !e.is_directory)
            .map(|e| e.relative_path.as_str())
            .collect();
        let total = file_entries.len();

        for (i, rel) in file_entries.iter().enumerate() {
            let count = i + 1;
            if count % 20 == 0 {
                let percent = 30 + (count * 40 / total.max(1)) as u8;
                progress(
                    &format!("Processing file {}/{}: {}", count, total, rel),
                    percent,
                );
            }
            let record = read_record(&options.root_dir, rel);
            match &record.read_error {
                None => report.included_files += 1,
                Some(err) => report.read_errors.push(err.clone()),
            }
            combined.push_str(&record.render());
        }
    }

    progress(
        &format!("Scan complete. Included {} files.", report.included_files),
        70,
    );

    if combined.trim().is_empty() && !options.structure_only {
        log::warn!("No text content was found or generated after applying exclusions.");
        return Ok(report);
    }

    progress("Processing finished. Saving results...", 75);
    write_output(options, &combined, &mut report, progress)?;

    Ok(report)
}

fn write_output(
    options: &CondenseOptions,
    content: &str,
    report: &mut CondenseReport,
    progress: &mut dyn FnMut(&str, u8),
) -> Result<()> {
    let (out_dir, stem, ext) = output_name_parts(&options.output_path);
    ensure_output_dir(&out_dir)?;

    if options.chunked {
        progress(
            &format!(
                "Splitting content into chunks (max {} lines each)...",
                options.max_lines
            ),
            0,
        );
        let parts = split_into_segments(content, options.max_lines)?;
        match parts.len() {
            0 => {}
            // A single segment degrades to plain single-file naming.
            1 => {
                let path = out_dir.join(format!("{}{}", stem, ext));
                progress(&format!("Saving single file: {}{}", stem, ext), 0);
                write_text(&path, &parts[0])?;
                report.written_files.push(path);
            }
            total => {
                for (i, part) in parts.iter().enumerate() {
                    let num = i + 1;
                    let filename = if options.structure_only {
                        format!("{}-structure-PART-{}{}", stem, num, ext)
                    } else {
                        format!("{}-PART-{}{}", stem, num, ext)
                    };
                    let percent = 75 + (num * 25 / total) as u8;
                    progress(
                        &format!("Saving chunk {}/{}: {}", num, total, filename),
                        percent,
                    );
                    let path = out_dir.join(filename);
                    write_text(&path, part)?;
                    report.written_files.push(path);
                }
            }
        }
    } else {
        let filename = if options.structure_only {
            format!("{}-structure{}", stem, ext)
        } else {
            format!("{}{}", stem, ext)
        };
        progress(&format!("Saving single file: {}", filename), 0);
        let path = out_dir.join(filename);
        write_text(&path, content)?;
        report.written_files.push(path);
    }

    Ok(())
}

/// Splits the user-supplied output path into directory, stem and extension,
/// defaulting the extension to `.txt` when absent.
fn output_name_parts(output_path: &Path) -> (PathBuf, String, String) {
    let ext = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| ".txt".to_string());
    let stem = output_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string();
    let dir = output_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    (dir, stem, ext)
}

fn ensure_output_dir(dir: &Path) -> Result<()> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| AppError::DirCreation {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    log::info!("Writing output file: {}", path.display());
    fs::write(path, text).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
