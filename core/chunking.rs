use crate::error::{AppError, Result};
use crate::reader::FILE_MARKER;

/// Splits the assembled output text into segments of at most `max_lines`
/// lines without ever cutting a file record in two. Blocks are delimited by
/// the record marker lines; any text before the first marker (the structure
/// summary) forms an implicit zeroth block. A block that alone exceeds the
/// budget flushes the pending segment and becomes its own oversized segment;
/// that is the one permitted budget violation. Concatenating the returned
/// segments reproduces the input exactly.
pub fn split_into_segments(content: &str, max_lines: usize) -> Result<Vec<String>> {
    if max_lines == 0 {
        return Err(AppError::Chunking(
            "Maximum lines per segment must be greater than 0".to_string(),
        ));
    }
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let marker_indices: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.starts_with(FILE_MARKER))
        .map(|(i, _)| i)
        .collect();

    // Block ranges over `lines`: the zeroth block (if any), then one block
    // per marker running up to the next marker.
    let mut blocks: Vec<(usize, usize)> = Vec::with_capacity(marker_indices.len() + 1);
    let first_marker = marker_indices.first().copied().unwrap_or(lines.len());
    if first_marker > 0 {
        blocks.push((0, first_marker));
    }
    for (i, &start) in marker_indices.iter().enumerate() {
        let end = marker_indices
            .get(i + 1)
            .copied()
            .unwrap_or(lines.len());
        blocks.push((start, end));
    }

    let mut segments: Vec<String> = Vec::new();
    let mut pending: String = String::new();
    let mut pending_lines: usize = 0;

    for (start, end) in blocks {
        let block_lines = end - start;
        if block_lines == 0 {
            continue;
        }

        if block_lines > max_lines {
            log::trace!(
                "Block of {} lines exceeds budget of {}, emitting as its own segment.",
                block_lines,
                max_lines
            );
            if pending_lines > 0 {
                segments.push(std::mem::take(&mut pending));
                pending_lines = 0;
            }
            segments.push(lines[start..end].concat());
            continue;
        }

        if pending_lines > 0 && pending_lines + block_lines > max_lines {
            segments.push(std::mem::take(&mut pending));
            pending_lines = 0;
        }

        pending.push_str(&lines[start..end].concat());
        pending_lines += block_lines;
    }

    if pending_lines > 0 {
        segments.push(pending);
    }

    log::debug!("Split content into {} segments.", segments.len());
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, lines: usize) -> String {
        // A record of `lines` lines total: marker, blank, content, blank,
        // separator.
        let body_lines = lines.checked_sub(4).expect("record needs >= 4 lines");
        let body: String = (0..body_lines)
            .map(|i| format!("line {}\n", i))
            .collect();
        format!(">>>File: {}\n\n{}\n\n", path, body.trim_end_matches('\n'))
            + &"=".repeat(40)
            + "\n"
    }

    fn line_count(s: &str) -> usize {
        s.split_inclusive('\n').count()
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(split_into_segments("", 10).unwrap().is_empty());
    }

    #[test]
    fn zero_budget_is_an_error() {
        assert!(split_into_segments("x\n", 0).is_err());
    }

    #[test]
    fn concatenation_is_lossless() {
        let content = format!(
            "summary line 1\nsummary line 2\n\n{}{}{}",
            record("a.rs", 10),
            record("b.rs", 10),
            record("c.rs", 10)
        );
        for budget in [1, 5, 12, 100] {
            let segments = split_into_segments(&content, budget).unwrap();
            assert_eq!(segments.concat(), content, "budget {}", budget);
        }
    }

    #[test]
    fn lossless_without_trailing_newline() {
        let content = "no markers here\njust text without terminator";
        let segments = split_into_segments(content, 1).unwrap();
        assert_eq!(segments.concat(), content);
    }

    #[test]
    fn greedy_packing_groups_whole_records() {
        let content: String = (0..10).map(|i| record(&format!("f{}.rs", i), 100)).collect();
        let segments = split_into_segments(&content, 250).unwrap();
        // 10 records of 100 lines at a budget of 250: two per segment.
        assert_eq!(segments.len(), 5);
        for segment in &segments {
            assert_eq!(line_count(segment), 200);
            assert!(line_count(segment) <= 250);
        }
        assert_eq!(segments.concat(), content);
    }

    #[test]
    fn no_boundary_falls_inside_a_record() {
        let content: String = (0..7).map(|i| record(&format!("f{}.rs", i), 30)).collect();
        let segments = split_into_segments(&content, 70).unwrap();
        for segment in &segments {
            // Every segment starts at a record boundary and every marker
            // inside it is followed by its full record.
            assert!(segment.starts_with(FILE_MARKER));
            let markers = segment.matches(FILE_MARKER).count();
            assert_eq!(line_count(segment), markers * 30);
        }
    }

    #[test]
    fn oversized_record_becomes_isolated_segment() {
        let content = format!(
            "{}{}{}",
            record("small1.rs", 50),
            record("huge.rs", 5000),
            record("small2.rs", 50)
        );
        let segments = split_into_segments(&content, 1000).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(line_count(&segments[1]), 5000);
        assert!(segments[1].starts_with(">>>File: huge.rs"));
        assert_eq!(line_count(&segments[0]), 50);
        assert_eq!(line_count(&segments[2]), 50);
    }

    #[test]
    fn summary_forms_the_zeroth_block() {
        let content = format!("structure\nsummary\n\n{}", record("a.rs", 10));
        let segments = split_into_segments(&content, 10).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], "structure\nsummary\n\n");
        assert!(segments[1].starts_with(FILE_MARKER));
    }
}
