use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Course, Snapshot};

// Course numbers in the catalog export look like FK2.604-A, FK2.664-C etc.
static RE_COURSE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(FK\d\.\d{3}(?:-[A-Z])?)\b").expect("invalid regex: course id")
});

/// A course id match together with its byte offset into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdMatch {
    pub id: String,
    pub start: usize,
}

/// All course id matches in document order, left to right, non-overlapping.
/// Text without a single match yields an empty vec, not an error.
pub fn find_course_ids(text: &str) -> Vec<IdMatch> {
    RE_COURSE_ID
        .find_iter(text)
        .map(|m| IdMatch {
            id: m.as_str().to_string(),
            start: m.start(),
        })
        .collect()
}

/// Cuts the full text into one trimmed block per id match. The block for
/// match i runs from its start offset up to the start of match i+1, the last
/// block up to the end of the text.
pub fn segment_blocks<'a>(text: &'a str, matches: &[IdMatch]) -> Vec<&'a str> {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = matches.get(i + 1).map_or(text.len(), |next| next.start);
            text[m.start..end].trim()
        })
        .collect()
}

/// Best-effort title for one block, scanning at most the first six non-empty
/// lines. A line carrying a course id contributes whatever is left after
/// stripping the ids; a line without one qualifies once it is at least six
/// characters long. Falls back to the empty string, the raw block stays the
/// authoritative record.
pub fn derive_title(block: &str, course_id: &str) -> String {
    let lines = block.lines().map(str::trim).filter(|ln| !ln.is_empty());

    for line in lines.take(6) {
        if RE_COURSE_ID.is_match(line) {
            let rest = RE_COURSE_ID.replace_all(line, "");
            let rest = rest.trim_matches(|c: char| matches!(c, ' ' | '\t' | '-' | '–' | '—'));
            if !rest.is_empty() && !rest.eq_ignore_ascii_case(course_id) {
                return rest.to_string();
            }
            continue;
        }
        if line.chars().count() >= 6 {
            return line.to_string();
        }
    }

    String::new()
}

/// Builds the current record set for a document. A course id that recurs
/// later in the document replaces the earlier occurrence.
pub fn parse_course_list(text: &str) -> Snapshot {
    let matches = find_course_ids(text);
    let blocks = segment_blocks(text, &matches);

    let mut courses = Snapshot::new();
    for (m, block) in matches.iter().zip(&blocks) {
        let title = derive_title(block, &m.id);
        courses.insert(
            m.id.clone(),
            Course {
                course_id: m.id.clone(),
                title,
                raw_text: (*block).to_string(),
            },
        );
    }
    courses
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Volkshochschule Friedrichshain-Kreuzberg
Trefferliste vom 07.08.2026

FK2.604-A Goldschmiede-Einführung
Mo 18:00 - 21:00
Raum 204

FK2.664-C
Kette löten für Fortgeschrittene
Di 19:00 - 21:00
";

    #[test]
    fn finds_ids_in_document_order() {
        let matches = find_course_ids(SAMPLE);
        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["FK2.604-A", "FK2.664-C"]);
        assert!(matches[0].start < matches[1].start);
    }

    #[test]
    fn id_suffix_is_optional() {
        let matches = find_course_ids("FK2.604 und FK2.664-C");
        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["FK2.604", "FK2.664-C"]);
    }

    #[test]
    fn lowercase_prefix_does_not_match() {
        assert!(find_course_ids("fk2.604-a").is_empty());
    }

    #[test]
    fn no_matches_yields_no_blocks() {
        assert!(find_course_ids("").is_empty());
        let matches = find_course_ids("nur Fließtext ohne Kursnummern");
        assert!(segment_blocks("nur Fließtext ohne Kursnummern", &matches).is_empty());
    }

    #[test]
    fn one_block_per_match_in_document_order() {
        let matches = find_course_ids(SAMPLE);
        let blocks = segment_blocks(SAMPLE, &matches);

        assert_eq!(blocks.len(), matches.len());
        assert_eq!(
            blocks[0],
            "FK2.604-A Goldschmiede-Einführung\nMo 18:00 - 21:00\nRaum 204"
        );
        assert_eq!(
            blocks[1],
            "FK2.664-C\nKette löten für Fortgeschrittene\nDi 19:00 - 21:00"
        );
    }

    #[test]
    fn blocks_cover_a_contiguous_subrange() {
        let matches = find_course_ids(SAMPLE);
        // Untrimmed spans between match offsets reassemble the tail of the
        // document exactly.
        let mut reassembled = String::new();
        for (i, m) in matches.iter().enumerate() {
            let end = matches.get(i + 1).map_or(SAMPLE.len(), |next| next.start);
            reassembled.push_str(&SAMPLE[m.start..end]);
        }
        assert_eq!(reassembled, &SAMPLE[matches[0].start..]);
    }

    #[test]
    fn last_block_runs_to_end_of_text() {
        let text = "FK2.604-A Ring schmieden";
        let matches = find_course_ids(text);
        let blocks = segment_blocks(text, &matches);
        assert_eq!(blocks, ["FK2.604-A Ring schmieden"]);
    }

    #[test]
    fn title_stripped_from_id_line() {
        let title = derive_title(
            "FK2.604-A Goldschmiede-Einführung\nMo 18:00\nRaum 204",
            "FK2.604-A",
        );
        assert_eq!(title, "Goldschmiede-Einführung");
    }

    #[test]
    fn title_from_first_usable_line_after_id_only_line() {
        let title = derive_title(
            "FK2.664-C\nKette löten für Fortgeschrittene\nDi 19:00",
            "FK2.664-C",
        );
        assert_eq!(title, "Kette löten für Fortgeschrittene");
    }

    #[test]
    fn title_trims_dashes_and_whitespace() {
        let title = derive_title("FK2.604-A – Ring schmieden –\nMo 18:00", "FK2.604-A");
        assert_eq!(title, "Ring schmieden");
    }

    #[test]
    fn title_rejects_case_insensitive_repeat_of_own_id() {
        // Stripping leaves only a lowercase copy of the id itself, which does
        // not count as a title.
        let title = derive_title("FK2.604-A fk2.604-a\nMo 18:00 Uhr Raum 204", "FK2.604-A");
        assert_eq!(title, "Mo 18:00 Uhr Raum 204");
    }

    #[test]
    fn short_lines_are_skipped() {
        let title = derive_title("FK2.604-A\nMo\n18:00\nRinge schmieden am Abend", "FK2.604-A");
        assert_eq!(title, "Ringe schmieden am Abend");
    }

    #[test]
    fn title_empty_when_first_six_lines_have_nothing_usable() {
        let block = "FK2.604-A\nFK2.605\nFK2.606\nFK2.607\nFK2.608\nFK2.609\nRinge schmieden";
        assert_eq!(derive_title(block, "FK2.604-A"), "");
    }

    #[test]
    fn parse_builds_records_for_every_id() {
        let courses = parse_course_list(SAMPLE);
        assert_eq!(courses.len(), 2);

        let first = &courses["FK2.604-A"];
        assert_eq!(first.course_id, "FK2.604-A");
        assert_eq!(first.title, "Goldschmiede-Einführung");
        assert!(first.raw_text.starts_with("FK2.604-A"));

        let second = &courses["FK2.664-C"];
        assert_eq!(second.title, "Kette löten für Fortgeschrittene");
    }

    #[test]
    fn parse_of_unmatched_text_is_empty() {
        assert!(parse_course_list("Keine Kurse in diesem Dokument").is_empty());
    }

    #[test]
    fn record_without_title_still_carries_raw_text() {
        let text = "FK2.604-A\nFK2.605\nFK2.606\nFK2.607";
        let courses = parse_course_list(text);
        let course = &courses["FK2.604-A"];
        assert_eq!(course.title, "");
        assert_eq!(course.raw_text, "FK2.604-A");
    }

    #[test]
    fn duplicate_id_keeps_last_occurrence() {
        let text = "FK2.604-A Ring schmieden\nPause\nFK2.604-A Kette löten\nEnde der Liste";
        let courses = parse_course_list(text);
        assert_eq!(courses.len(), 1);
        assert_eq!(courses["FK2.604-A"].title, "Kette löten");
    }
}
