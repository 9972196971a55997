//! # LRC 格式解析器
//!
//! 同时支持标准 LRC 与增强型 LRC（行内带 `<mm:ss.xx>` 逐字时间戳）。
//!
//! 源格式中没有结束时间，所有结束时间都由下一个词、下一行的开始时间推导：
//!
//! 1. 词的结束时间为同一行中下一个词的开始时间，最后一个词暂定为开始时间加 0.5 秒；
//! 2. 行的结束时间为下一行的开始时间，最后一行为开始时间加 5 秒；
//! 3. 最后，每个逐字行的最后一个词的结束时间被改写为该行的结束时间。
//!
//! 整个过程对错误的输入是宽容的：无法识别的行会被丢弃，损坏的时间戳会被视为 0。

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::converter::{
    types::{LyricLine, ParsedLyrics, WordSegment},
    utils::{parse_lrc_metadata_tag, parse_lrc_time},
};

/// 最后一行在开始时间之后额外保留的时长（秒）。
pub const LAST_LINE_PADDING_SECS: f64 = 5.0;

/// 每行最后一个词的暂定时长（秒），会在第二遍处理中被行结束时间覆盖。
const PROVISIONAL_WORD_DURATION_SECS: f64 = 0.5;

/// 用于匹配一个完整的 LRC 歌词行，捕获时间戳和其后的全部文本。
static LRC_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(\d{2}:\d{2}\.\d{2})\](.*)$").expect("未能编译 LRC_LINE_REGEX")
});

/// 用于匹配行内的逐字时间戳，捕获时间戳和到下一个 `<` 为止的文本。
static WORD_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(\d{2}:\d{2}\.\d{2})>([^<]*)").expect("未能编译 WORD_TIME_REGEX")
});

/// 匹配 `[offset:+/-毫秒]` 标签。
static OFFSET_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[offset:\s*([+-]?\d+)\s*\]$").expect("未能编译 OFFSET_TAG_REGEX")
});

/// 解析 LRC 格式内容到 `ParsedLyrics` 结构。
///
/// 返回的行数等于匹配时间戳格式的行数，顺序与输入一致（不会重新排序）。
/// 该函数不会失败，所有问题都记录在 `warnings` 与 `dropped_lines` 中。
#[must_use]
pub fn parse_lrc(content: &str) -> ParsedLyrics {
    let mut lines: Vec<LyricLine> = Vec::new();
    let mut raw_metadata: HashMap<String, Vec<String>> = HashMap::new();
    let mut warnings: Vec<String> = Vec::new();
    let mut offset_ms = None;
    let mut dropped_lines = 0;

    for (line_num_zero_based, raw_line) in content.lines().enumerate() {
        let line_num = line_num_zero_based + 1;
        let line_str = raw_line.trim_end_matches('\r');

        if line_str.trim().is_empty() {
            continue;
        }

        if let Some(line_caps) = LRC_LINE_REGEX.captures(line_str) {
            let timestamp = line_caps.get(1).map_or("", |m| m.as_str());
            let rest = line_caps.get(2).map_or("", |m| m.as_str());
            lines.push(parse_line_content(parse_lrc_time(timestamp), rest));
            continue;
        }

        if let Some(offset_caps) = OFFSET_TAG_REGEX.captures(line_str.trim()) {
            match offset_caps.get(1).map(|m| m.as_str().parse::<i64>()) {
                Some(Ok(value)) => offset_ms = Some(value),
                _ => warnings.push(format!("第 {line_num} 行: 无法解析 offset 标签，已忽略。")),
            }
            continue;
        }

        if parse_lrc_metadata_tag(line_str.trim(), &mut raw_metadata) {
            continue;
        }

        dropped_lines += 1;
        warnings.push(format!(
            "第 {} 行: 无法识别的行格式，已忽略: '{}'",
            line_num,
            line_str.chars().take(50).collect::<String>()
        ));
    }

    finalize_end_times(&mut lines, &mut warnings);

    if dropped_lines > 0 {
        warn!("[LRC] 共丢弃了 {} 行无法识别的内容。", dropped_lines);
    }
    debug!(
        "[LRC] 解析完成: {} 行歌词，其中 {} 行为逐字歌词。",
        lines.len(),
        lines.iter().filter(|l| l.is_word_level).count()
    );

    ParsedLyrics {
        lines,
        raw_metadata,
        offset_ms,
        dropped_lines,
        warnings,
    }
}

/// 将行时间戳之后的内容解析为一个歌词行，结束时间留待第二遍处理。
fn parse_line_content(line_start: f64, rest: &str) -> LyricLine {
    let words = parse_words(rest);

    if words.is_empty() {
        return LyricLine::plain(line_start, 0.0, rest);
    }

    LyricLine {
        start_time: line_start,
        end_time: 0.0,
        text: String::new(),
        words,
        is_word_level: true,
    }
}

/// 从行内容中解析出所有带时间戳的词，并推导出同一行内的词结束时间。
///
/// 第一个逐字时间戳之前的文本没有时间信息，会被忽略。
fn parse_words(rest: &str) -> Vec<WordSegment> {
    let mut words: Vec<WordSegment> = WORD_TIME_REGEX
        .captures_iter(rest)
        .map(|caps| {
            let start_time = parse_lrc_time(caps.get(1).map_or("", |m| m.as_str()));
            let text = match caps.get(2).map_or("", |m| m.as_str()) {
                "" => " ".to_string(),
                text => text.to_string(),
            };
            WordSegment {
                start_time,
                end_time: 0.0,
                text,
            }
        })
        .collect();

    for i in 0..words.len() {
        words[i].end_time = match words.get(i + 1) {
            Some(next) => next.start_time,
            None => words[i].start_time + PROVISIONAL_WORD_DURATION_SECS,
        };
    }

    words
}

/// 第二遍处理：填充行的结束时间，并修正每行最后一个词的结束时间。
///
/// 必须在所有行都已解析完成之后调用，因为每行的结束时间取决于下一行。
fn finalize_end_times(lines: &mut [LyricLine], warnings: &mut Vec<String>) {
    let num_lines = lines.len();

    for i in 0..num_lines {
        let end_time = match lines.get(i + 1) {
            Some(next) => next.start_time,
            None => lines[i].start_time + LAST_LINE_PADDING_SECS,
        };

        if end_time < lines[i].start_time {
            warnings.push(format!(
                "第 {} 个歌词行 ({}s): 下一行的开始时间早于本行，时间戳可能乱序。",
                i + 1,
                lines[i].start_time
            ));
        }

        lines[i].end_time = end_time;
    }

    for (i, line) in lines.iter_mut().enumerate().filter(|(_, l)| l.is_word_level) {
        let line_end = line.end_time;
        if let Some(last_word) = line.words.last_mut() {
            last_word.end_time = line_end;
        }

        for (j, word) in line.words.iter().enumerate() {
            if word.end_time < word.start_time {
                warnings.push(format!(
                    "第 {} 个歌词行的第 {} 个词 ({}s): 结束时间 {}s 早于开始时间，时间戳可能乱序。",
                    i + 1,
                    j + 1,
                    word.start_time,
                    word.end_time
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_scenario() {
        let parsed = parse_lrc("[00:00.00]Hello\n[00:05.00]<00:05.00>World");

        assert_eq!(parsed.lines.len(), 2);

        let first = &parsed.lines[0];
        assert!(!first.is_word_level);
        assert_eq!(first.text, "Hello");
        assert_eq!(first.start_time, 0.0);
        assert_eq!(first.end_time, 5.0);
        assert!(first.words.is_empty());

        let second = &parsed.lines[1];
        assert!(second.is_word_level);
        assert_eq!(second.start_time, 5.0);
        assert_eq!(second.end_time, 10.0);
        assert_eq!(second.words.len(), 1);
        assert_eq!(second.words[0].text, "World");
        assert_eq!(second.words[0].start_time, second.start_time);
        assert_eq!(second.words[0].end_time, second.end_time);
    }

    #[test]
    fn test_line_start_time_decoding() {
        let parsed = parse_lrc("[01:02.50]a\n[12:34.56]b");
        assert_eq!(parsed.lines[0].start_time, 62.5);
        assert_eq!(
            parsed.lines[1].start_time,
            12.0 * 60.0 + 34.0 + 56.0 / 100.0
        );
    }

    #[test]
    fn test_lines_are_contiguous_and_last_line_is_padded() {
        let parsed = parse_lrc("[00:01.00]a\n[00:03.25]b\n[00:07.10]c");
        let lines = &parsed.lines;

        for pair in lines.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
        }
        let last = lines.last().unwrap();
        assert_eq!(last.end_time, last.start_time + LAST_LINE_PADDING_SECS);
    }

    #[test]
    fn test_word_boundaries_and_last_word_fixup() {
        let parsed = parse_lrc(
            "[00:10.00]<00:10.00>Never <00:10.40>gonna <00:10.90>give\n[00:14.00]next",
        );
        let line = &parsed.lines[0];

        assert!(line.is_word_level);
        assert_eq!(line.words.len(), 3);
        assert_eq!(line.words[0].text, "Never ");
        assert_eq!(line.words[0].end_time, line.words[1].start_time);
        assert_eq!(line.words[1].end_time, line.words[2].start_time);
        assert_eq!(
            line.words[2].end_time, 14.0,
            "最后一个词应延伸到行的结束时间，而不是暂定的 0.5 秒"
        );
        assert_eq!(line.end_time, 14.0);
    }

    #[test]
    fn test_adjacent_word_tags_produce_space_word() {
        let parsed = parse_lrc("[00:01.00]<00:01.00><00:01.50>la");
        let words = &parsed.lines[0].words;

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, " ", "空白的词应被替换为单个空格");
        assert_eq!(words[0].end_time, 1.5);
        assert_eq!(words[1].text, "la");
    }

    #[test]
    fn test_empty_input_yields_no_lines() {
        let parsed = parse_lrc("");
        assert!(parsed.lines.is_empty());
        assert_eq!(parsed.dropped_lines, 0);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_malformed_line_timestamp_is_dropped() {
        let parsed = parse_lrc("[0:00.00]bad\n[00:02.00]good\n[00:04.00]also good");

        assert_eq!(parsed.lines.len(), 2);
        assert_eq!(parsed.lines[0].text, "good");
        assert_eq!(parsed.dropped_lines, 1);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_carriage_returns_and_blank_lines() {
        let parsed = parse_lrc("[00:01.00]one\r\n\r\n   \n[00:02.00]two\r");

        assert_eq!(parsed.lines.len(), 2);
        assert_eq!(parsed.lines[0].text, "one");
        assert_eq!(parsed.lines[1].text, "two");
        assert_eq!(parsed.dropped_lines, 0);
    }

    #[test]
    fn test_plain_text_is_kept_verbatim() {
        let parsed = parse_lrc("[00:01.00]  spaced  out ");
        assert_eq!(parsed.lines[0].text, "  spaced  out ");
    }

    #[test]
    fn test_source_order_is_not_resorted() {
        let parsed = parse_lrc("[00:05.00]later\n[00:01.00]earlier");

        assert_eq!(parsed.lines[0].text, "later");
        assert_eq!(parsed.lines[0].end_time, 1.0);
        assert_eq!(parsed.lines[1].text, "earlier");
        assert!(
            parsed.warnings.iter().any(|w| w.contains("乱序")),
            "乱序的时间戳应产生诊断信息"
        );
    }

    #[test]
    fn test_metadata_and_offset_tags() {
        let parsed = parse_lrc("[ar:Rick Astley]\n[ti:Never Gonna]\n[offset:+250]\n[00:01.00]x");

        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(parsed.dropped_lines, 0);
        assert_eq!(parsed.offset_ms, Some(250));
        assert_eq!(parsed.raw_metadata["ar"], vec!["Rick Astley".to_string()]);
        assert_eq!(parsed.raw_metadata["ti"], vec!["Never Gonna".to_string()]);
    }

    #[test]
    fn test_text_before_first_word_tag_is_ignored() {
        let parsed = parse_lrc("[00:01.00]intro <00:01.20>word");
        let line = &parsed.lines[0];

        assert!(line.is_word_level);
        assert_eq!(line.words.len(), 1);
        assert_eq!(line.display_text(), "word");
    }

    #[test]
    fn test_word_after_next_line_start_is_reported() {
        let parsed = parse_lrc("[00:01.00]<00:01.00>a<00:05.00>b\n[00:03.00]c");
        let words = &parsed.lines[0].words;

        // 时间策略保持不变：最后一个词仍然截止于下一行的开始。
        assert_eq!(words[1].start_time, 5.0);
        assert_eq!(words[1].end_time, 3.0);
        assert_eq!(parsed.lines[0].end_time, 3.0);

        assert_eq!(parsed.warnings.len(), 1, "{:?}", parsed.warnings);
        assert!(parsed.warnings[0].contains("第 1 个歌词行的第 2 个词"));
        assert_eq!(parsed.dropped_lines, 0);
    }

    #[test]
    fn test_well_ordered_words_produce_no_warnings() {
        let parsed = parse_lrc("[00:01.00]<00:01.00>a<00:02.00>b\n[00:03.00]c");
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
    }

    #[test]
    fn test_repeated_line_timestamps_keep_the_rest_as_text() {
        let parsed = parse_lrc("[00:01.00][00:05.00]chorus");

        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(parsed.lines[0].start_time, 1.0);
        assert_eq!(parsed.lines[0].text, "[00:05.00]chorus");
    }

    #[test]
    fn test_malformed_word_tag_is_treated_as_plain_text() {
        let parsed = parse_lrc("[00:01.00]<1:00.00>word");
        let line = &parsed.lines[0];

        assert!(!line.is_word_level);
        assert_eq!(line.text, "<1:00.00>word");
    }
}
