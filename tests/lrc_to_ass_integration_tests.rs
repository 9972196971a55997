use karaoke_helper_rs::converter::{
    convert_lrc_to_ass,
    generators::ass_generator::generate_ass,
    parsers::lrc_parser::parse_lrc,
    save_ass_file,
    types::{AssStyleConfig, KaraokeTag},
};

use std::path::Path;

fn load_test_data(filename: &str) -> String {
    let path = Path::new("tests/test_data").join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("读取测试文件 '{:?}' 失败: {}", path, e))
}

fn dialogue_lines(ass: &str) -> Vec<&str> {
    ass.lines().filter(|l| l.starts_with("Dialogue:")).collect()
}

#[test_log::test]
fn test_parse_enhanced_lrc_file() {
    let content = load_test_data("enhanced.lrc");
    let parsed = parse_lrc(&content);

    assert_eq!(parsed.lines.len(), 4);
    assert_eq!(parsed.dropped_lines, 0);
    assert_eq!(parsed.offset_ms, Some(0));
    assert_eq!(parsed.raw_metadata["ar"], vec!["Rick Astley".to_string()]);
    assert_eq!(parsed.raw_metadata["al"], vec!["Whenever You Need Somebody".to_string()]);

    let first = &parsed.lines[0];
    assert!(first.is_word_level);
    assert_eq!(first.words.len(), 5);
    assert_eq!(first.display_text(), "We're no strangers to love");
    assert_eq!(first.end_time, parsed.lines[1].start_time);
    assert_eq!(first.words.last().unwrap().end_time, first.end_time);

    let third = &parsed.lines[2];
    assert!(!third.is_word_level);
    assert_eq!(third.text, "A full commitment's what I'm thinking of");

    let last = parsed.lines.last().unwrap();
    assert_eq!(last.end_time, last.start_time + 5.0);
}

#[test_log::test]
fn test_enhanced_lrc_to_ass() {
    let content = load_test_data("enhanced.lrc");
    let result = convert_lrc_to_ass(&content, &AssStyleConfig::default()).unwrap();
    let events = dialogue_lines(&result.output);

    // 3 + 3 + 2 + 1
    assert_eq!(events.len(), 9);
    assert_eq!(
        events[0],
        r"Dialogue: 2,0:00:18.80,0:00:22.40,Current,,0,0,0,,{\move(960,594,960,432,3300,3600)\fad(300,0)}{\kf40}We're {\kf30}no {\kf70}strangers {\kf30}to {\kf190}love"
    );
    assert!(events[1].ends_with("}You know the rules and so do I"));
    assert!(events[2].ends_with("}A full commitment's what I'm thinking of"));

    // 纯文本行作为当前行时不带卡拉OK标签。
    let plain_current = events
        .iter()
        .find(|e| e.starts_with("Dialogue: 2,0:00:26.50"))
        .unwrap();
    assert!(!plain_current.contains(r"\kf"));
    assert!(plain_current.ends_with("}A full commitment's what I'm thinking of"));

    assert!(events[8].starts_with("Dialogue: 2,0:00:30.70,0:00:35.70,Current,"));
}

#[test]
fn test_crlf_file_with_garbage_lines() {
    let content = load_test_data("plain_crlf.lrc");
    let parsed = parse_lrc(&content);

    let texts: Vec<&str> = parsed.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["First line", "Second line", "Third line"]);
    assert_eq!(parsed.dropped_lines, 2);
    assert_eq!(parsed.warnings.len(), 2);
    assert_eq!(parsed.lines[0].end_time, 3.5);
    assert_eq!(parsed.lines[2].end_time, 10.0);
}

#[test]
fn test_offset_file_shifts_and_clamps() {
    let content = load_test_data("offset.lrc");
    let result = convert_lrc_to_ass(&content, &AssStyleConfig::default()).unwrap();
    let lines = &result.source.lines;

    assert_eq!(result.source.offset_ms, Some(1000));
    assert_eq!(lines[0].start_time, 0.0);
    assert_eq!(lines[0].end_time, 2.0);
    assert_eq!(lines[1].start_time, 2.0);
    assert_eq!(lines[1].words[0].start_time, 2.0);
    assert!((lines[1].words[1].start_time - 2.4).abs() < 1e-9);

    let events = dialogue_lines(&result.output);
    assert!(events[0].contains(",0:00:00.00,0:00:02.00,Current,"));
    assert!(events[2].ends_with(r"}{\kf40}shift{\kf460}ed"));
}

#[test]
fn test_custom_style_flows_into_document() {
    let config = AssStyleConfig {
        resolution_x: 1280,
        resolution_y: 720,
        font_name: "Noto Sans CJK SC".to_string(),
        karaoke_tag: KaraokeTag::Outline,
        ..Default::default()
    };
    let parsed = parse_lrc("[00:01.00]<00:01.00>夜に<00:01.50>駆ける\n[00:03.00]次の行");
    let ass = generate_ass(&parsed.lines, &config).unwrap();
    let events = dialogue_lines(&ass);

    assert!(ass.contains("PlayResX: 1280\n"));
    assert!(ass.contains("Style: Current,Noto Sans CJK SC,60,"));
    assert!(events[0].contains(r"\move(640,396,640,288,"));
    assert!(events[0].ends_with(r"{\ko50}夜に{\ko150}駆ける"));
    assert!(events[1].ends_with("}次の行"));
}

#[test]
fn test_save_ass_file_round_trips_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("lyrics.ass");
    let result =
        convert_lrc_to_ass(&load_test_data("enhanced.lrc"), &AssStyleConfig::default()).unwrap();

    save_ass_file(&result.output, &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), result.output);
}
