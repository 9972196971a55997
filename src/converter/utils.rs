//! 包含一些工具函数的模块。

use regex::Regex;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::converter::types::{ConvertError, LyricLine};

/// 严格匹配 `MM:SS.CC`，三个部分都必须恰好是两位数字。
static LRC_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}):(\d{2})\.(\d{2})$").expect("编译 LRC_TIME_REGEX 失败")
});

static METADATA_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<key>[a-zA-Z]+):(?P<value>.*)\]$").expect("编译 METADATA_TAG_REGEX 失败")
});

/// 将 `MM:SS.CC` 格式的时间戳解析为秒。
///
/// 结果为 `分钟 * 60 + 秒 + 厘秒 / 100`。
/// 格式不正确的时间戳会被解析为 `0.0`，而不是返回错误，
/// 这样单个损坏的时间戳不会影响整个文档的解析。
#[must_use]
pub fn parse_lrc_time(timestamp: &str) -> f64 {
    let Some(caps) = LRC_TIME_REGEX.captures(timestamp) else {
        return 0.0;
    };

    let field = |idx: usize| -> Option<u32> { caps.get(idx)?.as_str().parse().ok() };
    match (field(1), field(2), field(3)) {
        (Some(minutes), Some(seconds), Some(centiseconds)) => {
            f64::from(minutes) * 60.0 + f64::from(seconds) + f64::from(centiseconds) / 100.0
        }
        _ => 0.0,
    }
}

/// 将秒数四舍五入为整数厘秒，负数视为 0。
#[must_use]
pub fn seconds_to_centiseconds(seconds: f64) -> u64 {
    let cs = (seconds * 100.0).round();
    if cs.is_finite() && cs > 0.0 { cs as u64 } else { 0 }
}

/// 将秒数四舍五入为整数毫秒，负数视为 0。用于 `\move` 与 `\fad` 的参数。
#[must_use]
pub fn seconds_to_millis(seconds: f64) -> u64 {
    let ms = (seconds * 1000.0).round();
    if ms.is_finite() && ms > 0.0 { ms as u64 } else { 0 }
}

/// 将秒数格式化为 ASS 时间字符串 `H:MM:SS.CC` (小时:分钟:秒.厘秒)。
#[must_use]
pub fn format_ass_time(seconds: f64) -> String {
    let total_cs = seconds_to_centiseconds(seconds);
    let cs = total_cs % 100;
    let total_seconds = total_cs / 100;
    let secs = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let minutes = total_minutes % 60;
    let hours = total_minutes / 60;
    format!("{hours}:{minutes:02}:{secs:02}.{cs:02}")
}

/// 辅助函数，用于将偏移量应用到时间戳上，结果不会小于 0。
fn offset_timestamp(timestamp: f64, offset: f64) -> f64 {
    (timestamp + offset).max(0.0)
}

/// 对歌词行应用一个时间偏移。
///
/// 所有行和词使用同一个偏移量，因此相邻行、相邻词之间首尾相接的关系保持不变。
///
/// # 参数
/// * `lines` - 一个可变的 `LyricLine` 切片。
/// * `offset_secs` - 要应用的偏移量（秒）。正数表示延迟歌词，负数表示提前歌词。
pub fn apply_offset(lines: &mut [LyricLine], offset_secs: f64) {
    if offset_secs == 0.0 {
        return;
    }

    for line in lines.iter_mut() {
        line.start_time = offset_timestamp(line.start_time, offset_secs);
        line.end_time = offset_timestamp(line.end_time, offset_secs);

        for word in line.words.iter_mut() {
            word.start_time = offset_timestamp(word.start_time, offset_secs);
            word.end_time = offset_timestamp(word.end_time, offset_secs);
        }
    }
}

/// 尝试将一行文本解析为 LRC 风格的 `[key:value]` 元数据。
/// 如果成功，则将结果存入 `raw_metadata` 并返回 `true`。
///
/// # 返回
/// `true` - 如果该行是有效的元数据标签并已处理。
/// `false` - 如果该行不是元数据标签。
pub fn parse_lrc_metadata_tag(line: &str, raw_metadata: &mut HashMap<String, Vec<String>>) -> bool {
    if let Some(caps) = METADATA_TAG_REGEX.captures(line)
        && let (Some(key), Some(value)) = (caps.name("key"), caps.name("value"))
    {
        raw_metadata
            .entry(key.as_str().to_lowercase())
            .or_default()
            .push(value.as_str().trim().to_string());
        return true;
    }
    false
}

/// 以“先写临时文件，再重命名”的方式写入文件。
///
/// 临时文件创建在目标文件所在的目录中，保证重命名发生在同一文件系统内。
/// 写入过程中出错时目标文件保持原样，不会留下写了一半的内容。
pub fn write_atomically(path: &Path, content: &str) -> Result<(), ConvertError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path)?;

    debug!("[Utils] 已写入 {} 字节到 {:?}", content.len(), path);
    Ok(())
}
