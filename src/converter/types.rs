//! 定义了歌词转换中使用的核心数据类型。

use std::{collections::HashMap, fmt, io};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

//=============================================================================
// 1. 错误枚举
//=============================================================================

/// 定义歌词转换和处理过程中可能发生的各种错误。
///
/// 解析与生成本身对格式错误的输入是“尽力而为”的，不会产生错误；
/// 这里的错误只来自字符串格式化或文件写入等外部环节。
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 字符串格式化错误。
    #[error("格式错误: {0}")]
    Format(#[from] fmt::Error),
    /// 文件读写等IO错误。
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
    /// 临时文件无法替换到目标路径。
    #[error("无法写入目标文件: {0}")]
    Persist(#[from] tempfile::PersistError),
}

//=============================================================================
// 2. 歌词内部表示结构
//=============================================================================

/// 一个带时间信息的词（或音节）。
///
/// 只属于它所在的 [`LyricLine`]，没有独立的身份。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordSegment {
    /// 开始时间（秒）。
    pub start_time: f64,
    /// 结束时间（秒），由下一个词或所在行的结束时间推导而来。
    pub end_time: f64,
    /// 词的文本。空白的词会被替换为单个空格，保证它仍然占有一段可见的时长。
    pub text: String,
}

impl WordSegment {
    /// 词的时长（秒）。
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// 一行字幕。
///
/// 解析完成后即不可变，最终被 ASS 生成器按顺序消费一次。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// 行的开始时间（秒）。
    pub start_time: f64,
    /// 行的结束时间（秒），即下一行的开始时间；最后一行为开始时间加上固定的填充时长。
    pub end_time: f64,
    /// 行文本，仅在没有逐字信息时使用。
    pub text: String,
    /// 逐字时间信息，按出现顺序排列。
    pub words: Vec<WordSegment>,
    /// 是否为逐字歌词行。为 `true` 时 `words` 非空，`text` 被生成器忽略。
    pub is_word_level: bool,
}

impl LyricLine {
    /// 创建一个逐行（非逐字）的歌词行。
    #[must_use]
    pub fn plain(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
            words: Vec::new(),
            is_word_level: false,
        }
    }

    /// 行的时长（秒），未做任何下限处理。
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// 返回不带任何标记的行文本。
    ///
    /// 逐字行会把所有词直接拼接起来，不插入分隔符。
    #[must_use]
    pub fn display_text(&self) -> String {
        if self.is_word_level {
            self.words.iter().map(|w| w.text.as_str()).collect()
        } else {
            self.text.clone()
        }
    }
}

/// 解析 LRC 内容后得到的完整结果。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedLyrics {
    /// 按源文件顺序排列的歌词行。
    pub lines: Vec<LyricLine>,
    /// 从 `[key:value]` 标签中收集到的元数据，例如 `ar`、`ti`。
    pub raw_metadata: HashMap<String, Vec<String>>,
    /// `[offset:...]` 标签给出的偏移量（毫秒）。
    pub offset_ms: Option<i64>,
    /// 被丢弃的、无法识别的行数。
    pub dropped_lines: usize,
    /// 解析过程中产生的诊断信息，不影响解析结果。
    pub warnings: Vec<String>,
}

//=============================================================================
// 3. 生成选项
//=============================================================================

/// ASS 卡拉OK 标签的种类。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum KaraokeTag {
    /// `\kf`，高亮颜色从左到右扫过整个词。
    #[default]
    #[strum(serialize = "kf")]
    #[serde(rename = "kf")]
    Fill,
    /// `\k`，时长结束时整个词瞬间变色。
    #[strum(serialize = "k")]
    #[serde(rename = "k")]
    Instant,
    /// `\ko`，与 `\k` 相同，但只改变描边颜色。
    #[strum(serialize = "ko")]
    #[serde(rename = "ko")]
    Outline,
}

/// ASS 生成配置。
///
/// 在构造生成器时显式传入。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssStyleConfig {
    /// 画布宽度（`PlayResX`）。
    pub resolution_x: u32,
    /// 画布高度（`PlayResY`）。
    pub resolution_y: u32,
    /// 字体名称。
    pub font_name: String,
    /// 当前行的字号。
    pub font_size_current: u32,
    /// 下一行预览的字号。
    pub font_size_next: u32,
    /// 下下行预览的字号。
    pub font_size_next2: u32,
    /// 淡入淡出与移动动画的最长时长（秒）。
    pub transition_duration: f64,
    /// 逐字高亮使用的标签。
    pub karaoke_tag: KaraokeTag,
}

impl Default for AssStyleConfig {
    fn default() -> Self {
        Self {
            resolution_x: 1920,
            resolution_y: 1080,
            font_name: "Montserrat".to_string(),
            font_size_current: 60,
            font_size_next: 60,
            font_size_next2: 60,
            transition_duration: 0.3,
            karaoke_tag: KaraokeTag::Fill,
        }
    }
}

/// 一次 LRC 到 ASS 转换的完整结果。
#[derive(Debug, Clone, Default)]
pub struct AssConversionResult {
    /// 生成的 ASS 文档。
    pub output: String,
    /// 用于生成的源数据（已应用偏移量）。
    pub source: ParsedLyrics,
}

impl fmt::Display for AssStyleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} {} ({}/{}/{}), 过渡 {}s",
            self.resolution_x,
            self.resolution_y,
            self.font_name,
            self.font_size_current,
            self.font_size_next,
            self.font_size_next2,
            self.transition_duration
        )
    }
}
