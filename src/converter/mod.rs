//! 歌词转换器核心模块
//!
//! 负责把 LRC / 增强型 LRC 文本转换为三层滚动的卡拉OK ASS 字幕。

pub mod generators;
pub mod parsers;
pub mod types;
pub mod utils;

use std::path::Path;

pub use types::{AssStyleConfig, LyricLine, ParsedLyrics, WordSegment};

use crate::converter::types::{AssConversionResult, ConvertError};
use tracing::{debug, info};

// ==========================================================
//  顶级转换入口
// ==========================================================

/// 将 LRC 文本转换为 ASS 文档。
///
/// 如果源文件带有 `[offset:...]` 标签，会先对所有时间应用该偏移。
/// 按照 LRC 的约定，正的偏移量会让歌词提前显示。
///
/// # 参数
///
/// * `content` - 原始 LRC 文本。
/// * `config` - ASS 生成配置。
///
/// # 返回
///
/// * `Result<AssConversionResult, ConvertError>` - 成功时返回生成的文档及其源数据。
pub fn convert_lrc_to_ass(
    content: &str,
    config: &AssStyleConfig,
) -> Result<AssConversionResult, ConvertError> {
    let mut source = parsers::lrc_parser::parse_lrc(content);

    if let Some(offset_ms) = source.offset_ms.filter(|ms| *ms != 0) {
        debug!("[Converter] 应用 LRC 偏移量 {}ms", offset_ms);
        utils::apply_offset(&mut source.lines, -(offset_ms as f64) / 1000.0);
    }

    let output = generators::ass_generator::generate_ass(&source.lines, config)?;

    Ok(AssConversionResult { output, source })
}

/// 将生成的 ASS 文档保存到文件。
///
/// 内容先写入同目录下的临时文件，再重命名到目标路径，避免留下写了一半的字幕文件。
pub fn save_ass_file(content: &str, path: &Path) -> Result<(), ConvertError> {
    utils::write_atomically(path, content)?;
    info!("[Converter] ASS 字幕已保存到 {:?}", path);
    Ok(())
}
