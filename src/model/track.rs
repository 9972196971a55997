//! 定义了与歌曲搜索、歌词获取相关的核心数据结构。

use serde::{Deserialize, Serialize};

use crate::converter::types::ParsedLyrics;

/// 代表一个可搜索的歌曲元数据，用作搜索函数的输入参数。
#[derive(Default, Debug, Clone)]
pub struct Track<'a> {
    /// 歌曲标题。
    pub title: Option<&'a str>,
    /// 艺术家列表。
    pub artists: Option<&'a [&'a str]>,
    /// 专辑名。
    pub album: Option<&'a str>,
    /// 歌曲时长（毫秒）。
    pub duration: Option<u64>,
}

impl Track<'_> {
    /// 主艺术家，即艺术家列表中的第一个。
    #[must_use]
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.and_then(|a| a.first()).copied()
    }

    /// 用于显示或生成文件名的 “艺术家 - 标题” 字符串。
    #[must_use]
    pub fn display_name(&self) -> String {
        let title = self.title.unwrap_or("未知歌曲");
        match self.artists {
            Some(artists) if !artists.is_empty() => format!("{} - {}", artists.join(", "), title),
            _ => title.to_string(),
        }
    }
}

/// 代表一个标准化的搜索结果条目。
///
/// 这是所有 Provider 的 `search_songs` 方法需要返回的类型。
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SearchResult {
    /// 搜索结果的歌曲标题。
    pub title: String,
    /// 搜索结果的艺术家列表。
    pub artists: Vec<String>,
    /// 搜索结果的专辑名。
    pub album: Option<String>,
    /// 歌曲时长（毫秒）。
    pub duration: Option<u64>,
    /// 在其所在平台的唯一 ID。
    pub provider_id: String,
    /// 提供商的名称 (例如, "lrclib")。
    pub provider_name: String,
    /// 是否为纯音乐。
    pub instrumental: bool,
    /// 是否带有逐行同步的歌词。
    pub has_synced_lyrics: bool,
}

/// 代表从 API 获取的、未经解析的原始歌词内容。
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawLyrics {
    /// 歌词的格式，例如 "lrc"。
    pub format: String,
    /// 原始的歌词文本内容。
    pub content: String,
}

/// 代表完整的歌词获取结果，包括解析后的数据和原始副本。
#[derive(Debug, Clone, Default)]
pub struct FullLyricsResult {
    /// 解析后的歌词数据。
    pub parsed: ParsedLyrics,
    /// 从提供商获取的原始歌词副本。
    pub raw: RawLyrics,
    /// 提供歌词的提供商名称。
    pub provider_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let artists = ["Rick Astley"];
        let track = Track {
            title: Some("Never Gonna Give You Up"),
            artists: Some(&artists),
            ..Default::default()
        };
        assert_eq!(track.display_name(), "Rick Astley - Never Gonna Give You Up");
        assert_eq!(track.primary_artist(), Some("Rick Astley"));

        let untitled = Track::default();
        assert_eq!(untitled.display_name(), "未知歌曲");
        assert_eq!(untitled.primary_artist(), None);
    }
}
