//! 此模块定义了 LRCLIB API 返回的数据结构。

use serde::Deserialize;

/// `/api/get` 与 `/api/search` 返回的单条歌词记录。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LrclibRecord {
    /// 记录 ID。
    pub id: u64,
    /// 歌曲标题。
    #[serde(default)]
    pub track_name: Option<String>,
    /// 艺术家名。
    #[serde(default)]
    pub artist_name: Option<String>,
    /// 专辑名。
    #[serde(default)]
    pub album_name: Option<String>,
    /// 时长（秒），可能带小数。
    #[serde(default)]
    pub duration: Option<f64>,
    /// 是否为纯音乐。
    #[serde(default)]
    pub instrumental: bool,
    /// 纯文本歌词，不带时间戳。
    #[serde(default)]
    pub plain_lyrics: Option<String>,
    /// 带行时间戳的 LRC 歌词。
    #[serde(default)]
    pub synced_lyrics: Option<String>,
}

impl LrclibRecord {
    /// 是否带有非空的同步歌词。
    pub fn has_synced_lyrics(&self) -> bool {
        self.synced_lyrics
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// 是否带有非空的纯文本歌词。
    pub fn has_plain_lyrics(&self) -> bool {
        self.plain_lyrics
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}
