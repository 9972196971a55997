//! 提供商模块
//!
//! 该模块定义了与歌词数据源进行交互的核心抽象。

use async_trait::async_trait;

use crate::{
    error::Result,
    model::track::{RawLyrics, SearchResult, Track},
};

pub mod lrclib;

/// 定义了所有歌词提供商需要实现的通用接口。
#[async_trait]
pub trait Provider: Send + Sync {
    ///
    /// 返回提供商的唯一名称。
    ///
    /// 一个全小写的静态字符串，例如 `"lrclib"`。
    ///
    fn name(&self) -> &'static str;

    ///
    /// 根据歌曲信息（如歌曲标题、艺术家）搜索歌曲。
    ///
    /// # 参数
    /// * `track` - 一个包含搜索关键词的 `Track` 引用。
    ///
    /// # 返回
    /// 一个 `Result`，成功时包含一个 `Vec<SearchResult>`，代表搜索到的歌曲列表。
    ///
    async fn search_songs(&self, track: &Track<'_>) -> Result<Vec<SearchResult>>;

    ///
    /// 根据歌曲信息获取带时间戳的原始 LRC 歌词。
    ///
    /// # 返回
    /// 成功时返回 `RawLyrics`。没有同步歌词时返回 `KaraokeHelperError::LyricNotFound`。
    ///
    async fn get_synced_lyrics(&self, track: &Track<'_>) -> Result<RawLyrics>;
}
