//! 此模块实现了与 LRCLIB (<https://lrclib.net>) 进行交互的 `Provider`。
//!
//! LRCLIB 是一个开放的同步歌词数据库，不需要任何认证，
//! 只要求请求带上能识别客户端的 User-Agent。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{KaraokeHelperError, Result},
    model::track::{RawLyrics, SearchResult, Track},
    providers::Provider,
};

pub mod models;

use models::LrclibRecord;

const BASE_URL: &str = "https://lrclib.net";
const USER_AGENT: &str = concat!(
    "karaoke_helper_rs/",
    env!("CARGO_PKG_VERSION"),
    " (https://lrclib.net/docs)"
);
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// 用于与 LRCLIB API 交互的客户端。
#[derive(Debug, Clone)]
pub struct LrclibClient {
    http_client: Client,
    base_url: String,
}

impl LrclibClient {
    /// 创建一个指向官方实例的 `LrclibClient`。
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    /// 创建一个指向自建 LRCLIB 实例的客户端。
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// 发送 GET 请求并把响应体解析为 `T`。
    ///
    /// 404 被视为“没有歌词”，其他 4xx 视为 API 错误。
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("[LRCLIB] GET {}", url);
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(KaraokeHelperError::LyricNotFound);
        }
        if status.is_client_error() {
            return Err(KaraokeHelperError::ApiError(format!(
                "LRCLIB 返回了状态码 {status}"
            )));
        }

        let body = response.error_for_status()?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// 构造 `/api/get` 的请求 URL。
///
/// 标题和主艺术家是必需的，缺少任一项时返回 `None`。
/// 时长会被换算成整秒。
pub(crate) fn build_get_url(base_url: &str, track: &Track<'_>) -> Option<String> {
    let title = track.title.filter(|t| !t.trim().is_empty())?;
    let artist = track.primary_artist().filter(|a| !a.trim().is_empty())?;

    let mut url = format!(
        "{base_url}/api/get?artist_name={}&track_name={}",
        urlencoding::encode(artist),
        urlencoding::encode(title)
    );
    if let Some(album) = track.album.filter(|a| !a.trim().is_empty()) {
        url.push_str(&format!("&album_name={}", urlencoding::encode(album)));
    }
    if let Some(duration_ms) = track.duration {
        url.push_str(&format!("&duration={}", (duration_ms as f64 / 1000.0).round()));
    }
    Some(url)
}

/// 构造 `/api/search` 的请求 URL。
pub(crate) fn build_search_url(base_url: &str, track: &Track<'_>) -> Option<String> {
    let title = track.title.filter(|t| !t.trim().is_empty())?;

    let mut url = format!(
        "{base_url}/api/search?track_name={}",
        urlencoding::encode(title)
    );
    if let Some(artist) = track.primary_artist().filter(|a| !a.trim().is_empty()) {
        url.push_str(&format!("&artist_name={}", urlencoding::encode(artist)));
    }
    if let Some(album) = track.album.filter(|a| !a.trim().is_empty()) {
        url.push_str(&format!("&album_name={}", urlencoding::encode(album)));
    }
    Some(url)
}

/// 从一条记录中取出同步歌词。
///
/// 只有纯文本歌词时会记录一条警告，并返回 `LyricNotFound`，
/// 因为没有时间戳的歌词无法生成卡拉OK字幕。
pub(crate) fn extract_synced_lyrics(record: LrclibRecord) -> Result<RawLyrics> {
    if record.has_synced_lyrics() {
        return Ok(RawLyrics {
            format: "lrc".to_string(),
            content: record.synced_lyrics.unwrap_or_default(),
        });
    }

    if record.has_plain_lyrics() {
        warn!(
            "[LRCLIB] 记录 {} 只有纯文本歌词，没有时间戳，无法用于卡拉OK",
            record.id
        );
    } else if record.instrumental {
        info!("[LRCLIB] 记录 {} 是纯音乐", record.id);
    }
    Err(KaraokeHelperError::LyricNotFound)
}

fn to_search_result(record: LrclibRecord) -> SearchResult {
    let has_synced_lyrics = record.has_synced_lyrics();
    SearchResult {
        title: record.track_name.unwrap_or_default(),
        artists: record.artist_name.into_iter().collect(),
        album: record.album_name,
        duration: record.duration.map(|secs| (secs * 1000.0).round() as u64),
        provider_id: record.id.to_string(),
        provider_name: "lrclib".to_string(),
        instrumental: record.instrumental,
        has_synced_lyrics,
    }
}

#[async_trait]
impl Provider for LrclibClient {
    fn name(&self) -> &'static str {
        "lrclib"
    }

    #[instrument(skip(self))]
    async fn search_songs(&self, track: &Track<'_>) -> Result<Vec<SearchResult>> {
        let url = build_search_url(&self.base_url, track).ok_or_else(|| {
            KaraokeHelperError::ApiError("搜索至少需要歌曲标题".to_string())
        })?;

        let records: Vec<LrclibRecord> = self.get_json(&url).await?;
        info!("[LRCLIB] 搜索到 {} 条记录", records.len());
        Ok(records.into_iter().map(to_search_result).collect())
    }

    #[instrument(skip(self))]
    async fn get_synced_lyrics(&self, track: &Track<'_>) -> Result<RawLyrics> {
        let url = build_get_url(&self.base_url, track).ok_or_else(|| {
            KaraokeHelperError::ApiError("获取歌词需要歌曲标题和艺术家".to_string())
        })?;

        let record: LrclibRecord = self.get_json(&url).await?;
        info!(
            "[LRCLIB] 命中记录 {}: {:?} - {:?}",
            record.id, record.artist_name, record.track_name
        );
        extract_synced_lyrics(record)
    }
}
