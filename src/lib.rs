#![warn(missing_docs)]

//! # Karaoke Helper RS
//!
//! 一个 Rust 库，用于把带时间戳的歌词转换为三层滚动的卡拉OK ASS 字幕，
//! 并驱动外部工具把字幕渲染成伴唱视频。
//!
//! ## 主要功能
//!
//! - **歌词解析**: 支持标准 LRC 与逐字的增强型 LRC (`<mm:ss.cc>`)。
//! - **字幕生成**: 当前行、下一行、下下行三层布局，逐字高亮，行间平滑移动。
//! - **歌词获取**: 从 LRCLIB 获取同步歌词。
//! - **视频渲染**: 调用 `yt-dlp`、人声分离程序与 `ffmpeg` 完成整条流水线。
//!
//! ## 格式转换
//!
//! ```rust
//! use karaoke_helper_rs::KaraokeHelper;
//! use karaoke_helper_rs::config::KaraokeConfig;
//!
//! let helper = KaraokeHelper::new(KaraokeConfig::default());
//!
//! let lrc = "[00:00.00]<00:00.00>Never <00:00.50>gonna <00:01.00>give\n[00:02.00]you up";
//!
//! match helper.convert_lyrics(lrc) {
//!     Ok(result) => {
//!         assert_eq!(result.source.lines.len(), 2);
//!         println!("转换成功！ASS 内容:\n{}", result.output);
//!     }
//!     Err(e) => eprintln!("转换失败: {}", e),
//! }
//! ```
//!
//! ## 获取歌词
//!
//! ```rust,no_run
//! use karaoke_helper_rs::{KaraokeHelper, Track};
//! use karaoke_helper_rs::config::KaraokeConfig;
//!
//! async {
//!     let mut helper = KaraokeHelper::new(KaraokeConfig::default());
//!     helper.load_providers().await.unwrap();
//!
//!     let track = Track {
//!         title: Some("Never Gonna Give You Up"),
//!         artists: Some(&["Rick Astley"]),
//!         album: None,
//!         duration: None,
//!     };
//!     match helper.fetch_lyrics(&track).await {
//!         Ok(Some(lyrics)) => println!("获取歌词成功！共 {} 行。", lyrics.parsed.lines.len()),
//!         Ok(None) => println!("未找到任何可用的同步歌词。"),
//!         Err(e) => eprintln!("发生错误: {}", e),
//!     }
//! };
//! ```
pub mod config;
pub mod converter;
pub mod error;
pub mod model;
pub mod providers;
pub mod tools;

use std::{collections::HashSet, path::PathBuf};

pub use crate::{
    error::{KaraokeHelperError, Result},
    model::track::{SearchResult, Track},
};

use crate::{
    config::KaraokeConfig,
    converter::{parsers::lrc_parser, types::AssConversionResult},
    model::track::{FullLyricsResult, RawLyrics},
    providers::{Provider, lrclib::LrclibClient},
    tools::{ExternalTools, sanitize_filename},
};

/// 写入临时目录的字幕文件名。
pub const ASS_FILE_NAME: &str = "lyrics.ass";

// ==========================================================
//  顶层 API
// ==========================================================

/// 顶层卡拉OK助手，封装了歌词提供商、字幕转换和外部工具，为用户提供统一、简单的接口。
///
/// 这是与本库交互的主要入口点。
pub struct KaraokeHelper {
    providers: Vec<Box<dyn Provider + Send + Sync>>,
    config: KaraokeConfig,
}

/// 一次卡拉OK视频制作请求。
#[derive(Debug, Clone, Default)]
pub struct KaraokeRequest<'a> {
    /// 音频来源，任何 `yt-dlp` 支持的 URL。
    pub url: &'a str,
    /// 歌曲信息，用于获取歌词和生成默认文件名。
    pub track: Track<'a>,
    /// 是否先分离人声，只保留伴奏。
    pub separate_vocals: bool,
    /// 直接使用的 LRC 歌词。提供时不会访问歌词提供商。
    pub lyrics: Option<&'a str>,
    /// 输出视频的文件名，默认为 “艺术家 - 标题.mp4”。
    pub output_name: Option<&'a str>,
}

impl Default for KaraokeHelper {
    fn default() -> Self {
        Self::new(KaraokeConfig::default())
    }
}

impl KaraokeHelper {
    /// 创建一个新的 `KaraokeHelper` 实例。
    ///
    /// 此时实例只适用于歌词转换功能。
    /// 若要从网络获取歌词，必须先调用 `load_providers()` 方法。
    pub fn new(config: KaraokeConfig) -> Self {
        Self {
            providers: Vec::new(),
            config,
        }
    }

    /// 当前使用的配置。
    pub fn config(&self) -> &KaraokeConfig {
        &self.config
    }

    /// 在提供商列表末尾追加一个提供商。
    pub fn add_provider(&mut self, provider: Box<dyn Provider + Send + Sync>) {
        tracing::info!("[Main] 已添加 Provider '{}'。", provider.name());
        self.providers.push(provider);
    }

    /// 初始化并加载所有内置的歌词提供商。
    ///
    /// 初始化失败的提供商会被跳过并记录错误。
    pub async fn load_providers(&mut self) -> Result<()> {
        match LrclibClient::new() {
            Ok(client) => {
                tracing::info!("[Main] Provider 'lrclib' 初始化成功。");
                self.providers.push(Box::new(client));
            }
            Err(e) => {
                tracing::error!("[Main] Provider 'lrclib' 初始化失败: {}", e);
            }
        }
        Ok(())
    }

    /// 在所有提供商中搜索歌曲。
    ///
    /// 出错的提供商会被忽略，结果按提供商顺序排列并去重。
    pub async fn search_track(&self, track: &Track<'_>) -> Result<Vec<SearchResult>> {
        if self.providers.is_empty() {
            return Err(KaraokeHelperError::ProvidersNotInitialized);
        }

        let mut unique_results = Vec::new();
        let mut seen_keys = HashSet::new();

        for provider in &self.providers {
            let results = match provider.search_songs(track).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!("[Main] 提供商 '{}' 搜索失败: {}", provider.name(), e);
                    continue;
                }
            };

            for result in results {
                let key = (result.provider_name.clone(), result.provider_id.clone());
                if seen_keys.insert(key) {
                    unique_results.push(result);
                }
            }
        }

        Ok(unique_results)
    }

    /// 按顺序在提供商中获取同步歌词。
    ///
    /// # 返回
    /// * `Ok(Some(FullLyricsResult))` - 第一个提供同步歌词的提供商的结果。
    /// * `Ok(None)` - 所有提供商都没有同步歌词。
    /// * `Err(KaraokeHelperError)` - 没有提供商被加载，或所有提供商都请求失败。
    pub async fn fetch_lyrics(&self, track: &Track<'_>) -> Result<Option<FullLyricsResult>> {
        if self.providers.is_empty() {
            return Err(KaraokeHelperError::ProvidersNotInitialized);
        }

        let mut last_error = None;
        let mut any_answered = false;

        for provider in &self.providers {
            tracing::debug!("[Main] 正在尝试提供商: '{}'", provider.name());
            match provider.get_synced_lyrics(track).await {
                Ok(raw) => {
                    tracing::info!("[Main] 在 '{}' 成功获取到歌词，搜索结束。", provider.name());
                    return Ok(Some(FullLyricsResult {
                        parsed: lrc_parser::parse_lrc(&raw.content),
                        raw,
                        provider_name: provider.name().to_string(),
                    }));
                }
                Err(KaraokeHelperError::LyricNotFound) => {
                    any_answered = true;
                    tracing::info!("[Main] 提供商 '{}' 没有同步歌词。", provider.name());
                }
                Err(e) => {
                    tracing::warn!("[Main] 从提供商 '{}' 获取歌词失败: {}", provider.name(), e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !any_answered => Err(e),
            _ => {
                tracing::info!("[Main] 所有提供商都未能找到同步歌词。");
                Ok(None)
            }
        }
    }

    /// 将 LRC 文本转换为卡拉OK ASS 字幕。
    ///
    /// # 参数
    /// * `lrc` - 原始 LRC 或增强型 LRC 文本。
    ///
    /// # 返回
    /// `Result<AssConversionResult>` - 成功时返回生成的 ASS 文档和解析后的源数据。
    pub fn convert_lyrics(&self, lrc: &str) -> Result<AssConversionResult> {
        Ok(converter::convert_lrc_to_ass(lrc, &self.config.style)?)
    }

    /// 执行完整的卡拉OK视频制作流水线。
    ///
    /// 依次执行：下载音频、（可选）分离人声、获取歌词、生成并保存字幕、渲染视频。
    /// 任何一步失败都会中止流水线。
    ///
    /// # 返回
    /// 成功时返回渲染出的视频路径。
    #[tracing::instrument(skip(self, request), fields(url = request.url))]
    pub async fn create_karaoke_video(&self, request: &KaraokeRequest<'_>) -> Result<PathBuf> {
        let style = &self.config.style;
        let tools = ExternalTools::new(
            self.config.tools.clone(),
            (style.resolution_x, style.resolution_y),
        )
        .await?;

        tracing::info!("[Pipeline] 步骤 1: 下载音频...");
        let downloaded = tools.download_audio(request.url).await?;

        let audio = if request.separate_vocals {
            tracing::info!("[Pipeline] 步骤 2: 分离人声...");
            tools.run_separator(&downloaded).await?
        } else {
            tracing::info!("[Pipeline] 步骤 2: 跳过人声分离。");
            downloaded
        };

        tracing::info!("[Pipeline] 步骤 3: 准备歌词...");
        let raw = match request.lyrics {
            Some(content) => RawLyrics {
                format: "lrc".to_string(),
                content: content.to_string(),
            },
            None => {
                self.fetch_lyrics(&request.track)
                    .await?
                    .ok_or(KaraokeHelperError::LyricNotFound)?
                    .raw
            }
        };

        tracing::info!("[Pipeline] 步骤 4: 生成字幕...");
        let conversion = self.convert_lyrics(&raw.content)?;
        if conversion.source.lines.is_empty() {
            return Err(KaraokeHelperError::LyricNotFound);
        }
        let ass_path = tools.paths().temp_dir.join(ASS_FILE_NAME);
        converter::save_ass_file(&conversion.output, &ass_path)?;

        tracing::info!("[Pipeline] 步骤 5: 渲染视频...");
        let output_name = request
            .output_name
            .map(str::to_string)
            .unwrap_or_else(|| default_output_name(&request.track));
        let video = tools.render_video(&audio, &ass_path, &output_name).await?;

        tracing::info!("[Pipeline] 完成: {:?}", video);
        Ok(video)
    }
}

/// 根据歌曲信息生成默认的视频文件名。
fn default_output_name(track: &Track<'_>) -> String {
    sanitize_filename(&format!("{}.mp4", track.display_name()))
}
