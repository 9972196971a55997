//! 外部工具模块
//!
//! 负责调用 `yt-dlp` 下载音频、调用人声分离程序，以及用 `ffmpeg` 把 ASS 字幕
//! 渲染到视频中。所有命令都以参数列表的形式构造，不经过 shell。

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, instrument, warn};

use crate::error::{KaraokeHelperError, Result};

/// 下载得到的音频文件名。
pub const DOWNLOADED_AUDIO_FILE: &str = "downloaded.wav";
/// 人声分离后的伴奏文件名。
pub const INSTRUMENTAL_AUDIO_FILE: &str = "instrumental.wav";
/// 渲染视频的帧率。
pub const VIDEO_FRAME_RATE: u32 = 30;
/// 错误信息中保留的 stderr 末尾行数。
const STDERR_TAIL_LINES: usize = 5;

/// 外部可执行文件以及工作目录的位置。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolPaths {
    /// `yt-dlp` 可执行文件。
    pub yt_dlp: PathBuf,
    /// 人声分离程序，调用方式为 `<程序> <输入> <输出>`。
    pub separator_binary: PathBuf,
    /// `ffmpeg` 可执行文件。
    pub ffmpeg: PathBuf,
    /// 存放下载音频、伴奏和字幕等中间文件的目录。
    pub temp_dir: PathBuf,
    /// 存放最终视频的目录。
    pub output_dir: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            yt_dlp: PathBuf::from("yt-dlp"),
            separator_binary: PathBuf::from("./separator"),
            ffmpeg: PathBuf::from("ffmpeg"),
            temp_dir: PathBuf::from("temp"),
            output_dir: PathBuf::from("output"),
        }
    }
}

/// 外部工具的调用器。
#[derive(Debug, Clone)]
pub struct ExternalTools {
    paths: ToolPaths,
    resolution: (u32, u32),
}

impl ExternalTools {
    /// 创建调用器，并确保临时目录和输出目录存在。
    ///
    /// # 参数
    /// * `paths` - 工具与目录的位置。
    /// * `resolution` - 渲染视频的分辨率，应与字幕的 `PlayResX`/`PlayResY` 一致。
    pub async fn new(paths: ToolPaths, resolution: (u32, u32)) -> Result<Self> {
        tokio::fs::create_dir_all(&paths.temp_dir).await?;
        tokio::fs::create_dir_all(&paths.output_dir).await?;
        debug!(
            "[Tools] 工作目录就绪: temp={:?}, output={:?}",
            paths.temp_dir, paths.output_dir
        );
        Ok(Self { paths, resolution })
    }

    /// 工具与目录的位置。
    pub fn paths(&self) -> &ToolPaths {
        &self.paths
    }

    /// 下载 `url` 指向的音频并转为 WAV。
    ///
    /// 只有在工具正常退出且输出文件确实存在时才算成功。
    #[instrument(skip(self))]
    pub async fn download_audio(&self, url: &str) -> Result<PathBuf> {
        let output = self.paths.temp_dir.join(DOWNLOADED_AUDIO_FILE);
        let args = build_download_args(url, &output);

        execute(&self.paths.yt_dlp, &args).await?;
        ensure_output_exists(&self.paths.yt_dlp, &output).await?;

        info!("[Tools] 音频已下载到 {:?}", output);
        Ok(output)
    }

    /// 从 `input` 中分离出伴奏。
    #[instrument(skip(self))]
    pub async fn run_separator(&self, input: &Path) -> Result<PathBuf> {
        let output = self.paths.temp_dir.join(INSTRUMENTAL_AUDIO_FILE);
        let args = build_separator_args(input, &output);

        execute(&self.paths.separator_binary, &args).await?;
        ensure_output_exists(&self.paths.separator_binary, &output).await?;

        info!("[Tools] 伴奏已生成: {:?}", output);
        Ok(output)
    }

    /// 以黑色背景、音频 `audio` 和字幕 `ass` 渲染卡拉OK视频。
    ///
    /// 视频写入输出目录下的 `output_name`，返回其完整路径。
    #[instrument(skip(self))]
    pub async fn render_video(&self, audio: &Path, ass: &Path, output_name: &str) -> Result<PathBuf> {
        let output = self.paths.output_dir.join(sanitize_filename(output_name));
        let args = build_render_args(audio, ass, &output, self.resolution);

        execute(&self.paths.ffmpeg, &args).await?;
        ensure_output_exists(&self.paths.ffmpeg, &output).await?;

        info!("[Tools] 视频已渲染: {:?}", output);
        Ok(output)
    }
}

/// `yt-dlp -x --audio-format wav --output <output> <url>`
pub fn build_download_args(url: &str, output: &Path) -> Vec<OsString> {
    vec![
        "-x".into(),
        "--audio-format".into(),
        "wav".into(),
        "--output".into(),
        output.into(),
        url.into(),
    ]
}

/// `<separator> <input> <output>`
pub fn build_separator_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec![input.into(), output.into()]
}

/// 构造 ffmpeg 的渲染参数。
///
/// 画面是纯黑背景，时长由 `-shortest` 截断到音频长度。
pub fn build_render_args(
    audio: &Path,
    ass: &Path,
    output: &Path,
    (width, height): (u32, u32),
) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-f".into(),
        "lavfi".into(),
        "-i".into(),
        format!("color=c=black:s={width}x{height}:r={VIDEO_FRAME_RATE}").into(),
        "-i".into(),
        audio.into(),
        "-vf".into(),
        subtitle_filter(ass).into(),
        "-shortest".into(),
        "-c:v".into(),
        "libx264".into(),
        "-c:a".into(),
        "aac".into(),
        "-b:a".into(),
        "192k".into(),
        output.into(),
    ]
}

/// 构造 `ass=` 滤镜参数。
///
/// 路径放在单引号中，这样其中的 `:` 和 `,` 不会被滤镜图解析器当作分隔符。
/// 反斜杠统一换成 `/`，单引号按 `'\''` 转义。
fn subtitle_filter(ass: &Path) -> String {
    let path = ass.to_string_lossy().replace('\\', "/").replace('\'', r"'\''");
    format!("ass='{path}'")
}

/// 把文件名中不安全的字符替换为 `_`，并去掉首尾的空白和点。
///
/// 结果为空时返回 `"untitled"`。
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// 运行外部程序并等待其结束。
///
/// 可执行文件先通过 `which` 解析，找不到时返回 `ToolNotFound`；
/// 非零退出码返回 `ToolFailed`，附带 stderr 的最后几行。
async fn execute(program: &Path, args: &[OsString]) -> Result<()> {
    let tool_name = program.display().to_string();
    let resolved = which::which(program)
        .map_err(|_| KaraokeHelperError::ToolNotFound(tool_name.clone()))?;

    info!("[Tools] 执行 {} {:?}", tool_name, args);
    let output = TokioCommand::new(&resolved)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let tail = stderr_tail(&stderr, STDERR_TAIL_LINES);
    warn!("[Tools] {} 退出状态 {}: {}", tool_name, output.status, tail);
    Err(KaraokeHelperError::tool_failed(
        tool_name,
        format!("退出状态 {}: {}", output.status, tail),
    ))
}

async fn ensure_output_exists(program: &Path, output: &Path) -> Result<()> {
    if tokio::fs::try_exists(output).await? {
        Ok(())
    } else {
        Err(KaraokeHelperError::tool_failed(
            program.display().to_string(),
            format!("执行完毕，但没有生成 {}", output.display()),
        ))
    }
}

fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join(" | ")
}
