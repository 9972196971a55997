//! 定义了整个 `karaoke-helper` 库的错误类型 `KaraokeHelperError`。

use std::io;
use thiserror::Error;

use crate::converter::types::ConvertError;

/// `karaoke-helper` 库的通用错误枚举。
#[derive(Error, Debug)]
pub enum KaraokeHelperError {
    /// 网络请求失败 (源自 `reqwest::Error`)
    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// JSON 解析失败 (源自 `serde_json::Error`)
    #[error("JSON 解析失败: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O 错误 (源自 `io::Error`)
    #[error("I/O 错误: {0}")]
    Io(#[from] io::Error),

    /// 在数据源中找不到歌词内容
    #[error("在源中未找到歌词内容")]
    LyricNotFound,

    /// 尚未加载任何提供商
    #[error("提供商尚未初始化，请先调用 load_providers()")]
    ProvidersNotInitialized,

    /// API 返回错误或空数据
    #[error("API 为 `{0}` 返回了错误或空数据")]
    ApiError(String),

    /// 找不到外部可执行文件
    #[error("找不到外部工具: '{0}'")]
    ToolNotFound(String),

    /// 外部工具执行失败
    #[error("外部工具 '{tool}' 执行失败: {message}")]
    ToolFailed {
        /// 工具名称
        tool: String,
        /// 失败原因
        message: String,
    },

    /// 配置文件错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// `KaraokeHelperError` 的 `Result` 类型别名，方便在函数签名中使用。
pub type Result<T> = std::result::Result<T, KaraokeHelperError>;

impl From<ConvertError> for KaraokeHelperError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::Io(e) => Self::Io(e),
            ConvertError::Persist(e) => Self::Io(e.error),
            ConvertError::Format(e) => Self::Internal(e.to_string()),
        }
    }
}

impl KaraokeHelperError {
    /// 创建一个 `ToolFailed` 错误。
    #[must_use]
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_error_io_maps_to_io() {
        let err: KaraokeHelperError =
            ConvertError::Io(io::Error::new(io::ErrorKind::NotFound, "missing")).into();
        assert!(matches!(err, KaraokeHelperError::Io(_)));
    }

    #[test]
    fn test_convert_error_format_maps_to_internal() {
        let err: KaraokeHelperError = ConvertError::Format(std::fmt::Error).into();
        assert!(matches!(err, KaraokeHelperError::Internal(_)));
    }

    #[test]
    fn test_tool_failed_message() {
        let err = KaraokeHelperError::tool_failed("ffmpeg", "退出码 1");
        assert_eq!(err.to_string(), "外部工具 'ffmpeg' 执行失败: 退出码 1");
    }
}
