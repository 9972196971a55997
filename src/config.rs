//! 负责处理应用的持久化配置。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::converter::types::AssStyleConfig;
use crate::error::{KaraokeHelperError, Result};
use crate::tools::ToolPaths;

const CONFIG_DIR_NAME: &str = "karaoke-helper";
const CONFIG_FILE_NAME: &str = "config.json";

/// 应用的完整配置。
///
/// 配置文件中缺失的字段会使用默认值补齐。
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct KaraokeConfig {
    /// 字幕样式。
    pub style: AssStyleConfig,
    /// 外部工具与工作目录。
    pub tools: ToolPaths,
}

/// 获取应用配置目录下指定文件的完整路径。
///
/// # 参数
/// * `filename` - 目标配置文件的名称，例如 "config.json"。
pub fn get_config_file_path(filename: &str) -> std::io::Result<PathBuf> {
    if let Some(mut config_dir) = dirs::config_dir() {
        config_dir.push(CONFIG_DIR_NAME);
        fs::create_dir_all(&config_dir)?;
        config_dir.push(filename);
        Ok(config_dir)
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "无法找到用户配置目录",
        ))
    }
}

/// 从用户配置目录加载配置。
///
/// 配置文件不存在时，会创建一份默认配置并保存。
pub fn load_config() -> Result<KaraokeConfig> {
    let config_path = get_config_file_path(CONFIG_FILE_NAME)?;
    load_config_from(&config_path)
}

/// 将配置保存到用户配置目录。
pub fn save_config(config: &KaraokeConfig) -> Result<()> {
    let config_path = get_config_file_path(CONFIG_FILE_NAME)?;
    save_config_to(config, &config_path)
}

/// 从指定路径加载配置，文件不存在时写入并返回默认配置。
pub fn load_config_from(path: &Path) -> Result<KaraokeConfig> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let config: KaraokeConfig = serde_json::from_str(&content).map_err(|e| {
                KaraokeHelperError::Config(format!("无法解析 {}: {e}", path.display()))
            })?;
            info!("[Config] 已从 {:?} 加载配置。", path);
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("[Config] 配置文件不存在，将创建默认配置。");
            let config = KaraokeConfig::default();
            save_config_to(&config, path)?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

/// 将配置序列化为 JSON 并保存到指定路径。
pub fn save_config_to(config: &KaraokeConfig, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    info!("[Config] 配置已保存到 {:?}。", path);
    Ok(())
}
