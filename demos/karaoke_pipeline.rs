//! 完整流水线示例：下载音频、获取歌词、生成字幕并渲染视频。
//!
//! 用法:
//!
//! ```text
//! cargo run --example karaoke_pipeline -- <URL> <艺术家> <标题> [--separate] [--lrc <文件>]
//! ```

use karaoke_helper_rs::{KaraokeHelper, KaraokeRequest, Track, config};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> karaoke_helper_rs::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,karaoke_helper_rs=debug"));
    let _ = FmtSubscriber::builder().with_env_filter(filter).try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (Some(url), Some(artist), Some(title)) = (args.first(), args.get(1), args.get(2)) else {
        eprintln!("用法: karaoke_pipeline <URL> <艺术家> <标题> [--separate] [--lrc <文件>]");
        std::process::exit(2);
    };
    let separate_vocals = args.iter().any(|a| a == "--separate");
    let lrc_content = match args.iter().position(|a| a == "--lrc") {
        Some(idx) => {
            let path = args.get(idx + 1).ok_or_else(|| {
                karaoke_helper_rs::KaraokeHelperError::Config("--lrc 需要一个文件路径".into())
            })?;
            Some(std::fs::read_to_string(path)?)
        }
        None => None,
    };

    let mut helper = KaraokeHelper::new(config::load_config()?);
    if lrc_content.is_none() {
        helper.load_providers().await?;
    }

    let artists = [artist.as_str()];
    let request = KaraokeRequest {
        url: url.as_str(),
        track: Track {
            title: Some(title.as_str()),
            artists: Some(&artists),
            ..Default::default()
        },
        separate_vocals,
        lyrics: lrc_content.as_deref(),
        output_name: None,
    };

    let video = helper.create_karaoke_video(&request).await?;
    println!("视频已生成: {}", video.display());
    Ok(())
}
