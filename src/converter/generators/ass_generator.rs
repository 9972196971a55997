//! ASS 格式生成器
//!
//! 生成“提词器”式的三层滚动卡拉OK字幕：当前行在中间以最大字号显示，
//! 下一行与下下行依次以更小、更透明的样式显示在其下方。
//! 每一行显示结束前，三层会同时向上移动一层，形成连续滚动的效果。

use std::fmt::Write;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::debug;

use crate::converter::{
    types::{AssStyleConfig, ConvertError, LyricLine},
    utils::{format_ass_time, seconds_to_centiseconds, seconds_to_millis},
};

/// 行时长的下限（秒），避免零时长的行导致后续计算退化。
pub const MIN_LINE_DURATION_SECS: f64 = 0.1;

/// 各层锚点的纵向位置，以画布高度的百分比表示。
const CURRENT_Y_PERCENT: u32 = 40;
const NEXT_Y_PERCENT: u32 = 55;
const NEXT2_Y_PERCENT: u32 = 68;
/// 下下行预览进入画面前的起始位置。
const ENTRY_Y_PERCENT: u32 = 82;

/// 滚动显示中的三层。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Tier {
    /// 正在演唱的行。
    Current,
    /// 下一行预览。
    Next,
    /// 下下行预览。
    Next2,
}

impl Tier {
    /// 该层的透明度（ASS alpha，`00` 为不透明）。
    ///
    /// `Next` 约为 53% 不透明度，`Next2` 约为 40%。
    fn alpha(self) -> u8 {
        match self {
            Tier::Current => 0x00,
            Tier::Next => 0x78,
            Tier::Next2 => 0x99,
        }
    }

    /// 图层序号，当前行绘制在最上方。
    fn layer(self) -> u8 {
        match self {
            Tier::Current => 2,
            Tier::Next => 1,
            Tier::Next2 => 0,
        }
    }

    fn font_size(self, config: &AssStyleConfig) -> u32 {
        match self {
            Tier::Current => config.font_size_current,
            Tier::Next => config.font_size_next,
            Tier::Next2 => config.font_size_next2,
        }
    }
}

/// 三层的固定屏幕坐标。对所有行保持一致，滚动效果才能连贯。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLayout {
    /// 所有层共用的水平中心。
    pub x: u32,
    /// 当前行的纵向位置。
    pub current_y: u32,
    /// 下一行的纵向位置。
    pub next_y: u32,
    /// 下下行的纵向位置。
    pub next2_y: u32,
    /// 下下行进入画面前的纵向位置。
    pub entry_y: u32,
}

impl TierLayout {
    /// 根据画布尺寸计算各层坐标。
    #[must_use]
    pub fn for_config(config: &AssStyleConfig) -> Self {
        let y = |percent: u32| config.resolution_y * percent / 100;
        Self {
            x: config.resolution_x / 2,
            current_y: y(CURRENT_Y_PERCENT),
            next_y: y(NEXT_Y_PERCENT),
            next2_y: y(NEXT2_Y_PERCENT),
            entry_y: y(ENTRY_Y_PERCENT),
        }
    }
}

/// 一行字幕的动画时间参数（秒，相对于行开始）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineTiming {
    /// 下限处理后的行时长。
    pub duration: f64,
    /// 实际使用的过渡时长，不超过行时长的一半。
    pub transition: f64,
    /// 移动动画开始的时刻。
    pub move_start: f64,
}

impl LineTiming {
    /// 计算一行的动画时间。
    #[must_use]
    pub fn for_line(line: &LyricLine, configured_transition: f64) -> Self {
        let duration = line.duration().max(MIN_LINE_DURATION_SECS);
        let transition = configured_transition.max(0.0).min(duration / 2.0);
        let move_start = if duration > transition {
            duration - transition
        } else {
            0.0
        };
        Self {
            duration,
            transition,
            move_start,
        }
    }
}

/// ASS 生成器。配置在构造时传入，生成过程不修改任何状态。
#[derive(Debug, Clone)]
pub struct AssGenerator {
    config: AssStyleConfig,
    layout: TierLayout,
}

impl AssGenerator {
    /// 使用给定的配置创建生成器。
    #[must_use]
    pub fn new(config: AssStyleConfig) -> Self {
        let layout = TierLayout::for_config(&config);
        Self { config, layout }
    }

    /// 生成完整的 ASS 文档。
    ///
    /// 对于每一行输出 1 到 3 个 `Dialogue` 事件（取决于其后还有几行），
    /// 所有事件都覆盖当前行的时间段。
    pub fn generate(&self, lines: &[LyricLine]) -> Result<String, ConvertError> {
        let mut ass_content = String::with_capacity(lines.len() * 400 + 1024);

        self.write_header(&mut ass_content)?;

        let mut event_count = 0;
        for (i, line) in lines.iter().enumerate() {
            event_count += self.write_line_events(
                &mut ass_content,
                line,
                lines.get(i + 1),
                lines.get(i + 2),
            )?;
        }

        debug!(
            "[ASS] 为 {} 行歌词生成了 {} 个 Dialogue 事件，样式: {}",
            lines.len(),
            event_count,
            self.config
        );
        Ok(ass_content)
    }

    fn write_header(&self, output: &mut String) -> Result<(), ConvertError> {
        // --- [Script Info] 部分 ---
        writeln!(output, "[Script Info]")?;
        writeln!(output, "Title: Karaoke")?;
        writeln!(output, "ScriptType: v4.00+")?;
        writeln!(output, "WrapStyle: 0")?;
        writeln!(output, "ScaledBorderAndShadow: yes")?;
        writeln!(output, "PlayResX: {}", self.config.resolution_x)?;
        writeln!(output, "PlayResY: {}", self.config.resolution_y)?;
        writeln!(output)?;

        // --- [V4+ Styles] 部分 ---
        writeln!(output, "[V4+ Styles]")?;
        writeln!(
            output,
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding"
        )?;
        for tier in Tier::iter() {
            let alpha = tier.alpha();
            // 当前行：已唱部分为黄色，未唱部分为白色；预览行不做高亮。
            let (primary, bold) = match tier {
                Tier::Current => ("0000FFFF".to_string(), -1),
                _ => (format!("{alpha:02X}FFFFFF"), 0),
            };
            writeln!(
                output,
                "Style: {},{},{},&H{},&H{:02X}FFFFFF,&H{:02X}000000,&H80000000,{},0,0,0,100,100,0,0,1,3,0,5,10,10,10,1",
                tier,
                self.config.font_name,
                tier.font_size(&self.config),
                primary,
                alpha,
                alpha,
                bold
            )?;
        }
        writeln!(output)?;

        // --- [Events] 部分 ---
        writeln!(output, "[Events]")?;
        writeln!(
            output,
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
        )?;
        Ok(())
    }

    /// 输出一行对应的所有事件，返回事件数量。
    fn write_line_events(
        &self,
        output: &mut String,
        line: &LyricLine,
        next: Option<&LyricLine>,
        next2: Option<&LyricLine>,
    ) -> Result<usize, ConvertError> {
        let timing = LineTiming::for_line(line, self.config.transition_duration);
        let start = format_ass_time(line.start_time);
        let end = format_ass_time(line.start_time + timing.duration);
        let move_t1 = seconds_to_millis(timing.move_start);
        let move_t2 = seconds_to_millis(timing.duration);
        let fade = seconds_to_millis(timing.transition);
        let TierLayout {
            x,
            current_y,
            next_y,
            next2_y,
            entry_y,
        } = self.layout;

        let current_text = if line.is_word_level {
            self.build_karaoke_text(line)?
        } else {
            line.text.clone()
        };
        write_dialogue(
            output,
            Tier::Current,
            &start,
            &end,
            &format!(
                "{{\\move({x},{next_y},{x},{current_y},{move_t1},{move_t2})\\fad({fade},0)}}{current_text}"
            ),
        )?;
        let mut count = 1;

        if let Some(next_line) = next {
            write_dialogue(
                output,
                Tier::Next,
                &start,
                &end,
                &format!(
                    "{{\\move({x},{next2_y},{x},{next_y},{move_t1},{move_t2})}}{}",
                    next_line.display_text()
                ),
            )?;
            count += 1;

            if let Some(next2_line) = next2 {
                write_dialogue(
                    output,
                    Tier::Next2,
                    &start,
                    &end,
                    &format!(
                        "{{\\move({x},{entry_y},{x},{next2_y},{move_t1},{move_t2})\\fad(0,{fade})}}{}",
                        next2_line.display_text()
                    ),
                )?;
                count += 1;
            }
        }

        Ok(count)
    }

    /// 构建带卡拉OK标签的文本，每个词前放一个时长标签，词与词之间不插入任何分隔符。
    fn build_karaoke_text(&self, line: &LyricLine) -> Result<String, ConvertError> {
        let tag = self.config.karaoke_tag;
        let mut text_builder = String::new();
        for word in &line.words {
            let duration_cs = seconds_to_centiseconds(word.duration());
            write!(text_builder, "{{\\{tag}{duration_cs}}}{}", word.text)?;
        }
        Ok(text_builder)
    }
}

fn write_dialogue(
    output: &mut String,
    tier: Tier,
    start: &str,
    end: &str,
    text: &str,
) -> Result<(), ConvertError> {
    writeln!(
        output,
        "Dialogue: {},{},{},{},,0,0,0,,{}",
        tier.layer(),
        start,
        end,
        tier,
        text
    )?;
    Ok(())
}

/// ASS 生成的主入口函数。
pub fn generate_ass(lines: &[LyricLine], config: &AssStyleConfig) -> Result<String, ConvertError> {
    AssGenerator::new(config.clone()).generate(lines)
}
