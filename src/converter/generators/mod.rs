//! 歌词生成器模块

pub mod ass_generator;
