//! 歌词解析器模块

pub mod lrc_parser;
