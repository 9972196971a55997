//! 与具体提供商无关的数据模型。

pub mod track;
