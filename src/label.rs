// 该文件是 Shanan （山南西风） 项目的一部分。
// src/label.rs - 类别标签与颜色
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::{
  fs::File,
  io::{BufRead, BufReader},
  path::Path,
};

use image::Rgb;
use thiserror::Error;
use tracing::info;

mod colors;
pub use self::colors::NAMED_COLORS;

#[derive(Error, Debug)]
pub enum LabelError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("类别索引 {index} 超出标签范围 (共 {len} 个标签)")]
  OutOfRange { index: i64, len: usize },
  #[error("类别值 {0} 不是有效的索引")]
  NotAnIndex(f32),
}

/// 类别无法解析时的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelPolicy {
  /// 中止本次处理
  #[default]
  Abort,
  /// 丢弃该检测并继续
  Skip,
}

/// 标签表，第 N 行（从 0 开始）对应类别 N
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCatalog {
  labels: Vec<String>,
}

impl From<Vec<String>> for LabelCatalog {
  fn from(labels: Vec<String>) -> Self {
    Self { labels }
  }
}

impl<S: Into<String>> FromIterator<S> for LabelCatalog {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      labels: iter.into_iter().map(Into::into).collect(),
    }
  }
}

impl LabelCatalog {
  pub fn load(path: impl AsRef<Path>) -> Result<Self, LabelError> {
    let path = path.as_ref();
    let catalog = Self::from_reader(BufReader::new(File::open(path)?))?;
    info!("加载标签文件: {} ({} 个标签)", path.display(), catalog.len());
    Ok(catalog)
  }

  pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LabelError> {
    let labels = reader.lines().collect::<Result<Vec<_>, _>>()?;
    Ok(Self { labels })
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn resolve(&self, class_index: i64) -> Result<&str, LabelError> {
    usize::try_from(class_index)
      .ok()
      .and_then(|index| self.labels.get(index))
      .map(String::as_str)
      .ok_or(LabelError::OutOfRange {
        index: class_index,
        len: self.labels.len(),
      })
  }

  /// 解析模型输出的浮点类别值，小数部分向零截断
  pub fn resolve_class(&self, class: f32) -> Result<(usize, &str), LabelError> {
    if !class.is_finite() {
      return Err(LabelError::NotAnIndex(class));
    }
    let class_index = class as i64;
    let label = self.resolve(class_index)?;
    Ok((class_index as usize, label))
  }
}

/// 类别颜色，按类别下标循环取命名颜色表
pub fn class_color(class_index: usize) -> Rgb<u8> {
  let (_, rgb) = NAMED_COLORS[class_index % NAMED_COLORS.len()];
  Rgb(rgb)
}
