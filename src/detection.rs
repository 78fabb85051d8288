// 该文件是 Shanan （山南西风） 项目的一部分。
// src/detection.rs - 检测结果数据定义
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

use image::GenericImageView;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::label::{LabelCatalog, LabelError, LabelPolicy};

mod bbox;
mod filter;

pub use self::filter::{DEFAULT_THRESHOLD, DetectionFilter, ScanPolicy};

/// 归一化边界框，取值范围 [0, 1]，模型输出顺序为 [y1, x1, y2, x2]
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f32; 4]")]
pub struct NormalizedBox {
  pub y1: f32,
  pub x1: f32,
  pub y2: f32,
  pub x2: f32,
}

impl From<[f32; 4]> for NormalizedBox {
  fn from([y1, x1, y2, x2]: [f32; 4]) -> Self {
    Self { y1, x1, y2, x2 }
  }
}

/// 源图像的像素范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
  pub min_x: i32,
  pub min_y: i32,
  pub max_x: i32,
  pub max_y: i32,
}

impl ImageBounds {
  pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
    Self {
      min_x,
      min_y,
      max_x,
      max_y,
    }
  }

  /// 图像缓冲区总是从 (0, 0) 开始
  pub fn of<I: GenericImageView>(image: &I) -> Self {
    let (width, height) = image.dimensions();
    Self::new(0, 0, width as i32, height as i32)
  }

  pub fn width(&self) -> i32 {
    self.max_x - self.min_x
  }

  pub fn height(&self) -> i32 {
    self.max_y - self.min_y
  }
}

/// 像素坐标系下的矩形，可能超出图像范围，也可能是反向的
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelBox {
  pub x1: i32,
  pub y1: i32,
  pub x2: i32,
  pub y2: i32,
}

impl PixelBox {
  /// 按坐标轴排序后的 (x_min, y_min, x_max, y_max)
  pub fn canonical(&self) -> (i32, i32, i32, i32) {
    (
      self.x1.min(self.x2),
      self.y1.min(self.y2),
      self.x1.max(self.x2),
      self.y1.max(self.y2),
    )
  }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RawDetectionError {
  #[error("检测结果长度不一致: 分数 {scores} 个, 类别 {classes} 个, 边界框 {boxes} 个")]
  LengthMismatch {
    scores: usize,
    classes: usize,
    boxes: usize,
  },
}

/// 一次推理产生的原始检测结果
///
/// 三个序列等长且按下标对齐。检测器约定按分数降序输出，这里不做校验。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDetectionSet {
  scores: Vec<f32>,
  classes: Vec<f32>,
  boxes: Vec<NormalizedBox>,
}

impl RawDetectionSet {
  pub fn new(
    scores: Vec<f32>,
    classes: Vec<f32>,
    boxes: Vec<NormalizedBox>,
  ) -> Result<Self, RawDetectionError> {
    if scores.len() != classes.len() || scores.len() != boxes.len() {
      return Err(RawDetectionError::LengthMismatch {
        scores: scores.len(),
        classes: classes.len(),
        boxes: boxes.len(),
      });
    }

    Ok(Self {
      scores,
      classes,
      boxes,
    })
  }

  pub fn len(&self) -> usize {
    self.scores.len()
  }

  pub fn is_empty(&self) -> bool {
    self.scores.is_empty()
  }

  pub fn scores(&self) -> &[f32] {
    &self.scores
  }

  pub fn classes(&self) -> &[f32] {
    &self.classes
  }

  pub fn boxes(&self) -> &[NormalizedBox] {
    &self.boxes
  }

  /// 第 `index` 个检测的 (分数, 类别, 边界框)
  pub fn get(&self, index: usize) -> Option<(f32, f32, NormalizedBox)> {
    Some((
      *self.scores.get(index)?,
      *self.classes.get(index)?,
      *self.boxes.get(index)?,
    ))
  }

  /// 截断到前 `len` 个检测，用于丢弃推理引擎填充的空位
  pub fn truncate(&mut self, len: usize) {
    self.scores.truncate(len);
    self.classes.truncate(len);
    self.boxes.truncate(len);
  }
}

/// 关联了标签与像素坐标的检测结果
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
  pub label: String,
  pub probability: f64,
  pub bbox: PixelBox,
  pub class_index: usize,
}

/// 将过滤后保留的原始检测与标签表、图像范围关联，保持 `kept` 的顺序
pub fn resolve_detections(
  raw: &RawDetectionSet,
  kept: &[usize],
  bounds: &ImageBounds,
  catalog: &LabelCatalog,
  policy: LabelPolicy,
) -> Result<Vec<Detection>, LabelError> {
  let mut detections = Vec::with_capacity(kept.len());

  for &index in kept {
    let Some((score, class, normalized)) = raw.get(index) else {
      warn!("检测下标 {} 超出范围 (共 {} 个)", index, raw.len());
      continue;
    };

    let (class_index, label) = match catalog.resolve_class(class) {
      Ok(resolved) => resolved,
      Err(e) if policy == LabelPolicy::Skip => {
        warn!("跳过第 {} 个检测结果: {}", index, e);
        continue;
      }
      Err(e) => return Err(e),
    };

    let bbox = normalized.to_pixel_box(bounds);
    debug!(
      "检测 {}: {} ({:.4}) at ({}, {}, {}, {})",
      index, label, score, bbox.x1, bbox.y1, bbox.x2, bbox.y2
    );

    detections.push(Detection {
      label: label.to_owned(),
      probability: f64::from(score),
      bbox,
      class_index,
    });
  }

  Ok(detections)
}
