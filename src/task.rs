// 该文件是 Shanan （山南西风） 项目的一部分。
// src/task.rs - 单张图像处理流程
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

use std::time::Instant;

use image::RgbImage;
use tracing::info;

use crate::{
  detection::{Detection, DetectionFilter, ImageBounds, resolve_detections},
  label::{LabelCatalog, LabelPolicy},
  model::Detector,
  output::Render,
};

/// 一张图像进，一份输出出：检测、过滤、关联标签、渲染
#[derive(Debug, Clone, Default)]
pub struct OneShotTask {
  filter: DetectionFilter,
  label_policy: LabelPolicy,
}

impl OneShotTask {
  pub fn new(filter: DetectionFilter) -> Self {
    Self {
      filter,
      label_policy: LabelPolicy::default(),
    }
  }

  pub fn with_label_policy(mut self, label_policy: LabelPolicy) -> Self {
    self.label_policy = label_policy;
    self
  }

  pub fn run_task<D, O>(
    &self,
    image: &RgbImage,
    detector: &D,
    catalog: &LabelCatalog,
    output: &O,
  ) -> anyhow::Result<Vec<Detection>>
  where
    D: Detector,
    D::Error: std::error::Error + Send + Sync + 'static,
    O: Render,
    O::Error: std::error::Error + Send + Sync + 'static,
  {
    info!("开始推理...");
    let now = Instant::now();
    let raw = detector.detect(image)?;
    info!("推理完成，耗时: {:.2?}, 共 {} 个检测", now.elapsed(), raw.len());

    let kept = self.filter.apply(&raw);
    let detections = resolve_detections(
      &raw,
      &kept,
      &ImageBounds::of(image),
      catalog,
      self.label_policy,
    )?;
    info!(
      "置信度阈值 {} ({:?} 扫描): 保留 {} 个检测",
      self.filter.threshold(),
      self.filter.scan(),
      detections.len()
    );

    let now = Instant::now();
    output.render_result(image, &detections)?;
    info!("渲染完成，耗时: {:.2?}", now.elapsed());

    Ok(detections)
  }
}
