// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model.rs - 检测器接口
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

use image::RgbImage;

use crate::detection::RawDetectionSet;

/// 目标检测器
///
/// 推理引擎由调用方创建并持有，以参数形式传入处理流程；离开作用域时释放。
/// 输出的检测结果应按分数降序排列。
pub trait Detector {
  type Error;

  fn detect(&self, image: &RgbImage) -> Result<RawDetectionSet, Self::Error>;
}

mod recorded;
pub use self::recorded::{RecordedDetector, RecordedDetectorBuilder, RecordedDetectorError};
