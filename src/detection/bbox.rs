// 该文件是 Shanan （山南西风） 项目的一部分。
// src/detection/bbox.rs - 归一化坐标映射
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

use super::{ImageBounds, NormalizedBox, PixelBox};

impl NormalizedBox {
  /// 映射到像素坐标：`min + extent * t`，向零截断
  ///
  /// 不裁剪到图像范围，也不校验坐标顺序，异常输入原样体现在结果中。
  pub fn to_pixel_box(&self, bounds: &ImageBounds) -> PixelBox {
    let width = bounds.width() as f32;
    let height = bounds.height() as f32;

    PixelBox {
      x1: scale(bounds.min_x, width, self.x1),
      y1: scale(bounds.min_y, height, self.y1),
      x2: scale(bounds.min_x, width, self.x2),
      y2: scale(bounds.min_y, height, self.y2),
    }
  }
}

fn scale(origin: i32, extent: f32, t: f32) -> i32 {
  (origin as f32 + extent * t) as i32
}
