// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/draw.rs - 目标检测结果可视化
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

use font8x8::legacy::BASIC_LEGACY;
use image::{Rgb, RgbImage};
use imageproc::drawing::Canvas;

use crate::{
  detection::{Detection, PixelBox},
  label::class_color,
};

// 8x8 点阵字体，第 7 行为下行部分，基线位于其上方
const GLYPH_WIDTH: i64 = 8;
const GLYPH_ASCENT: i64 = 7;
const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]); // 红色

/// 在源图像副本上绘制检测框和标签
#[derive(Debug, Clone)]
pub struct Annotator {
  box_color: Rgb<u8>,
}

impl Default for Annotator {
  fn default() -> Self {
    Self {
      box_color: BOX_COLOR,
    }
  }
}

impl Annotator {
  pub fn with_box_color(mut self, color: Rgb<u8>) -> Self {
    self.box_color = color;
    self
  }

  /// 源图像不会被修改
  pub fn annotate(&self, image: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut canvas = image.clone();
    self.draw_detections_on_image(&mut canvas, detections);
    canvas
  }

  /// 按顺序绘制，后面的检测覆盖前面的
  pub fn draw_detections_on_image<C>(&self, canvas: &mut C, detections: &[Detection])
  where
    C: Canvas<Pixel = Rgb<u8>>,
  {
    for detection in detections {
      draw_rect_outline(canvas, &detection.bbox, self.box_color);
      draw_text(
        canvas,
        i64::from(detection.bbox.x1),
        i64::from(detection.bbox.y1),
        class_color(detection.class_index),
        &caption(&detection.label, detection.probability),
      );
    }
  }
}

/// `"<label> (<百分比>%)"`，百分比四舍五入到整数
pub fn caption(label: &str, probability: f64) -> String {
  format!("{} ({}%)", label, (probability * 100.0).round() as i64)
}

/// 1 像素宽的矩形边框，包含两端；退化为线或点时照常绘制
pub fn draw_rect_outline<C: Canvas>(canvas: &mut C, bbox: &PixelBox, color: C::Pixel) {
  let (x_min, y_min, x_max, y_max) = bbox.canonical();
  let (x_min, y_min, x_max, y_max) = (
    i64::from(x_min),
    i64::from(y_min),
    i64::from(x_max),
    i64::from(y_max),
  );
  let (width, height) = canvas.dimensions();

  // 只遍历画布内的部分
  for x in x_min.max(0)..=x_max.min(i64::from(width) - 1) {
    put_pixel(canvas, x, y_min, color);
    put_pixel(canvas, x, y_max, color);
  }
  for y in y_min.max(0)..=y_max.min(i64::from(height) - 1) {
    put_pixel(canvas, x_min, y, color);
    put_pixel(canvas, x_max, y, color);
  }
}

/// 以 (x, baseline) 为起点绘制单行文本，等宽字形
pub fn draw_text<C: Canvas>(canvas: &mut C, x: i64, baseline: i64, color: C::Pixel, text: &str) {
  let top = baseline - GLYPH_ASCENT;
  for (index, ch) in text.chars().enumerate() {
    let left = x + index as i64 * GLYPH_WIDTH;
    for (row, bits) in glyph(ch).iter().enumerate() {
      for col in 0..GLYPH_WIDTH {
        if (bits >> col) & 1 == 1 {
          put_pixel(canvas, left + col, top + row as i64, color);
        }
      }
    }
  }
}

fn glyph(ch: char) -> [u8; 8] {
  let code = if ch.is_ascii() { ch } else { '?' };
  BASIC_LEGACY[code as usize]
}

fn put_pixel<C: Canvas>(canvas: &mut C, x: i64, y: i64, color: C::Pixel) {
  let (width, height) = canvas.dimensions();
  if (0..i64::from(width)).contains(&x) && (0..i64::from(height)).contains(&y) {
    canvas.draw_pixel(x as u32, y as u32, color);
  }
}
