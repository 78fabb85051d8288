// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/save_image_file.rs - 保存标注图像
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

use std::io::Write;

use image::{RgbImage, codecs::jpeg::JpegEncoder};
use thiserror::Error;
use tracing::info;

use crate::{
  detection::Detection,
  output::{Destination, Render, draw::Annotator},
};

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(image::ImageError),
}

pub struct SaveImageFileOutput {
  destination: Destination,
  annotator: Annotator,
}

impl SaveImageFileOutput {
  pub fn new(destination: Destination) -> Self {
    Self {
      destination,
      annotator: Annotator::default(),
    }
  }

  pub fn with_annotator(mut self, annotator: Annotator) -> Self {
    self.annotator = annotator;
    self
  }

  /// JPEG 编码，使用编码器默认质量
  fn save_image(&self, image: &RgbImage) -> Result<(), SaveImageFileError> {
    let mut writer = self
      .destination
      .open()
      .map_err(SaveImageFileError::IoError)?;

    JpegEncoder::new(&mut writer)
      .encode_image(image)
      .map_err(SaveImageFileError::ImageError)?;
    writer.flush().map_err(SaveImageFileError::IoError)?;

    info!("保存图像到: {}", self.destination);

    Ok(())
  }
}

impl Render for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, image: &RgbImage, detections: &[Detection]) -> Result<(), Self::Error> {
    let annotated = self.annotator.annotate(image, detections);
    self.save_image(&annotated)
  }
}
