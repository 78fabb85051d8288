// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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
  io::{Cursor, Read},
  path::Path,
};

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("I/O error: {0}")]
  IoError(std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(image::ImageError),
}

impl From<std::io::Error> for ImageFileInputError {
  fn from(err: std::io::Error) -> Self {
    ImageFileInputError::IoError(err)
  }
}

impl From<image::ImageError> for ImageFileInputError {
  fn from(err: image::ImageError) -> Self {
    ImageFileInputError::ImageLoadError(err)
  }
}

/// 待处理的源图像，统一转换为 RGB8
#[derive(Debug)]
pub struct ImageFileInput {
  image: RgbImage,
}

impl ImageFileInput {
  /// 从文件读取，格式由内容判断
  pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageFileInputError> {
    let path = path.as_ref();
    info!("读取图像文件: {}", path.display());
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(Self::from(image.into_rgb8()))
  }

  /// 读取全部输入后解码，用于标准输入
  pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ImageFileInputError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    debug!("读取到 {} 字节图像数据", data.len());
    Self::from_bytes(&data)
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self, ImageFileInputError> {
    let image = ImageReader::new(Cursor::new(data))
      .with_guessed_format()?
      .decode()?;
    Ok(Self::from(image.into_rgb8()))
  }

  /// 给定路径时读文件，否则读标准输入
  pub fn open_or_stdin(path: Option<&Path>) -> Result<Self, ImageFileInputError> {
    match path {
      Some(path) => Self::open(path),
      None => {
        info!("从标准输入读取图像");
        Self::from_reader(std::io::stdin().lock())
      }
    }
  }

  pub fn image(&self) -> &RgbImage {
    &self.image
  }

  pub fn into_image(self) -> RgbImage {
    self.image
  }
}

impl From<RgbImage> for ImageFileInput {
  fn from(image: RgbImage) -> Self {
    debug!("图像尺寸: {}x{}", image.width(), image.height());
    Self { image }
  }
}
