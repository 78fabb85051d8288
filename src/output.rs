// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output.rs - 输出定义
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
  convert::Infallible,
  fmt,
  fs::File,
  io::{BufWriter, Write},
  path::PathBuf,
  str::FromStr,
};

use image::RgbImage;
use thiserror::Error;

use crate::detection::Detection;

pub trait Render {
  type Error;
  fn render_result(&self, image: &RgbImage, detections: &[Detection]) -> Result<(), Self::Error>;
}

pub mod draw;

mod save_image_file;
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

mod json_report;
pub use self::json_report::{JsonReportError, JsonReportOutput, Report, ReportRecord};

/// 输出方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
  /// 绘制检测框后编码为 JPEG
  #[default]
  Image,
  /// 输出 `{name, probability}` 数组
  Json,
}

/// 输出目标，`-` 表示标准输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
  Stdout,
  File(PathBuf),
}

impl FromStr for Destination {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "-" => Destination::Stdout,
      path => Destination::File(PathBuf::from(path)),
    })
  }
}

impl fmt::Display for Destination {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Destination::Stdout => write!(f, "<stdout>"),
      Destination::File(path) => write!(f, "{}", path.display()),
    }
  }
}

impl Destination {
  /// 打开输出流，文件的上级目录不存在时自动创建
  pub fn open(&self) -> std::io::Result<Box<dyn Write>> {
    match self {
      Destination::Stdout => Ok(Box::new(std::io::stdout().lock())),
      Destination::File(path) => {
        if let Some(parent) = path.parent()
          && !parent.as_os_str().is_empty()
        {
          std::fs::create_dir_all(parent)?;
        }
        Ok(Box::new(BufWriter::new(File::create(path)?)))
      }
    }
  }
}

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("保存图像文件错误: {0}")]
  SaveImageFileError(#[from] SaveImageFileError),
  #[error("JSON 报告输出错误: {0}")]
  JsonReportError(#[from] JsonReportError),
}

/// 按输出方式分派，两种方式消费同一组检测结果
pub enum OutputWrapper {
  SaveImageFileOutput(SaveImageFileOutput),
  JsonReportOutput(JsonReportOutput),
}

impl OutputWrapper {
  pub fn new(mode: OutputMode, destination: Destination) -> Self {
    match mode {
      OutputMode::Image => OutputWrapper::SaveImageFileOutput(SaveImageFileOutput::new(destination)),
      OutputMode::Json => OutputWrapper::JsonReportOutput(JsonReportOutput::new(destination)),
    }
  }

  pub fn mode(&self) -> OutputMode {
    match self {
      OutputWrapper::SaveImageFileOutput(_) => OutputMode::Image,
      OutputWrapper::JsonReportOutput(_) => OutputMode::Json,
    }
  }
}

impl Render for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, image: &RgbImage, detections: &[Detection]) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::SaveImageFileOutput(output) => output
        .render_result(image, detections)
        .map_err(OutputError::from),
      OutputWrapper::JsonReportOutput(output) => output
        .render_result(image, detections)
        .map_err(OutputError::from),
    }
  }
}
