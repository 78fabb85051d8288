// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/recorded.rs - 回放已记录的推理输出
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
  fs::File,
  io::{BufReader, Read},
  path::PathBuf,
};

use image::RgbImage;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  detection::{NormalizedBox, RawDetectionError, RawDetectionSet},
  model::Detector,
};

#[derive(Error, Debug)]
pub enum RecordedDetectorError {
  #[error("检测记录读取错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("检测记录解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("检测记录无效: {0}")]
  Invalid(#[from] RawDetectionError),
  #[error("检测源路径错误: {0}")]
  PathError(String),
}

/// 推理引擎输出张量的 JSON 记录，字段沿用引擎的输出名
#[derive(Debug, Deserialize)]
struct RecordedOutput {
  detection_scores: Vec<f32>,
  detection_classes: Vec<f32>,
  detection_boxes: Vec<NormalizedBox>,
  #[serde(default)]
  num_detections: Option<f32>,
}

pub struct RecordedDetectorBuilder {
  path: PathBuf,
}

impl FromUrlWithScheme for RecordedDetectorBuilder {
  const SCHEME: &'static str = "recorded";
}

impl FromUrl for RecordedDetectorBuilder {
  type Error = RecordedDetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(RecordedDetectorError::PathError(format!(
        "检测源路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    let path = urlencoding::decode(url.path())
      .map_err(|e| RecordedDetectorError::PathError(format!("检测源路径解码失败: {}", e)))?;

    Ok(RecordedDetectorBuilder::new(path.into_owned()))
  }
}

impl RecordedDetectorBuilder {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn build(self) -> Result<RecordedDetector, RecordedDetectorError> {
    info!("加载检测记录: {}", self.path.display());
    let file = File::open(&self.path)?;
    let detector = RecordedDetector::from_reader(BufReader::new(file))?;
    info!("检测记录加载完成, 共 {} 个检测", detector.result.len());
    Ok(detector)
  }
}

/// 对任意输入图像都返回同一份已记录结果的检测器
#[derive(Debug, Clone)]
pub struct RecordedDetector {
  result: RawDetectionSet,
}

impl RecordedDetector {
  pub fn new(result: RawDetectionSet) -> Self {
    Self { result }
  }

  pub fn from_reader<R: Read>(reader: R) -> Result<Self, RecordedDetectorError> {
    let output: RecordedOutput = serde_json::from_reader(reader)?;
    let mut result = RawDetectionSet::new(
      output.detection_scores,
      output.detection_classes,
      output.detection_boxes,
    )?;

    // 推理引擎输出定长张量，有效检测数之后是填充
    if let Some(num) = output.num_detections {
      let num = num.max(0.0) as usize;
      if num < result.len() {
        debug!("有效检测数 {}, 丢弃 {} 个填充项", num, result.len() - num);
        result.truncate(num);
      }
    }

    Ok(Self::new(result))
  }
}

impl Detector for RecordedDetector {
  type Error = Infallible;

  fn detect(&self, image: &RgbImage) -> Result<RawDetectionSet, Self::Error> {
    debug!(
      "回放检测记录: {} 个检测, 图像 {}x{}",
      self.result.len(),
      image.width(),
      image.height()
    );
    Ok(self.result.clone())
  }
}
