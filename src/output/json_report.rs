// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/json_report.rs - JSON 检测报告
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

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
  detection::Detection,
  output::{Destination, Render},
};

#[derive(Error, Debug)]
pub enum JsonReportError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 编码错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
  pub name: String,
  /// 原始分数，0 到 1
  pub probability: f64,
}

/// 检测报告，顺序与过滤后的检测一致；为空时编码为 `[]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
  pub records: Vec<ReportRecord>,
}

impl Report {
  pub fn build(detections: &[Detection]) -> Self {
    Self {
      records: detections
        .iter()
        .map(|detection| ReportRecord {
          name: detection.label.clone(),
          probability: detection.probability,
        })
        .collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// 写出一个 JSON 文档，末尾带一个换行
  pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), JsonReportError> {
    serde_json::to_writer(&mut writer, self)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
  }
}

pub struct JsonReportOutput {
  destination: Destination,
}

impl JsonReportOutput {
  pub fn new(destination: Destination) -> Self {
    Self { destination }
  }
}

impl Render for JsonReportOutput {
  type Error = JsonReportError;

  fn render_result(&self, _image: &RgbImage, detections: &[Detection]) -> Result<(), Self::Error> {
    let report = Report::build(detections);
    report.write_to(self.destination.open()?)?;
    info!("写出 {} 条记录到: {}", report.len(), self.destination);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::detection::PixelBox;

  fn detection(label: &str, score: f32) -> Detection {
    Detection {
      label: label.to_string(),
      probability: f64::from(score),
      bbox: PixelBox {
        x1: 0,
        y1: 0,
        x2: 1,
        y2: 1,
      },
      class_index: 0,
    }
  }

  fn encode(report: &Report) -> String {
    let mut buffer = Vec::new();
    report.write_to(&mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
  }

  #[test]
  fn keeps_order_and_raw_scores() {
    let detections = [detection("dog", 0.9), detection("cat", 0.5)];
    let report = Report::build(&detections);
    assert_eq!(report.len(), 2);
    assert_eq!(report.records[0].name, "dog");
    assert_eq!(report.records[0].probability, f64::from(0.9f32));
    assert_eq!(report.records[1].name, "cat");
    assert_eq!(report.records[1].probability, 0.5);
  }

  #[test]
  fn empty_report_is_an_empty_array() {
    let report = Report::build(&[]);
    assert!(report.is_empty());
    assert_eq!(encode(&report), "[]\n");
  }

  #[test]
  fn record_keys_are_name_and_probability() {
    let report = Report::build(&[detection("person", 0.5)]);
    assert_eq!(encode(&report), "[{\"name\":\"person\",\"probability\":0.5}]\n");
  }

  #[test]
  fn decoding_restores_the_records() {
    let detections = [
      detection("person", 0.93),
      detection("traffic light", 0.41),
    ];
    let decoded: Report = serde_json::from_str(&encode(&Report::build(&detections))).unwrap();

    assert_eq!(decoded.len(), detections.len());
    for (record, detection) in decoded.records.iter().zip(&detections) {
      assert_eq!(record.name, detection.label);
      assert!((record.probability - detection.probability).abs() < 1e-12);
    }
  }

  #[test]
  fn renders_to_a_file_destination() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    let output = JsonReportOutput::new(Destination::File(path.clone()));
    output
      .render_result(&RgbImage::new(1, 1), &[detection("car", 0.75)])
      .unwrap();

    let decoded: Vec<ReportRecord> =
      serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(
      decoded,
      vec![ReportRecord {
        name: "car".to_string(),
        probability: 0.75
      }]
    );
  }
}
