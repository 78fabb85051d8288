// 该文件是 Shanan （山南西风） 项目的一部分。
// src/args.rs - 命令行参数
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

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use url::Url;

use shanan_report::{
  detection::{DEFAULT_THRESHOLD, ScanPolicy},
  label::LabelPolicy,
  output::{Destination, OutputMode},
};

/// 目标检测结果后处理：输出标注图像或 JSON 报告
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_name = "THRESHOLD")]
  pub prob: f64,

  /// 输出 JSON 报告（而不是标注图像）
  #[arg(long)]
  pub json: bool,

  /// 输出路径，`-` 表示标准输出
  /// 默认: 图像模式为 output.jpg，JSON 模式为标准输出
  #[arg(long, value_name = "OUTPUT")]
  pub output: Option<Destination>,

  /// 标签文件，每行一个类别名
  #[arg(long, default_value = "coco_labels.txt", value_name = "FILE")]
  pub labels: PathBuf,

  /// 检测源，例如 recorded:///path/to/detections.json
  #[arg(long, value_name = "DETECTOR")]
  pub detector: Url,

  /// 检查全部检测，而不是在第一个低于阈值的分数处停止
  #[arg(long)]
  pub full_scan: bool,

  /// 跳过超出标签范围的类别（默认中止）
  #[arg(long)]
  pub skip_unknown_labels: bool,

  /// 日志级别
  #[arg(long, default_value_t = Level::INFO, value_name = "LEVEL")]
  pub log_level: Level,

  /// 输入图像路径，省略时读取标准输入
  #[arg(value_name = "INPUT")]
  pub input: Option<PathBuf>,
}

impl Args {
  pub fn mode(&self) -> OutputMode {
    if self.json {
      OutputMode::Json
    } else {
      OutputMode::Image
    }
  }

  pub fn destination(&self) -> Destination {
    self.output.clone().unwrap_or_else(|| match self.mode() {
      OutputMode::Image => Destination::File(PathBuf::from("output.jpg")),
      OutputMode::Json => Destination::Stdout,
    })
  }

  pub fn scan_policy(&self) -> ScanPolicy {
    if self.full_scan {
      ScanPolicy::Full
    } else {
      ScanPolicy::Prefix
    }
  }

  pub fn label_policy(&self) -> LabelPolicy {
    if self.skip_unknown_labels {
      LabelPolicy::Skip
    } else {
      LabelPolicy::Abort
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(extra: &[&str]) -> Args {
    let mut argv = vec!["shanan-report", "--detector", "recorded:///tmp/detections.json"];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).unwrap()
  }

  #[test]
  fn defaults() {
    let args = parse(&[]);
    assert_eq!(args.prob, 0.4);
    assert_eq!(args.mode(), OutputMode::Image);
    assert_eq!(args.destination(), Destination::File(PathBuf::from("output.jpg")));
    assert_eq!(args.labels, PathBuf::from("coco_labels.txt"));
    assert_eq!(args.scan_policy(), ScanPolicy::Prefix);
    assert_eq!(args.label_policy(), LabelPolicy::Abort);
    assert_eq!(args.log_level, Level::INFO);
    assert_eq!(args.input, None);
  }

  #[test]
  fn json_mode_defaults_to_stdout() {
    let args = parse(&["--json", "--prob", "0.6", "photo.jpg"]);
    assert_eq!(args.mode(), OutputMode::Json);
    assert_eq!(args.destination(), Destination::Stdout);
    assert_eq!(args.prob, 0.6);
    assert_eq!(args.input, Some(PathBuf::from("photo.jpg")));
  }

  #[test]
  fn hardened_switches() {
    let args = parse(&[
      "--full-scan",
      "--skip-unknown-labels",
      "--output",
      "-",
      "--log-level",
      "debug",
    ]);
    assert_eq!(args.scan_policy(), ScanPolicy::Full);
    assert_eq!(args.label_policy(), LabelPolicy::Skip);
    assert_eq!(args.destination(), Destination::Stdout);
    assert_eq!(args.log_level, Level::DEBUG);
  }

  #[test]
  fn detector_is_required() {
    assert!(Args::try_parse_from(["shanan-report"]).is_err());
  }
}
