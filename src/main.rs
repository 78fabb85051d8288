// 该文件是 Shanan （山南西风） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use shanan_report::{
  FromUrl,
  detection::DetectionFilter,
  input::ImageFileInput,
  label::LabelCatalog,
  model::RecordedDetectorBuilder,
  output::OutputWrapper,
  task::OneShotTask,
};

fn main() -> Result<()> {
  let args = args::Args::parse();

  // 日志写到标准错误，标准输出留给 JSON 报告
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_max_level(args.log_level)
    .init();

  info!("检测源: {}", args.detector);
  info!("标签文件: {}", args.labels.display());
  info!("置信度阈值: {}", args.prob);
  info!("输出方式: {:?}, 输出目标: {}", args.mode(), args.destination());

  let catalog = LabelCatalog::load(&args.labels)
    .with_context(|| format!("无法加载标签文件: {}", args.labels.display()))?;
  let detector = RecordedDetectorBuilder::from_url(&args.detector)?.build()?;
  let input = ImageFileInput::open_or_stdin(args.input.as_deref()).context("无法读取输入图像")?;
  let output = OutputWrapper::new(args.mode(), args.destination());

  let task = OneShotTask::new(DetectionFilter::new(args.prob).with_scan(args.scan_policy()))
    .with_label_policy(args.label_policy());
  let detections = task.run_task(input.image(), &detector, &catalog, &output)?;

  info!("处理完成，共 {} 个检测", detections.len());

  Ok(())
}
