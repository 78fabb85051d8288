// 该文件是 Shanan （山南西风） 项目的一部分。
// src/detection/filter.rs - 置信度过滤
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

use tracing::debug;

use super::RawDetectionSet;

/// 默认置信度阈值
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// 扫描方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanPolicy {
  /// 遇到第一个不满足阈值的分数即停止，要求输入按分数降序排列
  #[default]
  Prefix,
  /// 检查全部分数，保留所有满足阈值的检测，顺序不变
  Full,
}

/// 置信度过滤器，分数严格大于阈值才保留
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionFilter {
  threshold: f64,
  scan: ScanPolicy,
}

impl Default for DetectionFilter {
  fn default() -> Self {
    Self::new(DEFAULT_THRESHOLD)
  }
}

impl DetectionFilter {
  pub fn new(threshold: f64) -> Self {
    Self {
      threshold,
      scan: ScanPolicy::default(),
    }
  }

  pub fn with_scan(mut self, scan: ScanPolicy) -> Self {
    self.scan = scan;
    self
  }

  pub fn threshold(&self) -> f64 {
    self.threshold
  }

  pub fn scan(&self) -> ScanPolicy {
    self.scan
  }

  pub fn passes(&self, score: f32) -> bool {
    f64::from(score) > self.threshold
  }

  /// 返回保留的检测下标
  pub fn apply(&self, raw: &RawDetectionSet) -> Vec<usize> {
    self.apply_scores(raw.scores())
  }

  pub fn apply_scores(&self, scores: &[f32]) -> Vec<usize> {
    let kept: Vec<usize> = match self.scan {
      ScanPolicy::Prefix => {
        let k = scores.iter().take_while(|&&score| self.passes(score)).count();
        (0..k).collect()
      }
      ScanPolicy::Full => scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| self.passes(score))
        .map(|(index, _)| index)
        .collect(),
    };

    debug!(
      "阈值 {} ({:?}): 保留 {}/{} 个检测",
      self.threshold,
      self.scan,
      kept.len(),
      scores.len()
    );
    kept
  }
}
