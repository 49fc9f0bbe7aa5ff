//! 版式随机源
//!
//! 生产环境使用线程本地 RNG，测试中可以替换为固定序列。

use std::collections::VecDeque;

pub trait Dice: Send {
    /// [0, 1) 均匀分布
    fn unit(&mut self) -> f64;

    /// [low, high) 均匀分布
    fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.unit()
    }

    /// [low, high] 闭区间整数
    fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (high - low + 1) as f64;
        low + ((self.unit() * span) as i32).min(high - low)
    }

    /// 在 `len` 个候选中选一个下标
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        ((self.unit() * len as f64) as usize).min(len - 1)
    }

    /// 以概率 `p` 返回 true
    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }
}

/// 基于 `rand` 的默认实现
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDice;

impl Dice for ThreadDice {
    fn unit(&mut self) -> f64 {
        rand::random::<f64>()
    }
}

/// 按给定序列循环返回的骰子
#[derive(Debug, Clone)]
pub struct FixedDice {
    values: VecDeque<f64>,
}

impl FixedDice {
    pub fn new<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let values: VecDeque<f64> = values.into_iter().map(|v| v.clamp(0.0, 0.999_999)).collect();
        Self { values }
    }

    /// 永远返回同一个值
    pub fn constant(value: f64) -> Self {
        Self::new([value])
    }
}

impl Dice for FixedDice {
    fn unit(&mut self) -> f64 {
        match self.values.pop_front() {
            Some(v) => {
                self.values.push_back(v);
                v
            }
            None => 0.0,
        }
    }
}
