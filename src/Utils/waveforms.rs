//! Input waveforms for dynamic simulations: uniform time grids and piecewise-constant
//! profiles that change value at given grid indices.
use serde::{Deserialize, Serialize};

/// `n` evenly spaced points from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut grid: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            grid[n - 1] = end;
            grid
        }
    }
}

/// Step change: from grid index `at` onward the signal has value `value`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub at: usize,
    pub value: f64,
}

/// Constant signal with optional step changes
///
/// ```
/// use CSTRdyn::Utils::waveforms::StepProfile;
/// let qf = StepProfile::constant(5.2).with_step(50, 5.1).sample(100);
/// assert_eq!(qf[49], 5.2);
/// assert_eq!(qf[50], 5.1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepProfile {
    pub base: f64,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl StepProfile {
    pub fn constant(base: f64) -> Self {
        Self {
            base,
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, at: usize, value: f64) -> Self {
        self.steps.push(Step { at, value });
        self
    }

    /// value at every index 0..n; later steps override earlier ones
    pub fn sample(&self, n: usize) -> Vec<f64> {
        let mut steps = self.steps.clone();
        steps.sort_by_key(|s| s.at);
        let mut out = vec![self.base; n];
        for step in steps.iter().filter(|s| s.at < n) {
            out[step.at..].fill(step.value);
        }
        out
    }

    /// steps that fall outside a grid of `n` points
    pub fn unreachable_steps(&self, n: usize) -> Vec<Step> {
        self.steps.iter().filter(|s| s.at >= n).copied().collect()
    }
}
