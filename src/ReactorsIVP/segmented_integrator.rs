//! # Segmented Integrator
//!
//! Drives the CSTR simulation over a time grid on which the inputs are piecewise constant.
//! Every segment `[t[i], t[i+1]]` is a fresh initial value problem:
//!
//! ```text
//! y(t[0])   = y0
//! y(t[i+1]) = last sample of solve(f(., u[i]), y(t[i]), [t[i], t[i+1]])
//! ```
//!
//! so the solver never integrates across a jump in the inputs. The running state is the
//! accumulator of a fold over the segments; intermediate solver samples are discarded and only
//! the segment end points form the trajectory.
//!
//! Errors:
//! - configuration problems (empty grid, length mismatch, grid not strictly increasing) are
//!   detected before the first solver call
//! - solver failures and non-finite states are reported with the failing segment index, the
//!   state at its start and the part of the trajectory computed so far
use super::cstr_model::{ExogenousInputs, ReactorModel, State};
use super::ode_backends::OdeSolver;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// error types for the CSTR simulation
#[derive(Debug, Error)]
pub enum CstrError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Solver failed on segment {segment} starting from {start:?}: {message}")]
    SolverDivergence {
        segment: usize,
        start: State,
        message: String,
        partial: Trajectory,
    },
    #[error("Non-finite state {reached:?} on segment {segment} starting from {start:?}")]
    Domain {
        segment: usize,
        start: State,
        reached: State,
        partial: Trajectory,
    },
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CstrError {
    /// index of the segment that failed, if the error came from the integration loop
    pub fn failed_segment(&self) -> Option<usize> {
        match self {
            CstrError::SolverDivergence { segment, .. } | CstrError::Domain { segment, .. } => {
                Some(*segment)
            }
            _ => None,
        }
    }

    /// trajectory up to (and including) the start of the failed segment
    pub fn partial_trajectory(&self) -> Option<&Trajectory> {
        match self {
            CstrError::SolverDivergence { partial, .. } | CstrError::Domain { partial, .. } => {
                Some(partial)
            }
            _ => None,
        }
    }
}

/// Inputs as parallel sequences, one entry per time grid point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSeries {
    /// Outlet volumetric flowrate (L/min)
    pub q: Vec<f64>,
    /// Inlet volumetric flowrate (L/min)
    pub qf: Vec<f64>,
    /// Feed concentration (mol/L)
    pub Caf: Vec<f64>,
    /// Feed temperature (K)
    pub Tf: Vec<f64>,
}

impl InputSeries {
    pub fn new(q: Vec<f64>, qf: Vec<f64>, Caf: Vec<f64>, Tf: Vec<f64>) -> Self {
        Self { q, qf, Caf, Tf }
    }

    /// the same inputs at every one of `n` points
    pub fn constant(n: usize, inputs: ExogenousInputs) -> Self {
        Self {
            q: vec![inputs.q; n],
            qf: vec![inputs.qf; n],
            Caf: vec![inputs.Caf; n],
            Tf: vec![inputs.Tf; n],
        }
    }

    /// inputs valid for the segment starting at grid index `i`
    pub fn at(&self, i: usize) -> ExogenousInputs {
        ExogenousInputs::new(self.q[i], self.qf[i], self.Caf[i], self.Tf[i])
    }

    fn lengths(&self) -> [(&'static str, usize); 4] {
        [
            ("q", self.q.len()),
            ("qf", self.qf.len()),
            ("Caf", self.Caf.len()),
            ("Tf", self.Tf.len()),
        ]
    }
}

/// One state per time grid point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub states: Vec<State>,
}

impl Trajectory {
    pub fn new(states: Vec<State>) -> Self {
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn last(&self) -> Option<&State> {
        self.states.last()
    }

    pub fn V(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.V).collect()
    }

    pub fn Ca(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.Ca).collect()
    }

    pub fn T(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.T).collect()
    }
}

impl std::ops::Index<usize> for Trajectory {
    type Output = State;
    fn index(&self, i: usize) -> &State {
        &self.states[i]
    }
}

/// Why a single segment could not be advanced
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentFailure {
    /// the solver reported failure
    Diverged(String),
    /// the solver returned a state with NaN or infinite components
    NonFinite(State),
}

impl SegmentFailure {
    fn into_error(self, segment: usize, start: State, partial: Trajectory) -> CstrError {
        match self {
            SegmentFailure::Diverged(message) => CstrError::SolverDivergence {
                segment,
                start,
                message,
                partial,
            },
            SegmentFailure::NonFinite(reached) => CstrError::Domain {
                segment,
                start,
                reached,
                partial,
            },
        }
    }
}

/// Fold `step` over the segments of `t_grid` with the running state as accumulator.
///
/// `step(i, (t[i], t[i+1]), y_i)` must return `y_{i+1}`. The trajectory starts with `initial`
/// untouched; a grid with a single point never calls `step`.
pub fn fold_segments<F>(t_grid: &[f64], initial: State, mut step: F) -> Result<Trajectory, CstrError>
where
    F: FnMut(usize, (f64, f64), State) -> Result<State, SegmentFailure>,
{
    let mut states = Vec::with_capacity(t_grid.len().max(1));
    states.push(initial);
    t_grid
        .windows(2)
        .enumerate()
        .try_fold(initial, |current, (i, bounds)| {
            match step(i, (bounds[0], bounds[1]), current) {
                Ok(next) => {
                    states.push(next);
                    Ok(next)
                }
                Err(failure) => Err(failure.into_error(i, current, Trajectory::new(states.clone()))),
            }
        })?;
    Ok(Trajectory::new(states))
}

/// Checks the time grid and input sequences before any integration happens
pub fn check_configuration(t_grid: &[f64], inputs: &InputSeries) -> Result<(), CstrError> {
    if t_grid.is_empty() {
        return Err(CstrError::Configuration(
            "time grid must contain at least one point".to_string(),
        ));
    }
    for (name, len) in inputs.lengths() {
        if len != t_grid.len() {
            return Err(CstrError::Configuration(format!(
                "input sequence '{}' has length {} but the time grid has {} points",
                name,
                len,
                t_grid.len()
            )));
        }
    }
    if let Some(i) = t_grid.iter().position(|t| !t.is_finite()) {
        return Err(CstrError::Configuration(format!(
            "time grid point {} is not finite: {}",
            i, t_grid[i]
        )));
    }
    for (i, w) in t_grid.windows(2).enumerate() {
        if !(w[1] > w[0]) {
            return Err(CstrError::Configuration(format!(
                "time grid is not strictly increasing at index {}: {} -> {}",
                i + 1,
                w[0],
                w[1]
            )));
        }
    }
    Ok(())
}

/// Solves the reactor model segment by segment, handing the end state of each segment over as
/// the initial condition of the next one
pub struct SegmentedIntegrator<S: OdeSolver> {
    pub model: ReactorModel,
    pub solver: S,
}

impl<S: OdeSolver> SegmentedIntegrator<S> {
    pub fn new(model: ReactorModel, solver: S) -> Self {
        Self { model, solver }
    }

    /// Trajectory of (V, Ca, T) on `t_grid`.
    ///
    /// `inputs` must have one entry per grid point; the entry at the last point is never used.
    pub fn integrate(
        &mut self,
        t_grid: &[f64],
        inputs: &InputSeries,
        initial: State,
    ) -> Result<Trajectory, CstrError> {
        check_configuration(t_grid, inputs)?;
        let n_segments = t_grid.len() - 1;
        info!(
            "integrating {} segments with {} solver",
            n_segments,
            self.solver.name()
        );
        let model = &self.model;
        let solver = &mut self.solver;
        let result = fold_segments(t_grid, initial, |i, t_span, current| {
            let segment_inputs = inputs.at(i);
            let samples = solver
                .solve_segment(model, t_span, current, &segment_inputs)
                .map_err(SegmentFailure::Diverged)?;
            let (_, end) = samples.last().copied().ok_or_else(|| {
                SegmentFailure::Diverged("solver returned no samples".to_string())
            })?;
            if !end.is_finite() {
                return Err(SegmentFailure::NonFinite(end));
            }
            debug!(
                "segment {} [{}, {}]: {} samples, end state {:?}",
                i,
                t_span.0,
                t_span.1,
                samples.len(),
                end
            );
            Ok(end)
        });
        match &result {
            Ok(trajectory) => info!("integration finished, {} points", trajectory.len()),
            Err(e) => error!("{}", e),
        }
        result
    }
}
