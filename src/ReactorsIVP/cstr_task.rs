//! # CSTR Simulation Task
//!
//! [`CstrTask`] ties the pieces together the same way the other reactor tasks of the crate do:
//!
//! 1. configuration ([`CstrTaskConfig`]) is set directly, built from defaults or read from a
//!    task file (`CSTR` header followed by JSON)
//! 2. `check_task()` validates it
//! 3. `build_inputs()` samples the time grid and the four input waveforms
//! 4. `solve()` runs the [`SegmentedIntegrator`] with the configured backend
//! 5. the [`CstrResult`] table can be printed, plotted or saved
//!
//! If the integration fails part way, the rows computed before the failing segment are kept in
//! `result` and the error is returned.
//!
//! ## Task file example
//! ```text
//! CSTR
//! {
//!   "problem_name": "mixing tank",
//!   "initial_state": {"V": 1.0, "Ca": 0.0, "T": 350.0},
//!   "time": {"t0": 0.0, "t_end": 10.0, "n_points": 100},
//!   "q":   {"base": 5.0},
//!   "qf":  {"base": 5.2, "steps": [{"at": 50, "value": 5.1}]},
//!   "Caf": {"base": 1.0, "steps": [{"at": 30, "value": 0.5}]},
//!   "Tf":  {"base": 300.0, "steps": [{"at": 70, "value": 325.0}]},
//!   "solver": {"Dopri5": {"rtol": 1e-10, "atol": 1e-12}},
//!   "output_file": "data.txt"
//! }
//! ```
use super::cstr_model::{RateLaw, ReactorModel, State};
use super::ode_backends::{Dopri5Solver, OdeSolver, SymbolicSolver};
use super::segmented_integrator::{CstrError, InputSeries, SegmentedIntegrator, Trajectory};
use crate::Utils::load_from_file::{load_section_from_file, load_section_from_str};
use crate::Utils::waveforms::{StepProfile, linspace};
use RustedSciThe::numerical::ODE_api2::{SolverParam, SolverType};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// headers that start the task section of a task file
pub const TASK_HEADERS: [&str; 2] = ["CSTR", "REACTOR"];

/// Uniform time grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGridConfig {
    /// start time (min)
    pub t0: f64,
    /// end time (min)
    pub t_end: f64,
    /// number of grid points, segments = n_points - 1
    pub n_points: usize,
}

/// Which ODE backend integrates the segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SolverConfig {
    /// adaptive Dormand-Prince (ode_solvers)
    Dopri5 { rtol: f64, atol: f64 },
    /// BDF on the symbolic right-hand side (RustedSciThe)
    BDF { rtol: f64, atol: f64, max_step: f64 },
}

impl Default for SolverConfig {
    fn default() -> Self {
        let d = Dopri5Solver::default();
        SolverConfig::Dopri5 {
            rtol: d.rtol,
            atol: d.atol,
        }
    }
}

/// Everything needed to run one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstrTaskConfig {
    #[serde(default)]
    pub problem_name: Option<String>,
    #[serde(default)]
    pub problem_description: Option<String>,
    pub initial_state: State,
    pub time: TimeGridConfig,
    /// Outlet volumetric flowrate (L/min)
    pub q: StepProfile,
    /// Inlet volumetric flowrate (L/min)
    pub qf: StepProfile,
    /// Feed concentration (mol/L)
    pub Caf: StepProfile,
    /// Feed temperature (K)
    pub Tf: StepProfile,
    #[serde(default)]
    pub rate_law: RateLaw,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub output_file: Option<String>,
}

impl Default for CstrTaskConfig {
    /// The classic mixing-tank exercise: 10 min, 100 points, steps in qf, Caf and Tf
    fn default() -> Self {
        Self {
            problem_name: Some("CSTR mixing".to_string()),
            problem_description: Some(
                "mass, species and energy balance of a well-mixed vessel".to_string(),
            ),
            initial_state: State::new(1.0, 0.0, 350.0),
            time: TimeGridConfig {
                t0: 0.0,
                t_end: 10.0,
                n_points: 100,
            },
            q: StepProfile::constant(5.0),
            qf: StepProfile::constant(5.2).with_step(50, 5.1),
            Caf: StepProfile::constant(1.0).with_step(30, 0.5),
            Tf: StepProfile::constant(300.0).with_step(70, 325.0),
            rate_law: RateLaw::default(),
            solver: SolverConfig::default(),
            output_file: Some("data.txt".to_string()),
        }
    }
}

impl CstrTaskConfig {
    pub fn from_file(file_name: &str) -> Result<Self, CstrError> {
        load_section_from_file(file_name, &TASK_HEADERS).map_err(CstrError::Parse)
    }

    pub fn from_task_str(content: &str) -> Result<Self, CstrError> {
        load_section_from_str(content, &TASK_HEADERS).map_err(CstrError::Parse)
    }

    /// task file text with the header line
    pub fn to_task_string(&self) -> Result<String, CstrError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| CstrError::Parse(e.to_string()))?;
        Ok(format!("{}\n{}\n", TASK_HEADERS[0], json))
    }
}

/// Aligned result table: one row per time grid point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CstrResult {
    pub t: Vec<f64>,
    pub inputs: InputSeries,
    pub trajectory: Trajectory,
}

impl CstrResult {
    /// number of rows; shorter than the time grid if the run failed part way
    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }

    /// rows of `(t, qf, q, Tf, Caf, V, Ca, T)`
    pub fn rows(&self) -> Vec<[f64; 8]> {
        self.trajectory
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| {
                [
                    self.t[i],
                    self.inputs.qf[i],
                    self.inputs.q[i],
                    self.inputs.Tf[i],
                    self.inputs.Caf[i],
                    s.V,
                    s.Ca,
                    s.T,
                ]
            })
            .collect()
    }
}

/// Dynamic CSTR simulation task
#[derive(Debug, Clone)]
pub struct CstrTask {
    pub config: CstrTaskConfig,
    /// sampled time grid (min)
    pub t_grid: Vec<f64>,
    /// sampled inputs, one entry per grid point
    pub inputs: InputSeries,
    /// result table, filled by solve()
    pub result: Option<CstrResult>,
}

impl Default for CstrTask {
    fn default() -> Self {
        Self::new()
    }
}

impl CstrTask {
    /// Task with the default configuration
    pub fn new() -> Self {
        Self::from_config(CstrTaskConfig::default())
    }

    pub fn from_config(config: CstrTaskConfig) -> Self {
        Self {
            config,
            t_grid: Vec::new(),
            inputs: InputSeries::default(),
            result: None,
        }
    }

    pub fn from_file(file_name: &str) -> Result<Self, CstrError> {
        let config = CstrTaskConfig::from_file(file_name)?;
        Ok(Self::from_config(config))
    }
    /////////////////////////////////SETTERS////////////////////////////////////////
    pub fn set_problem_name(&mut self, name: &str) {
        self.config.problem_name = Some(name.to_string());
    }

    pub fn set_problem_description(&mut self, description: &str) {
        self.config.problem_description = Some(description.to_string());
    }

    pub fn set_initial_state(&mut self, V0: f64, Ca0: f64, T0: f64) {
        self.config.initial_state = State::new(V0, Ca0, T0);
    }

    pub fn set_time_grid(&mut self, t0: f64, t_end: f64, n_points: usize) {
        self.config.time = TimeGridConfig {
            t0,
            t_end,
            n_points,
        };
    }

    /// Set all four input waveforms at once
    pub fn set_inputs(&mut self, q: StepProfile, qf: StepProfile, Caf: StepProfile, Tf: StepProfile) {
        self.config.q = q;
        self.config.qf = qf;
        self.config.Caf = Caf;
        self.config.Tf = Tf;
    }

    pub fn set_rate_law(&mut self, rate_law: RateLaw) {
        self.config.rate_law = rate_law;
    }

    pub fn set_solver(&mut self, solver: SolverConfig) {
        self.config.solver = solver;
    }

    pub fn set_output_file(&mut self, file_name: &str) {
        self.config.output_file = Some(file_name.to_string());
    }
    ////////////////////////////////////////////////////////////////////////////////
    /// Validates the configuration before anything is sampled or solved
    pub fn check_task(&self) -> Result<(), CstrError> {
        let c = &self.config;
        if c.time.n_points == 0 {
            return Err(CstrError::Configuration(
                "n_points must be at least 1".to_string(),
            ));
        }
        if !c.time.t0.is_finite() || !c.time.t_end.is_finite() {
            return Err(CstrError::Configuration(
                "t0 and t_end must be finite".to_string(),
            ));
        }
        if c.time.n_points > 1 && c.time.t_end <= c.time.t0 {
            return Err(CstrError::Configuration(format!(
                "t_end ({}) must be larger than t0 ({})",
                c.time.t_end, c.time.t0
            )));
        }
        if !c.initial_state.is_finite() {
            return Err(CstrError::Configuration(format!(
                "initial state is not finite: {:?}",
                c.initial_state
            )));
        }
        if c.initial_state.V <= 0.0 {
            warn!(
                "initial volume {} is not positive, the balances divide by V",
                c.initial_state.V
            );
        }
        let tolerances = match c.solver {
            SolverConfig::Dopri5 { rtol, atol } => vec![rtol, atol],
            SolverConfig::BDF {
                rtol,
                atol,
                max_step,
            } => vec![rtol, atol, max_step],
        };
        if tolerances.iter().any(|x| !(*x > 0.0)) {
            return Err(CstrError::Configuration(format!(
                "solver settings must be positive: {:?}",
                c.solver
            )));
        }
        for (name, profile) in [("q", &c.q), ("qf", &c.qf), ("Caf", &c.Caf), ("Tf", &c.Tf)] {
            for step in profile.unreachable_steps(c.time.n_points) {
                warn!(
                    "step of '{}' at index {} is beyond the last grid index {} and is ignored",
                    name,
                    step.at,
                    c.time.n_points - 1
                );
            }
        }
        Ok(())
    }

    /// Samples the time grid and input waveforms
    pub fn build_inputs(&mut self) {
        let n = self.config.time.n_points;
        self.t_grid = linspace(self.config.time.t0, self.config.time.t_end, n);
        self.inputs = InputSeries::new(
            self.config.q.sample(n),
            self.config.qf.sample(n),
            self.config.Caf.sample(n),
            self.config.Tf.sample(n),
        );
    }

    /// Checks the task, samples the inputs and integrates with the configured backend
    pub fn solve(&mut self) -> Result<(), CstrError> {
        self.check_task()?;
        info!("task checked!");
        self.build_inputs();
        info!("inputs sampled on {} points", self.t_grid.len());
        match self.config.solver.clone() {
            SolverConfig::Dopri5 { rtol, atol } => self.solve_with(Dopri5Solver::new(rtol, atol)),
            SolverConfig::BDF {
                rtol,
                atol,
                max_step,
            } => {
                let mut solver = SymbolicSolver::new(SolverType::Bdf);
                let mut params: HashMap<String, SolverParam> = solver.solver_params.clone();
                params.insert("rtol".to_owned(), SolverParam::Float(rtol));
                params.insert("atol".to_owned(), SolverParam::Float(atol));
                params.insert("max_step".to_owned(), SolverParam::Float(max_step));
                solver.set_solver_params(params);
                self.solve_with(solver)
            }
        }
    }

    /// Integrates the already sampled inputs with any backend
    pub fn solve_with<S: OdeSolver>(&mut self, solver: S) -> Result<(), CstrError> {
        if self.t_grid.is_empty() {
            self.build_inputs();
        }
        let model = ReactorModel::new(self.config.rate_law.clone());
        let mut integrator = SegmentedIntegrator::new(model, solver);
        let outcome = integrator.integrate(&self.t_grid, &self.inputs, self.config.initial_state);
        let (trajectory, error) = match outcome {
            Ok(trajectory) => (trajectory, None),
            Err(e) => match e.partial_trajectory() {
                Some(partial) => (partial.clone(), Some(e)),
                None => return Err(e),
            },
        };
        self.result = Some(CstrResult {
            t: self.t_grid.clone(),
            inputs: self.inputs.clone(),
            trajectory,
        });
        match error {
            Some(e) => Err(e),
            None => {
                info!("CSTR task solved!");
                Ok(())
            }
        }
    }

    pub fn get_result(&self) -> Option<&CstrResult> {
        self.result.as_ref()
    }

    /// Saves the result table to the configured output file
    pub fn save_result(&self) -> Result<(), CstrError> {
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| CstrError::MissingData("no result, call solve() first".to_string()))?;
        let file_name = self
            .config
            .output_file
            .clone()
            .unwrap_or_else(|| "data.txt".to_string());
        result.save_result(&file_name)
    }
}
