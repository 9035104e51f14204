//! # ODE Backends
//!
//! The segmented integrator does not integrate anything itself; every segment is handed to an
//! [`OdeSolver`]. Two backends are provided:
//!
//! - [`Dopri5Solver`]: explicit adaptive Dormand-Prince 5(4) from the `ode_solvers` crate.
//!   Works on the numeric right-hand side, fast and accurate for the non-stiff mixing problem.
//! - [`SymbolicSolver`]: RustedSciThe `UniversalODESolver` (BDF, Radau, RK45, Backward Euler)
//!   working on the symbolic right-hand side produced by [`ReactorModel::symbolic_rhs`].
//!
//! A backend returns the sampled trajectory of the segment. Only the last sample is used by the
//! caller, the others are there for diagnostics.
use super::cstr_model::{ARG, ExogenousInputs, ReactorModel, State, UNKNOWNS};
use RustedSciThe::numerical::ODE_api2::{SolverParam, SolverType, UniversalODESolver};
use log::debug;
use nalgebra::DVector;
use ode_solvers::dopri5::Dopri5;
use ode_solvers::{System, Vector3};
use std::collections::HashMap;

/// Sampled solution of one segment: (time, state) pairs in increasing time
pub type SegmentSamples = Vec<(f64, State)>;

/// Accepts the samples only if the last one sits on the segment end.
///
/// A backend that gives up part way still returns what it computed so far; its last sample
/// must not be taken for the state at `t_end`.
pub fn check_segment_end(samples: SegmentSamples, t_span: (f64, f64)) -> Result<SegmentSamples, String> {
    let (t_start, t_end) = t_span;
    let h = t_end - t_start;
    match samples.last().map(|(t, _)| *t) {
        Some(t_last) if (t_last - t_end).abs() <= 1e-9 * h.max(1.0) => Ok(samples),
        Some(t_last) => Err(format!(
            "integration stopped at t = {} before the segment end {}",
            t_last, t_end
        )),
        None => Err("solver produced no output".to_string()),
    }
}

/// Anything that can integrate the reactor model over one segment with frozen inputs
pub trait OdeSolver {
    /// Integrate `model` from `y0` over `t_span = (t_start, t_end)` with `inputs` held constant.
    ///
    /// The last returned sample is the state at `t_end`. Errors carry a human readable reason.
    fn solve_segment(
        &mut self,
        model: &ReactorModel,
        t_span: (f64, f64),
        y0: State,
        inputs: &ExogenousInputs,
    ) -> Result<SegmentSamples, String>;

    fn name(&self) -> &str;
}

////////////////////////////////////////DOPRI5////////////////////////////////////////////////

/// Adaptive Dormand-Prince solver
#[derive(Debug, Clone)]
pub struct Dopri5Solver {
    /// relative tolerance
    pub rtol: f64,
    /// absolute tolerance
    pub atol: f64,
}

impl Default for Dopri5Solver {
    fn default() -> Self {
        Self {
            rtol: 1e-10,
            atol: 1e-12,
        }
    }
}

impl Dopri5Solver {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }
}

/// the model with the inputs of one segment frozen in, on segment-local time
struct SegmentSystem<'a> {
    model: &'a ReactorModel,
    inputs: ExogenousInputs,
    t_start: f64,
}

impl System<Vector3<f64>> for SegmentSystem<'_> {
    fn system(&self, x: f64, y: &Vector3<f64>, dy: &mut Vector3<f64>) {
        let state = State::new(y[0], y[1], y[2]);
        let d = self
            .model
            .derivatives(&state, self.t_start + x, &self.inputs);
        dy[0] = d.V;
        dy[1] = d.Ca;
        dy[2] = d.T;
    }
}

impl OdeSolver for Dopri5Solver {
    fn solve_segment(
        &mut self,
        model: &ReactorModel,
        t_span: (f64, f64),
        y0: State,
        inputs: &ExogenousInputs,
    ) -> Result<SegmentSamples, String> {
        let (t_start, t_end) = t_span;
        let h = t_end - t_start;
        if !(h > 0.0) {
            return Err(format!("invalid interval [{}, {}]", t_start, t_end));
        }
        let system = SegmentSystem {
            model,
            inputs: *inputs,
            t_start,
        };
        // integrate on local time 0..h so that the dense output lands exactly on the segment end
        let y_init = Vector3::new(y0.V, y0.Ca, y0.T);
        let mut stepper = Dopri5::new(system, 0.0, h, h, y_init, self.rtol, self.atol);
        let stats = stepper.integrate().map_err(|e| e.to_string())?;
        debug!("dopri5 on [{}, {}]: {}", t_start, t_end, stats);

        let samples: SegmentSamples = stepper
            .x_out()
            .iter()
            .zip(stepper.y_out().iter())
            .map(|(x, y)| (t_start + x, State::new(y[0], y[1], y[2])))
            .collect();
        check_segment_end(samples, t_span)
    }

    fn name(&self) -> &str {
        "Dopri5"
    }
}

////////////////////////////////////////RUSTEDSCITHE////////////////////////////////////////////////

/// Symbolic IVP solver from RustedSciThe
pub struct SymbolicSolver {
    /// Type of numerical solver to use
    pub solvertype: SolverType,
    /// Numerical solver parameters (step size, tolerance, etc.)
    pub solver_params: HashMap<String, SolverParam>,
}

impl SymbolicSolver {
    pub fn new(solvertype: SolverType) -> Self {
        let map_of_params = HashMap::from([
            ("step_size".to_owned(), SolverParam::Float(1e-3)),
            ("tolerance".to_owned(), SolverParam::Float(1e-8)),
            ("max_iterations".to_owned(), SolverParam::Int(100000)),
            ("rtol".to_owned(), SolverParam::Float(1e-8)),
            ("atol".to_owned(), SolverParam::Float(1e-10)),
            ("max_step".to_owned(), SolverParam::Float(0.01)),
            ("first_step".to_owned(), SolverParam::OptionalFloat(None)),
            ("vectorized".to_owned(), SolverParam::Bool(false)),
            ("jac_sparsity".to_owned(), SolverParam::OptionalMatrix(None)),
            ("parallel".to_owned(), SolverParam::Bool(false)),
        ]);
        Self {
            solvertype,
            solver_params: map_of_params,
        }
    }

    pub fn set_solver_params(&mut self, params: HashMap<String, SolverParam>) {
        self.solver_params = params;
    }
}

impl Default for SymbolicSolver {
    fn default() -> Self {
        Self::new(SolverType::Bdf)
    }
}

impl OdeSolver for SymbolicSolver {
    fn solve_segment(
        &mut self,
        model: &ReactorModel,
        t_span: (f64, f64),
        y0: State,
        inputs: &ExogenousInputs,
    ) -> Result<SegmentSamples, String> {
        let (t_start, t_end) = t_span;
        if !(t_end > t_start) {
            return Err(format!("invalid interval [{}, {}]", t_start, t_end));
        }
        let eq_system = model.symbolic_rhs(inputs);
        let unknowns: Vec<String> = UNKNOWNS.iter().map(|s| s.to_string()).collect();
        let mut ode = UniversalODESolver::new(
            eq_system,
            unknowns,
            ARG.to_owned(),
            self.solvertype.clone(),
            t_start,
            DVector::from_vec(y0.to_vec()),
            t_end,
        );
        ode.set_parameters(self.solver_params.clone());
        ode.initialize();
        ode.solve();

        let (t_res, y_res) = ode.get_result();
        let (t_res, y_res) = match (t_res, y_res) {
            (Some(t), Some(y)) => (t, y),
            _ => return Err("symbolic solver returned no result".to_string()),
        };
        if t_res.len() == 0 || y_res.nrows() != t_res.len() || y_res.ncols() != UNKNOWNS.len() {
            return Err(format!(
                "symbolic solver returned a {}x{} result for {} time points",
                y_res.nrows(),
                y_res.ncols(),
                t_res.len()
            ));
        }
        let mut samples = SegmentSamples::with_capacity(t_res.len());
        for (i, t) in t_res.iter().enumerate() {
            let row = y_res.row(i);
            samples.push((*t, State::new(row[0], row[1], row[2])));
        }
        check_segment_end(samples, t_span)
    }

    fn name(&self) -> &str {
        "RustedSciThe"
    }
}
