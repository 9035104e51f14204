//! # CSTR Balance Equations
//!
//! Right-hand side of the well-mixed tank balances. The tank has one inlet and one outlet,
//! so the three states are coupled only through the volume:
//!
//! ```text
//! dV/dt  = qf - q
//! dCa/dt = (qf*Caf - q*Ca)/V - rA - Ca*(dV/dt)/V
//! dT/dt  = (qf*Tf  - q*T)/V        - T*(dV/dt)/V
//! ```
//!
//! | Symbol | Description | Units |
//! |--------|-------------|-------|
//! | `V` | liquid volume | L |
//! | `Ca` | concentration of A | mol/L |
//! | `T` | temperature | K |
//! | `q` | outlet volumetric flowrate | L/min |
//! | `qf` | inlet volumetric flowrate | L/min |
//! | `Caf` | feed concentration | mol/L |
//! | `Tf` | feed temperature | K |
//! | `rA` | consumption rate of A | mol/(L·min) |
//!
//! `rA` comes from a [`ReactionRate`] strategy. [`NoReaction`] gives the pure mixing model,
//! [`FirstOrderArrhenius`] adds `rA = k0*exp(-Ea/(R*T))*Ca`.
//!
//! The same balances are also available as symbolic expressions (for a fixed set of inputs)
//! so the symbolic IVP solvers of RustedSciThe can integrate them.
use RustedSciThe::symbolic::symbolic_engine::Expr;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

/// Universal gas constant in J/(mol·K)
pub const R_G: f64 = 8.314;

/// names of the unknowns as the symbolic solvers see them
pub const UNKNOWNS: [&str; 3] = ["V", "Ca", "T"];
/// name of the independent variable
pub const ARG: &str = "t";

/// State of the tank: volume, concentration, temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Volume (L)
    pub V: f64,
    /// Concentration of A (mol/L)
    pub Ca: f64,
    /// Temperature (K)
    pub T: f64,
}

impl State {
    pub fn new(V: f64, Ca: f64, T: f64) -> Self {
        Self { V, Ca, T }
    }

    pub fn is_finite(&self) -> bool {
        self.V.is_finite() && self.Ca.is_finite() && self.T.is_finite()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.V, self.Ca, self.T]
    }

    pub fn from_slice(y: &[f64]) -> Option<Self> {
        match y {
            [V, Ca, T] => Some(Self::new(*V, *Ca, *T)),
            _ => None,
        }
    }
}

/// Inputs held constant over one segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExogenousInputs {
    /// Outlet volumetric flowrate (L/min)
    pub q: f64,
    /// Inlet volumetric flowrate (L/min)
    pub qf: f64,
    /// Feed concentration (mol/L)
    pub Caf: f64,
    /// Feed temperature (K)
    pub Tf: f64,
}

impl ExogenousInputs {
    pub fn new(q: f64, qf: f64, Caf: f64, Tf: f64) -> Self {
        Self { q, qf, Caf, Tf }
    }
}

/// Consumption rate of the solute
#[enum_dispatch]
pub trait ReactionRate {
    /// rA at the given state, mol/(L·min)
    fn rate(&self, state: &State) -> f64;
    /// the same rate as a symbolic expression of `Ca` and `T`
    fn rate_expr(&self, Ca: &Expr, T: &Expr) -> Expr;
}

/// No chemistry: the tank only mixes and dilutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NoReaction;

impl ReactionRate for NoReaction {
    fn rate(&self, _state: &State) -> f64 {
        0.0
    }
    fn rate_expr(&self, _Ca: &Expr, _T: &Expr) -> Expr {
        Expr::Const(0.0)
    }
}

/// First order irreversible reaction A => products
///
/// rA = k0 * exp(-Ea/(R*T)) * Ca
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstOrderArrhenius {
    /// Pre-exponential factor (1/min)
    pub k0: f64,
    /// Activation energy (J/mol)
    pub Ea: f64,
}

impl ReactionRate for FirstOrderArrhenius {
    fn rate(&self, state: &State) -> f64 {
        self.k0 * (-self.Ea / (R_G * state.T)).exp() * state.Ca
    }
    fn rate_expr(&self, Ca: &Expr, T: &Expr) -> Expr {
        let k0 = Expr::Const(self.k0);
        let Ea = Expr::Const(self.Ea);
        let R_sym = Expr::Const(R_G);
        k0 * Expr::Exp(Box::new(-Ea / (R_sym * T.clone()))) * Ca.clone()
    }
}

/// All rate laws the reactor model can be built with
#[enum_dispatch(ReactionRate)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RateLaw {
    NoReaction,
    FirstOrderArrhenius,
}

impl Default for RateLaw {
    fn default() -> Self {
        RateLaw::NoReaction(NoReaction)
    }
}

/// Mass, species and energy balances of the tank
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactorModel {
    pub rate_law: RateLaw,
}

impl ReactorModel {
    pub fn new(rate_law: RateLaw) -> Self {
        Self { rate_law }
    }

    /// Time derivatives of (V, Ca, T).
    ///
    /// `_t` is not used by the balances; it is part of the signature because ODE right-hand
    /// sides are functions of time. The caller keeps V away from zero.
    pub fn derivatives(&self, state: &State, _t: f64, inputs: &ExogenousInputs) -> State {
        let State { V, Ca, T } = *state;
        let ExogenousInputs { q, qf, Caf, Tf } = *inputs;
        let rA = self.rate_law.rate(state);
        // Mass Balance
        let dVdt = qf - q;
        // Species Balance
        let dCadt = (qf * Caf - q * Ca) / V - rA - Ca * dVdt / V;
        // Energy Balance
        let dTdt = (qf * Tf - q * T) / V - T * dVdt / V;
        State::new(dVdt, dCadt, dTdt)
    }

    /// Balances as symbolic right-hand sides in the order of [`UNKNOWNS`].
    ///
    /// The inputs are frozen into constants, so the system is only valid over one segment.
    pub fn symbolic_rhs(&self, inputs: &ExogenousInputs) -> Vec<Expr> {
        let ExogenousInputs { q, qf, Caf, Tf } = *inputs;
        let V = Expr::Var(UNKNOWNS[0].to_string());
        let Ca = Expr::Var(UNKNOWNS[1].to_string());
        let T = Expr::Var(UNKNOWNS[2].to_string());

        let dVdt = Expr::Const(qf - q);
        let rA = self.rate_law.rate_expr(&Ca, &T);
        let RHS_Ca = (Expr::Const(qf * Caf) - Expr::Const(q) * Ca.clone()) / V.clone()
            - rA
            - Ca * dVdt.clone() / V.clone();
        let RHS_T =
            (Expr::Const(qf * Tf) - Expr::Const(q) * T.clone()) / V.clone() - T * dVdt.clone() / V;
        vec![dVdt, RHS_Ca, RHS_T]
    }
}
