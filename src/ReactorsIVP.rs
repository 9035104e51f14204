//! # Reactor Initial Value Problem (IVP) Module
//!
//! Dynamic simulation of a continuous stirred tank reactor (CSTR) with variable volume.
//!
//! ## Mathematical Model
//!
//! ### Nomenclature
//!
//! | Symbol | Description | Units |
//! |--------|-------------|-------|
//! | `V` | Liquid volume in the tank | L |
//! | `Ca` | Concentration of species A | mol/L |
//! | `T` | Temperature of the tank contents | K |
//! | `q` | Outlet volumetric flowrate | L/min |
//! | `qf` | Inlet volumetric flowrate | L/min |
//! | `Caf` | Feed concentration of A | mol/L |
//! | `Tf` | Feed temperature | K |
//! | `rA` | Reaction rate of A | mol/(L·min) |
//!
//! ### Model Assumptions
//!
//! - The tank is perfectly mixed, outlet composition and temperature equal those of the tank
//! - Density and heat capacity are constant, no heat of reaction and no heat exchange
//! - Inputs are piecewise constant on the time grid
//!
//! ### Governing Equations
//!
//! ```text
//! dV/dt  = qf - q
//! dCa/dt = (qf·Caf - q·Ca)/V - rA - Ca·(dV/dt)/V
//! dT/dt  = (qf·Tf - q·T)/V - T·(dV/dt)/V
//! ```
//!
//! ## Numerical Solution
//!
//! The time grid is cut into segments on which the inputs are held at their value from the
//! left end point. Each segment is solved as a separate IVP started from the end state of the
//! previous one, either with an adaptive Dormand-Prince method ([ode_solvers](https://crates.io/crates/ode_solvers))
//! or with the BDF solver of [RustedSciThe](https://crates.io/crates/RustedSciThe) working on
//! the symbolic right-hand side.
//!
//! ## Modules
//! - `cstr_model`: state, inputs, reaction rate laws and the balance equations
//! - `ode_backends`: the `OdeSolver` trait and its two implementations
//! - `segmented_integrator`: segment-by-segment integration and error types
//! - `cstr_task`: task configuration, validation and solving
//! - `cstr_output`: tables, terminal plots and the result file

pub mod cstr_model;
pub mod cstr_output;
pub mod cstr_task;
mod cstr_tests;
pub mod ode_backends;
pub mod segmented_integrator;
