use crate::ReactorsIVP::cstr_model::{ExogenousInputs, FirstOrderArrhenius, RateLaw, ReactorModel, State};
use crate::ReactorsIVP::cstr_task::{CstrTask, CstrTaskConfig, SolverConfig};
use crate::ReactorsIVP::ode_backends::Dopri5Solver;
use crate::ReactorsIVP::segmented_integrator::{InputSeries, SegmentedIntegrator};
use crate::Utils::waveforms::{StepProfile, linspace};
use log::error;

pub fn cstr_examples(cstrtask: usize) {
    match cstrtask {
        0 => {
            // classic mixing tank: steps in qf at 50, Caf at 30 and Tf at 70 on a 100 point grid
            let mut task = CstrTask::new();
            task.pretty_print_task();
            match task.solve() {
                Ok(()) => {
                    if let Some(result) = task.get_result() {
                        result.pretty_print(10);
                        result.plot_in_terminal();
                    }
                    if let Err(e) = task.save_result() {
                        error!("{}", e);
                    }
                }
                Err(e) => error!("{}", e),
            }
        }
        1 => {
            // the same tank solved with BDF on the symbolic right-hand side
            let mut task = CstrTask::new();
            task.set_problem_name("CSTR mixing, BDF");
            task.set_solver(SolverConfig::BDF {
                rtol: 1e-8,
                atol: 1e-10,
                max_step: 0.01,
            });
            task.set_output_file("data_bdf.txt");
            match task.solve() {
                Ok(()) => {
                    if let Err(e) = task.pretty_print_result(10) {
                        error!("{}", e);
                    }
                }
                Err(e) => error!("{}", e),
            }
        }
        2 => {
            // first-order reaction A -> B, the feed temperature step speeds it up
            let mut task = CstrTask::new();
            task.set_problem_name("CSTR with A -> B");
            task.set_initial_state(1.0, 1.0, 300.0);
            task.set_time_grid(0.0, 10.0, 101);
            task.set_inputs(
                StepProfile::constant(1.0),
                StepProfile::constant(1.0),
                StepProfile::constant(1.0),
                StepProfile::constant(300.0).with_step(50, 350.0),
            );
            task.set_rate_law(RateLaw::FirstOrderArrhenius(FirstOrderArrhenius {
                k0: 1.0e5,
                Ea: 3.5e4,
            }));
            task.set_output_file("data_reaction.txt");
            task.pretty_print_task();
            match task.solve() {
                Ok(()) => {
                    if let Err(e) = task.pretty_print_result(10) {
                        error!("{}", e);
                    }
                    if let Some(result) = task.get_result() {
                        result.plot_in_terminal();
                    }
                }
                Err(e) => error!("{}", e),
            }
        }
        3 => {
            // integrator without a task: constant inputs, compared with the closed form
            let y0 = State::new(1.0, 0.0, 350.0);
            let u = ExogenousInputs::new(5.0, 5.2, 1.0, 300.0);
            let t = linspace(0.0, 1.0, 11);
            let inputs = InputSeries::constant(t.len(), u);
            let mut integrator =
                SegmentedIntegrator::new(ReactorModel::default(), Dopri5Solver::default());
            match integrator.integrate(&t, &inputs, y0) {
                Ok(trajectory) => {
                    for (ti, s) in t.iter().zip(trajectory.states.iter()) {
                        let V = y0.V + (u.qf - u.q) * ti;
                        let factor = (V / y0.V).powf(-u.qf / (u.qf - u.q));
                        let Ca = u.Caf - (u.Caf - y0.Ca) * factor;
                        let T = u.Tf - (u.Tf - y0.T) * factor;
                        println!(
                            "t = {:.2}: V = {:.6} ({:.6}), Ca = {:.6} ({:.6}), T = {:.4} ({:.4})",
                            ti, s.V, V, s.Ca, Ca, s.T, T
                        );
                    }
                }
                Err(e) => error!("{}", e),
            }
        }
        4 => {
            // task file round trip
            let file_name = "cstr_task_example.txt";
            let config = CstrTaskConfig::default();
            let text = match config.to_task_string() {
                Ok(text) => text,
                Err(e) => {
                    error!("{}", e);
                    return;
                }
            };
            if let Err(e) = std::fs::write(file_name, text) {
                error!("{}", e);
                return;
            }
            match CstrTask::from_file(file_name) {
                Ok(mut task) => {
                    task.pretty_print_task();
                    match task.solve() {
                        Ok(()) => {
                            if let Err(e) = task.pretty_print_result(20) {
                                error!("{}", e);
                            }
                        }
                        Err(e) => error!("{}", e),
                    }
                }
                Err(e) => error!("{}", e),
            }
        }
        _ => {
            println!("no such example: {}", cstrtask);
        }
    }
}
