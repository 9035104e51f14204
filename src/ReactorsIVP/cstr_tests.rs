#[cfg(test)]
mod tests {
    use crate::ReactorsIVP::cstr_model::{
        ExogenousInputs, FirstOrderArrhenius, RateLaw, ReactorModel, State,
    };
    use crate::ReactorsIVP::cstr_task::{CstrTask, CstrTaskConfig, SolverConfig};
    use crate::ReactorsIVP::ode_backends::{
        Dopri5Solver, OdeSolver, SegmentSamples, check_segment_end,
    };
    use crate::ReactorsIVP::segmented_integrator::{CstrError, InputSeries, SegmentedIntegrator};
    use crate::Utils::waveforms::{StepProfile, linspace};
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    /// closed form for constant inputs: V is linear, Ca and T relax toward the feed as
    /// (feed - x) ~ (V/V0)^(-qf/(qf-q))
    fn closed_form(y0: State, u: ExogenousInputs, t: f64) -> State {
        let a = u.qf - u.q;
        let V = y0.V + a * t;
        let factor = if a == 0.0 {
            (-u.qf * t / y0.V).exp()
        } else {
            (V / y0.V).powf(-u.qf / a)
        };
        State::new(
            V,
            u.Caf - (u.Caf - y0.Ca) * factor,
            u.Tf - (u.Tf - y0.T) * factor,
        )
    }

    fn dopri5_integrator() -> SegmentedIntegrator<Dopri5Solver> {
        SegmentedIntegrator::new(ReactorModel::default(), Dopri5Solver::default())
    }

    #[test]
    fn test_reference_segment_matches_closed_form() {
        let y0 = State::new(1.0, 0.0, 350.0);
        let u = ExogenousInputs::new(5.0, 5.2, 1.0, 300.0);
        let inputs = InputSeries::constant(2, u);
        let trajectory = dopri5_integrator()
            .integrate(&[0.0, 1.0], &inputs, y0)
            .unwrap();
        assert_eq!(trajectory.len(), 2);
        let expected = closed_form(y0, u, 1.0);
        let end = trajectory[1];
        assert_relative_eq!(end.V, expected.V, max_relative = 1e-6);
        assert_relative_eq!(end.Ca, expected.Ca, max_relative = 1e-6);
        assert_relative_eq!(end.T, expected.T, max_relative = 1e-6);
        // inflow exceeds outflow, the tank fills and cools toward the feed temperature
        assert!(end.V > y0.V);
        assert!(end.T < y0.T && end.T > 300.0);
    }

    #[test]
    fn test_fine_grid_follows_closed_form_and_is_monotone() {
        let y0 = State::new(1.0, 0.0, 350.0);
        let u = ExogenousInputs::new(5.0, 5.2, 1.0, 300.0);
        let t = linspace(0.0, 1.0, 11);
        let inputs = InputSeries::constant(t.len(), u);
        let trajectory = dopri5_integrator().integrate(&t, &inputs, y0).unwrap();
        for (i, ti) in t.iter().enumerate() {
            let expected = closed_form(y0, u, *ti);
            assert_relative_eq!(trajectory[i].V, expected.V, max_relative = 1e-6);
            assert_relative_eq!(trajectory[i].Ca, expected.Ca, max_relative = 1e-6, epsilon = 1e-12);
            assert_relative_eq!(trajectory[i].T, expected.T, max_relative = 1e-6);
        }
        let V = trajectory.V();
        assert!(V.windows(2).all(|w| w[1] > w[0]));
        let T = trajectory.T();
        assert!(T.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_steady_state_is_preserved() {
        let y0 = State::new(2.0, 0.4, 330.0);
        let u = ExogenousInputs::new(3.0, 3.0, 0.4, 330.0);
        let t = linspace(0.0, 5.0, 21);
        let inputs = InputSeries::constant(t.len(), u);
        let trajectory = dopri5_integrator().integrate(&t, &inputs, y0).unwrap();
        for s in &trajectory.states {
            assert_eq!(*s, y0);
        }
    }

    #[test]
    fn test_mass_balance_closure_per_segment() {
        let t = linspace(0.0, 2.0, 9);
        let n = t.len();
        let qf = StepProfile::constant(5.2).with_step(3, 4.6).sample(n);
        let q = StepProfile::constant(5.0).with_step(6, 5.5).sample(n);
        let inputs = InputSeries::new(q.clone(), qf.clone(), vec![1.0; n], vec![300.0; n]);
        let trajectory = dopri5_integrator()
            .integrate(&t, &inputs, State::new(1.0, 0.0, 350.0))
            .unwrap();
        for i in 0..n - 1 {
            let dt = t[i + 1] - t[i];
            assert_relative_eq!(
                trajectory[i + 1].V - trajectory[i].V,
                (qf[i] - q[i]) * dt,
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn test_initial_point_is_bit_for_bit() {
        let y0 = State::new(1.0 / 3.0, 0.1 + 0.2, 350.000_000_1);
        let t = linspace(0.0, 1.0, 4);
        let inputs = InputSeries::constant(t.len(), ExogenousInputs::new(5.0, 5.2, 1.0, 300.0));
        let trajectory = dopri5_integrator().integrate(&t, &inputs, y0).unwrap();
        assert_eq!(trajectory.len(), t.len());
        assert_eq!(trajectory[0].V.to_bits(), y0.V.to_bits());
        assert_eq!(trajectory[0].Ca.to_bits(), y0.Ca.to_bits());
        assert_eq!(trajectory[0].T.to_bits(), y0.T.to_bits());
    }

    #[test]
    fn test_causality_of_input_changes() {
        let t = linspace(0.0, 3.0, 13);
        let n = t.len();
        let y0 = State::new(1.0, 0.0, 350.0);
        let base = InputSeries::constant(n, ExogenousInputs::new(5.0, 5.2, 1.0, 300.0));
        let k = 6;
        let mut altered = base.clone();
        altered.qf[k] = 6.0;
        altered.Caf[k] = 0.2;
        altered.Tf[k] = 360.0;

        let a = dopri5_integrator().integrate(&t, &base, y0).unwrap();
        let b = dopri5_integrator().integrate(&t, &altered, y0).unwrap();
        assert_eq!(a.states[..=k], b.states[..=k]);
        assert_ne!(a[k + 1], b[k + 1]);
    }

    #[test]
    fn test_step_response_relaxes_to_new_feed() {
        // Caf drops at index 5; Ca follows it down with the dilution time constant
        let t = linspace(0.0, 4.0, 41);
        let n = t.len();
        let Caf = StepProfile::constant(1.0).with_step(5, 0.5).sample(n);
        let inputs = InputSeries::new(vec![5.0; n], vec![5.0; n], Caf, vec![300.0; n]);
        let trajectory = dopri5_integrator()
            .integrate(&t, &inputs, State::new(1.0, 1.0, 300.0))
            .unwrap();
        assert_relative_eq!(trajectory[5].Ca, 1.0, epsilon = 1e-9);
        let u = ExogenousInputs::new(5.0, 5.0, 0.5, 300.0);
        let expected = closed_form(trajectory[5], u, t[40] - t[5]);
        assert_relative_eq!(trajectory[40].Ca, expected.Ca, max_relative = 1e-6);
        assert!(trajectory[40].Ca < 0.51);
    }

    #[test]
    fn test_reaction_lowers_concentration() {
        let t = linspace(0.0, 2.0, 21);
        let n = t.len();
        let inputs = InputSeries::constant(n, ExogenousInputs::new(1.0, 1.0, 1.0, 350.0));
        let y0 = State::new(1.0, 1.0, 350.0);
        let mixing = dopri5_integrator().integrate(&t, &inputs, y0).unwrap();
        let mut reacting = SegmentedIntegrator::new(
            ReactorModel::new(RateLaw::FirstOrderArrhenius(FirstOrderArrhenius {
                k0: 1.0,
                Ea: 0.0,
            })),
            Dopri5Solver::default(),
        );
        let reacting = reacting.integrate(&t, &inputs, y0).unwrap();
        assert_relative_eq!(mixing[n - 1].Ca, 1.0, epsilon = 1e-9);
        // steady state of dCa/dt = q(Caf - Ca)/V - k*Ca is Caf*q/(q + k V) = 0.5
        assert!(reacting[n - 1].Ca < 1.0);
        assert!(reacting[n - 1].Ca > 0.5);
        assert_eq!(mixing.T(), reacting.T());
    }

    #[test]
    fn test_bad_feed_reports_failing_segment() {
        let t = vec![0.0, 0.1, 0.2, 0.3, 0.4];
        let mut inputs = InputSeries::constant(5, ExogenousInputs::new(5.0, 5.2, 1.0, 300.0));
        inputs.Tf[2] = f64::NAN;
        let y0 = State::new(1.0, 0.0, 350.0);
        let err = dopri5_integrator().integrate(&t, &inputs, y0).unwrap_err();
        let segment = err.failed_segment().unwrap();
        assert_eq!(segment, 2);
        let partial = err.partial_trajectory().unwrap();
        assert_eq!(partial.len(), 3);
        assert_eq!(partial[0], y0);
        assert_relative_eq!(partial[2].V, 1.04, epsilon = 1e-10);
        assert!(matches!(
            err,
            CstrError::SolverDivergence { .. } | CstrError::Domain { .. }
        ));
    }

    //////////////////////////////////////TASK///////////////////////////////////////////

    #[test]
    fn test_default_task_solves_classic_scenario() {
        let mut task = CstrTask::new();
        task.solve().unwrap();
        let result = task.get_result().unwrap();
        assert_eq!(result.len(), 100);
        let rows = result.rows();
        assert_eq!(rows[0], [0.0, 5.2, 5.0, 300.0, 1.0, 1.0, 0.0, 350.0]);
        assert_eq!(rows[50][1], 5.1);
        assert_eq!(rows[30][4], 0.5);
        assert_eq!(rows[70][3], 325.0);
        // V grows with 0.2 L/min for 50 points and 0.1 L/min afterwards
        let t = &result.t;
        let expected_V = 1.0 + 0.2 * t[50] + 0.1 * (t[99] - t[50]);
        assert_relative_eq!(rows[99][5], expected_V, epsilon = 1e-9);
        // after the Tf step the temperature heads toward 325 K
        assert!(rows[99][7] > 320.0 && rows[99][7] < 325.0);
        assert!(rows[99][6] > 0.49 && rows[99][6] < 0.51);
    }

    #[test]
    fn test_task_rejects_bad_configuration() {
        let mut task = CstrTask::new();
        task.set_time_grid(1.0, 0.0, 10);
        assert!(matches!(task.solve(), Err(CstrError::Configuration(_))));
        assert!(task.get_result().is_none());

        let mut task = CstrTask::new();
        task.set_time_grid(0.0, 1.0, 0);
        assert!(matches!(task.check_task(), Err(CstrError::Configuration(_))));

        let mut task = CstrTask::new();
        task.set_solver(SolverConfig::Dopri5 {
            rtol: 0.0,
            atol: 1e-9,
        });
        assert!(matches!(task.check_task(), Err(CstrError::Configuration(_))));
    }

    #[test]
    fn test_single_point_task() {
        let mut task = CstrTask::new();
        task.set_time_grid(0.0, 0.0, 1);
        task.solve().unwrap();
        let result = task.get_result().unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.trajectory[0], task.config.initial_state);
    }

    #[test]
    fn test_failed_task_keeps_partial_result() {
        let mut task = CstrTask::new();
        task.set_time_grid(0.0, 0.4, 5);
        task.set_inputs(
            StepProfile::constant(5.0),
            StepProfile::constant(5.2),
            StepProfile::constant(1.0),
            StepProfile::constant(300.0).with_step(2, f64::NAN),
        );
        assert!(task.solve().is_err());
        let result = task.get_result().unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.rows().len(), 3);
    }

    #[test]
    fn test_save_result_writes_aligned_rows() {
        let mut task = CstrTask::new();
        task.set_time_grid(0.0, 1.0, 6);
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        task.set_output_file(path.to_str().unwrap());
        task.solve().unwrap();
        task.save_result().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 6);
        let first: Vec<f64> = lines[0]
            .split(',')
            .map(|x| x.parse::<f64>().unwrap())
            .collect();
        assert_eq!(first, vec![0.0, 5.2, 5.0, 300.0, 1.0, 1.0, 0.0, 350.0]);
        let last: Vec<f64> = lines[5]
            .split(',')
            .map(|x| x.parse::<f64>().unwrap())
            .collect();
        assert_eq!(last.len(), 8);
        assert_eq!(last[0], 1.0);
    }

    #[test]
    fn test_plot_matrices_follow_result_rows() {
        let mut task = CstrTask::new();
        task.solve().unwrap();
        let result = task.get_result().unwrap();
        let states = result.states_matrix();
        let inputs = result.inputs_matrix();
        assert_eq!(states.shape(), (100, 3));
        assert_eq!(inputs.shape(), (100, 4));
        let rows = result.rows();
        for i in [0, 29, 30, 50, 70, 99] {
            assert_eq!(inputs[(i, 0)], rows[i][1]);
            assert_eq!(inputs[(i, 1)], rows[i][2]);
            assert_eq!(inputs[(i, 2)], rows[i][4]);
            assert_eq!(inputs[(i, 3)], rows[i][3]);
            assert_eq!(states[(i, 1)], rows[i][6]);
        }
        assert_eq!(inputs[(29, 2)], 1.0);
        assert_eq!(inputs[(30, 2)], 0.5);
    }

    #[test]
    fn test_save_without_solution_is_an_error() {
        let task = CstrTask::new();
        assert!(matches!(task.save_result(), Err(CstrError::MissingData(_))));
        assert!(matches!(
            task.pretty_print_result(10),
            Err(CstrError::MissingData(_))
        ));
    }

    #[test]
    fn test_bdf_task_follows_closed_form() {
        let y0 = State::new(1.0, 0.0, 350.0);
        let u = ExogenousInputs::new(5.0, 5.2, 1.0, 300.0);
        let mut task = CstrTask::new();
        task.set_initial_state(y0.V, y0.Ca, y0.T);
        task.set_time_grid(0.0, 1.0, 6);
        task.set_inputs(
            StepProfile::constant(u.q),
            StepProfile::constant(u.qf),
            StepProfile::constant(u.Caf),
            StepProfile::constant(u.Tf),
        );
        task.set_solver(SolverConfig::BDF {
            rtol: 1e-8,
            atol: 1e-10,
            max_step: 0.01,
        });
        task.solve().unwrap();
        let result = task.get_result().unwrap();
        assert_eq!(result.len(), 6);
        for (i, ti) in result.t.iter().enumerate() {
            let expected = closed_form(y0, u, *ti);
            let s = result.trajectory[i];
            assert_relative_eq!(s.V, expected.V, max_relative = 1e-4);
            assert_relative_eq!(s.Ca, expected.Ca, max_relative = 1e-4, epsilon = 1e-6);
            assert_relative_eq!(s.T, expected.T, max_relative = 1e-4);
        }
    }

    #[test]
    fn test_bdf_task_keeps_steady_state() {
        let mut task = CstrTask::new();
        task.set_initial_state(2.0, 0.5, 320.0);
        task.set_time_grid(0.0, 0.5, 4);
        task.set_inputs(
            StepProfile::constant(3.0),
            StepProfile::constant(3.0),
            StepProfile::constant(0.5),
            StepProfile::constant(320.0),
        );
        task.set_solver(SolverConfig::BDF {
            rtol: 1e-8,
            atol: 1e-10,
            max_step: 0.01,
        });
        task.solve().unwrap();
        for s in &task.get_result().unwrap().trajectory.states {
            assert_relative_eq!(s.V, 2.0, epsilon = 1e-8);
            assert_relative_eq!(s.Ca, 0.5, epsilon = 1e-8);
            assert_relative_eq!(s.T, 320.0, epsilon = 1e-6);
        }
    }

    /// integrates correctly but gives up halfway through segment `stop_on`
    struct StoppingSolver {
        inner: Dopri5Solver,
        segment: usize,
        stop_on: usize,
    }

    impl OdeSolver for StoppingSolver {
        fn solve_segment(
            &mut self,
            model: &ReactorModel,
            t_span: (f64, f64),
            y0: State,
            inputs: &ExogenousInputs,
        ) -> Result<SegmentSamples, String> {
            let segment = self.segment;
            self.segment += 1;
            if segment != self.stop_on {
                return self.inner.solve_segment(model, t_span, y0, inputs);
            }
            let t_mid = 0.5 * (t_span.0 + t_span.1);
            let samples = self.inner.solve_segment(model, (t_span.0, t_mid), y0, inputs)?;
            check_segment_end(samples, t_span)
        }

        fn name(&self) -> &str {
            "stopping"
        }
    }

    #[test]
    fn test_backend_stopping_early_is_not_taken_as_segment_end() {
        let mut task = CstrTask::new();
        task.set_time_grid(0.0, 1.0, 6);
        task.build_inputs();
        let solver = StoppingSolver {
            inner: Dopri5Solver::default(),
            segment: 0,
            stop_on: 3,
        };
        let err = task.solve_with(solver).unwrap_err();
        match &err {
            CstrError::SolverDivergence {
                segment, message, ..
            } => {
                assert_eq!(*segment, 3);
                assert!(message.contains("before the segment end"), "{}", message);
            }
            other => panic!("expected solver divergence, got {:?}", other),
        }
        assert_eq!(task.get_result().unwrap().len(), 4);
    }

    #[test]
    fn test_task_file_round_trip() {
        let mut config = CstrTaskConfig::default();
        config.rate_law = RateLaw::FirstOrderArrhenius(FirstOrderArrhenius {
            k0: 1e5,
            Ea: 4e4,
        });
        let text = config.to_task_string().unwrap();
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "mixing tank with reaction").unwrap();
        write!(temp_file, "{}", text).unwrap();
        let task = CstrTask::from_file(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(task.config, config);
    }

    #[test]
    fn test_minimal_task_file_uses_defaults() {
        let text = r#"CSTR
{
  "initial_state": {"V": 1.0, "Ca": 0.0, "T": 350.0},
  "time": {"t0": 0.0, "t_end": 1.0, "n_points": 11},
  "q":   {"base": 5.0},
  "qf":  {"base": 5.2},
  "Caf": {"base": 1.0},
  "Tf":  {"base": 300.0, "steps": [{"at": 5, "value": 325.0}]}
}
"#;
        let config = CstrTaskConfig::from_task_str(text).unwrap();
        assert_eq!(config.solver, SolverConfig::default());
        assert_eq!(config.rate_law, RateLaw::default());
        assert!(config.output_file.is_none());
        let mut task = CstrTask::from_config(config);
        task.solve().unwrap();
        assert_eq!(task.inputs.Tf[4], 300.0);
        assert_eq!(task.inputs.Tf[5], 325.0);
    }
}
