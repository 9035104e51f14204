//! # Output of CSTR Simulations
//!
//! Formatted tables (prettytable), the comma-delimited result file and terminal plots
//! of the state trajectory.
use super::cstr_task::{CstrResult, CstrTask, SolverConfig};
use super::segmented_integrator::CstrError;
use RustedSciThe::Utils::plots::plots_terminal;
use log::info;
use nalgebra::{DMatrix, DVector};
use prettytable::{Cell, Row, Table, row};
use std::fs::File;
use std::io::{BufWriter, Write};

/// column names of the result table in file order
pub const COLUMNS: [&str; 8] = ["t", "qf", "q", "Tf", "Caf", "V", "Ca", "T"];

impl CstrResult {
    /// Writes one comma-delimited row per grid point, `(t, qf, q, Tf, Caf, V, Ca, T)`,
    /// in scientific notation and without a header line
    pub fn save_result(&self, file_name: &str) -> Result<(), CstrError> {
        let file = File::create(file_name)?;
        let mut writer = BufWriter::new(file);
        self.write_table(&mut writer)?;
        writer.flush()?;
        info!("{} rows saved to '{}'", self.len(), file_name);
        Ok(())
    }

    pub fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CstrError> {
        for row in self.rows() {
            let line = row
                .iter()
                .map(|x| format!("{:.18e}", x))
                .collect::<Vec<_>>()
                .join(",");
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    /// states as a matrix: rows are time points, columns V, Ca, T
    pub fn states_matrix(&self) -> DMatrix<f64> {
        let n = self.len();
        DMatrix::from_fn(n, 3, |i, j| {
            let s = &self.trajectory.states[i];
            match j {
                0 => s.V,
                1 => s.Ca,
                _ => s.T,
            }
        })
    }

    /// inputs as a matrix: rows are time points, columns qf, q, Caf, Tf
    pub fn inputs_matrix(&self) -> DMatrix<f64> {
        let n = self.len();
        DMatrix::from_fn(n, 4, |i, j| match j {
            0 => self.inputs.qf[i],
            1 => self.inputs.q[i],
            2 => self.inputs.Caf[i],
            _ => self.inputs.Tf[i],
        })
    }

    /// Plots V, Ca and T against time in the terminal, then the input waveforms
    pub fn plot_in_terminal(&self) {
        let t = DVector::from_vec(self.t[..self.len()].to_vec());
        plots_terminal(
            "t".to_string(),
            vec!["V".to_string(), "Ca".to_string(), "T".to_string()],
            t.clone(),
            self.states_matrix(),
        );
        plots_terminal(
            "t".to_string(),
            vec![
                "qf".to_string(),
                "q".to_string(),
                "Caf".to_string(),
                "Tf".to_string(),
            ],
            t,
            self.inputs_matrix(),
        )
    }

    /// Prints every `every`-th row of the table and always the last one
    pub fn pretty_print(&self, every: usize) {
        let every = every.max(1);
        let mut table = Table::new();
        table.add_row(Row::new(COLUMNS.iter().map(|c| Cell::new(c)).collect()));
        let rows = self.rows();
        let last = rows.len().saturating_sub(1);
        for (i, r) in rows.iter().enumerate() {
            if i % every == 0 || i == last {
                table.add_row(Row::new(
                    r.iter().map(|x| Cell::new(&format!("{:.4}", x))).collect(),
                ));
            }
        }
        table.printstd();
    }
}

impl CstrTask {
    /// Displays the task configuration
    pub fn pretty_print_task(&self) {
        println!("\n=== CSTR TASK SUMMARY ===");
        println!("Problem Name: {:?}", self.config.problem_name);
        println!("Problem Description: {:?}", self.config.problem_description);

        let s0 = &self.config.initial_state;
        let mut table = Table::new();
        table.add_row(row!["Parameter", "Value", "Units"]);
        table.add_row(row!["Initial volume (V0)", format!("{:.4}", s0.V), "L"]);
        table.add_row(row!["Initial concentration (Ca0)", format!("{:.4}", s0.Ca), "mol/L"]);
        table.add_row(row!["Initial temperature (T0)", format!("{:.2}", s0.T), "K"]);
        table.add_row(row!["Start time (t0)", format!("{:.3}", self.config.time.t0), "min"]);
        table.add_row(row!["End time (t_end)", format!("{:.3}", self.config.time.t_end), "min"]);
        table.add_row(row!["Grid points", self.config.time.n_points, "-"]);
        println!("\nInitial and time conditions:");
        table.printstd();

        println!("\nInputs:");
        let mut input_table = Table::new();
        input_table.add_row(row!["Input", "Base", "Steps (index: value)", "Units"]);
        for (name, profile, units) in [
            ("q", &self.config.q, "L/min"),
            ("qf", &self.config.qf, "L/min"),
            ("Caf", &self.config.Caf, "mol/L"),
            ("Tf", &self.config.Tf, "K"),
        ] {
            let steps = profile
                .steps
                .iter()
                .map(|s| format!("{}: {}", s.at, s.value))
                .collect::<Vec<_>>()
                .join(", ");
            input_table.add_row(row![name, format!("{}", profile.base), steps, units]);
        }
        input_table.printstd();

        println!("\nReaction rate: {:?}", self.config.rate_law);
        match &self.config.solver {
            SolverConfig::Dopri5 { rtol, atol } => {
                println!("Solver: Dopri5, rtol = {:e}, atol = {:e}", rtol, atol)
            }
            SolverConfig::BDF {
                rtol,
                atol,
                max_step,
            } => println!(
                "Solver: BDF (RustedSciThe), rtol = {:e}, atol = {:e}, max_step = {}",
                rtol, atol, max_step
            ),
        }
        println!("\n=== END TASK SUMMARY ===\n");
    }

    /// Prints the result table, every `every`-th row
    pub fn pretty_print_result(&self, every: usize) -> Result<(), CstrError> {
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| CstrError::MissingData("no result, call solve() first".to_string()))?;
        println!("____________________RESULT_________________________");
        result.pretty_print(every);
        Ok(())
    }
}
