pub const CSTR_ENG_HELPER: &'static str = "
                                General considerations. \n
The program simulates a continuous stirred tank reactor whose volume may change with time. Units are \n
liters, minutes, mol/L and Kelvin; keep them consistent, the program does not convert anything. \n
1) A task file is plain text. Everything above the header line is ignored, so notes and comments can go there. \n
The header is a single word, CSTR (REACTOR is also accepted), and is followed by a JSON object with the \n
fields described below. \n
2) Fields marked optional can be omitted, a default value is then used. \n

                                Fields \n
problem_name: \"%string%\" - optional, name of the problem. \n
problem_description: \"%string%\" - optional, description of the problem. \n
initial_state: {\"V\": %float%, \"Ca\": %float%, \"T\": %float%} - volume (L), concentration of A (mol/L) \n
        and temperature (K) at t0. \n
time: {\"t0\": %float%, \"t_end\": %float%, \"n_points\": %integer%} - uniform time grid (min). \n
        The grid has n_points points and n_points - 1 segments. \n
q, qf, Caf, Tf: {\"base\": %float%, \"steps\": [{\"at\": %integer%, \"value\": %float%}, ...]} - outlet and \n
        inlet flowrates (L/min), feed concentration (mol/L) and feed temperature (K). Each input starts at \n
        base and jumps to value from grid index at onward. steps is optional. \n
        The input at index i is held constant over the segment from t[i] to t[i+1]; the value at the last \n
        grid point is stored in the result table but never used by the solver. \n
rate_law: optional, {\"NoReaction\": null} (default) or {\"FirstOrderArrhenius\": {\"k0\": %float%, \"Ea\": %float%}} \n
        with rA = k0*exp(-Ea/(R*T))*Ca, Ea in J/mol. \n
solver: optional, {\"Dopri5\": {\"rtol\": 1e-10, \"atol\": 1e-12}} (default) or \n
        {\"BDF\": {\"rtol\": 1e-8, \"atol\": 1e-10, \"max_step\": 0.01}}. \n
output_file: \"%string%\" - optional, the result table is saved there (data.txt by default). \n

                                Result \n
One comma separated row per grid point: t, qf, q, Tf, Caf, V, Ca, T. \n
If the solver fails on some segment the rows computed before it are kept and the error names the segment. \n
";

/// complete task file, shown after the help text
pub const CSTR_TASK_EXAMPLE: &'static str = r#"# first-order reaction in a filling tank
CSTR
{
  "problem_name": "tank with A -> B",
  "initial_state": {"V": 1.0, "Ca": 1.0, "T": 300.0},
  "time": {"t0": 0.0, "t_end": 10.0, "n_points": 101},
  "q":   {"base": 1.0},
  "qf":  {"base": 1.2},
  "Caf": {"base": 1.0},
  "Tf":  {"base": 300.0, "steps": [{"at": 50, "value": 350.0}]},
  "rate_law": {"FirstOrderArrhenius": {"k0": 1e5, "Ea": 3.5e4}},
  "solver": {"BDF": {"rtol": 1e-8, "atol": 1e-10, "max_step": 0.01}},
  "output_file": "data_reaction.txt"
}
"#;
