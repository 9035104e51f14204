pub mod cli_cstr;
pub mod cli_examples;
pub mod cli_main;
pub mod cstr_help;
