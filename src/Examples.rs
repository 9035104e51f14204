#[allow(non_snake_case)]
pub mod cstr_examples;
