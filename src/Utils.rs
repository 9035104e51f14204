pub mod load_from_file;
pub mod waveforms;
