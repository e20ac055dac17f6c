pub mod line_ending;
