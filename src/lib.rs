pub mod catalog;
pub mod ce;
pub mod cli;
pub mod commands;
pub mod locus;
pub mod mixture;
pub mod ngs;
pub mod random;
pub mod utils;
