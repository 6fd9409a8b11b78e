pub mod parser;
pub mod pdf;
