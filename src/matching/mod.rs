pub mod clips;
pub mod common_run;
pub mod index;
pub mod recursion;
pub mod report;
pub mod scanner;
pub mod selection;
pub mod tokenization;
