mod value;
pub use value::Value;

mod experiment;
pub use experiment::Experiment;

mod table;
pub use table::{ObservationTable, RowIndex};

mod hypothesis;
pub use hypothesis::*;

mod counterexample;
pub use counterexample::*;

mod oracle;
pub use oracle::*;

mod options;
pub use options::{LearnerOptions, ITERATION_THRESHOLD};

mod lstar;
pub use lstar::*;
