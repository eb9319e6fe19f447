pub mod help;
pub mod plan;
pub mod run;
pub mod schema;
