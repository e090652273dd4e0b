pub mod agents;
pub mod run;
pub mod tools;
pub mod version;
