pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod tools;
