// quizlink-common: shared types and wire protocol for the quizlink workspace

pub mod protocol;
pub mod types;
