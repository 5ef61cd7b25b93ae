pub mod board;
pub mod column;
pub mod comment;
pub mod project;
pub mod sprint;
pub mod task;
