// Domain layer - Core highlight logic

pub mod errors;
pub mod model;
pub mod rules;
