//! Services composing the ports into user-facing operations.

pub mod vector;
