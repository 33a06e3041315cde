pub mod cell;
pub mod entity;
pub mod maze;
pub mod rules;
