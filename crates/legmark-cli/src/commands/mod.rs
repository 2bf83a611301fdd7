pub mod amend;
pub mod batch;
pub mod convert;
pub mod extract;
pub mod questions;
