//! Algorithms over propagated travel times: surfaces, accessibility and map
//! projection helpers.

pub mod accessibility;
pub mod mercator;
pub mod surface;
