pub mod algorithms;
pub mod constants;
pub mod domain;
pub mod geometry;
pub mod index;
pub mod io;
pub mod logging;
pub mod point;
pub mod properties;
mod spherical;
pub mod time;
pub mod trajectory;
pub mod trajkit_errors;
pub mod uuid_factory;
