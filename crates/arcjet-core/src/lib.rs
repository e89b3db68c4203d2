pub mod color;
pub mod consts;
pub mod detection;
pub mod edge;
pub mod error;
pub mod filters;
pub mod fit;
pub mod flags;
pub mod frame;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod processor;
pub mod record;
pub mod reduce;
pub mod segment;
pub mod toi;
