pub mod coadd;

pub use coadd::{coadd, CoaddMode};
