pub mod individual;
pub mod population;

pub use individual::Individual;
pub use population::Population;
