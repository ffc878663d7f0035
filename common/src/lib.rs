pub mod hash;
pub mod random_number_generator;

pub use random_number_generator::XorShift128;
