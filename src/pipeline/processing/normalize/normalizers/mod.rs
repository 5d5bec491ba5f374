// Shared row assembly and bookkeeping
pub mod base;

// Individual normalizer implementations
pub mod mass_shootings;
pub mod school_shootings;

pub use mass_shootings::MassShootingsNormalizer;
pub use school_shootings::SchoolShootingsNormalizer;
