mod engine;
mod tier;
mod types;

pub use engine::{
    MAX_HORIZON_YEARS, PERIODS_PER_YEAR, accumulate_yearly_series, horizon_years, periodic_rate,
    run_projection, yearly_series,
};
pub use tier::{Tier, classify};
pub use types::{
    ProjectionInput, ProjectionResult, RawProjectionInput, YearPoint, coerce_integer, coerce_real,
};
