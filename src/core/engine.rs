use super::types::{ProjectionInput, ProjectionResult, YearPoint};

pub const PERIODS_PER_YEAR: u32 = 12;

/// Upper bound on the projection horizon. Wider age spans are cut to this
/// many years so the yearly series stays a human-lifespan length.
pub const MAX_HORIZON_YEARS: u32 = 150;

#[derive(Debug, Clone, Copy)]
struct Balance {
    total: f64,
    invested: f64,
}

/// Closed-form balance after `months` periods. Contributions are paid at the
/// end of each period (ordinary annuity).
fn balance_after(input: &ProjectionInput, periodic_rate: f64, months: f64) -> Balance {
    let growth = (1.0 + periodic_rate).powf(months);
    let capital = input.initial_capital * growth;
    let contributions = if periodic_rate > 0.0 {
        input.monthly_contribution * ((growth - 1.0) / periodic_rate)
    } else {
        input.monthly_contribution * months
    };

    Balance {
        total: capital + contributions,
        invested: input.initial_capital + input.monthly_contribution * months,
    }
}

pub fn horizon_years(input: &ProjectionInput) -> u32 {
    let span = input.target_age as i64 - input.current_age as i64;
    let span = span.clamp(0, MAX_HORIZON_YEARS as i64);
    u32::try_from(span).unwrap_or(MAX_HORIZON_YEARS)
}

pub fn periodic_rate(input: &ProjectionInput) -> f64 {
    input.annual_rate / 100.0 / PERIODS_PER_YEAR as f64
}

pub fn run_projection(input: &ProjectionInput) -> ProjectionResult {
    let years = horizon_years(input);
    let rate = periodic_rate(input);
    let total_months = years as f64 * PERIODS_PER_YEAR as f64;

    let end = balance_after(input, rate, total_months);
    let total_interest = end.total - end.invested;
    let yield_ratio = if end.invested > 0.0 {
        total_interest / end.invested * 100.0
    } else {
        0.0
    };

    ProjectionResult {
        final_value: end.total,
        total_invested: end.invested,
        total_interest,
        yield_ratio,
        monthly_rate: rate * 100.0,
        years,
        yearly_series: yearly_series(input),
    }
}

/// One point per year boundary, each computed directly from the closed form.
pub fn yearly_series(input: &ProjectionInput) -> Vec<YearPoint> {
    let years = horizon_years(input);
    let rate = periodic_rate(input);
    (0..=years)
        .map(|year| {
            let months = year as f64 * PERIODS_PER_YEAR as f64;
            let balance = balance_after(input, rate, months);
            YearPoint {
                age: input.current_age as i64 + year as i64,
                total: balance.total,
                invested: balance.invested,
            }
        })
        .collect()
}

/// Same series as [`yearly_series`], stepped month by month.
pub fn accumulate_yearly_series(input: &ProjectionInput) -> Vec<YearPoint> {
    let years = horizon_years(input);
    let rate = periodic_rate(input);
    let mut capital = input.initial_capital;
    let mut contributions = 0.0;
    let mut invested = input.initial_capital;
    let mut series = Vec::with_capacity(years as usize + 1);

    series.push(YearPoint {
        age: input.current_age as i64,
        total: capital,
        invested,
    });
    for year in 1..=years {
        for _ in 0..PERIODS_PER_YEAR {
            capital *= 1.0 + rate;
            contributions = if rate > 0.0 {
                contributions * (1.0 + rate) + input.monthly_contribution
            } else {
                contributions + input.monthly_contribution
            };
            invested += input.monthly_contribution;
        }
        series.push(YearPoint {
            age: input.current_age as i64 + year as i64,
            total: capital + contributions,
            invested,
        });
    }
    series
}
