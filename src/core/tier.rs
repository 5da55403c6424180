use serde::Serialize;

use super::types::ProjectionResult;

/// Qualitative bucket used to pick the message shown next to the results.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    NoHorizon,
    Exceptional,
    Excellent,
    Strong,
    Positive,
    Modest,
    #[serde(rename = "none")]
    NoReturn,
}

/// Thresholds are checked top to bottom and the first match wins.
pub fn classify(years: u32, yield_ratio: f64) -> Tier {
    if years == 0 {
        Tier::NoHorizon
    } else if yield_ratio > 500.0 {
        Tier::Exceptional
    } else if yield_ratio > 200.0 {
        Tier::Excellent
    } else if yield_ratio > 100.0 {
        Tier::Strong
    } else if yield_ratio > 50.0 {
        Tier::Positive
    } else if yield_ratio > 0.0 {
        Tier::Modest
    } else {
        Tier::NoReturn
    }
}

impl Tier {
    pub fn of(result: &ProjectionResult) -> Self {
        classify(result.years, result.yield_ratio)
    }

    pub fn icon(self) -> &'static str {
        match self {
            Tier::NoHorizon => "\u{23f3}",
            Tier::Exceptional => "\u{1f3c6}",
            Tier::Excellent => "\u{1f680}",
            Tier::Strong => "\u{1f4aa}",
            Tier::Positive => "\u{1f4c8}",
            Tier::Modest => "\u{1f331}",
            Tier::NoReturn => "\u{1f4a1}",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ProjectionInput, run_projection};

    #[test]
    fn zero_horizon_wins_over_any_yield() {
        assert_eq!(classify(0, 10_000.0), Tier::NoHorizon);
        assert_eq!(classify(0, 0.0), Tier::NoHorizon);
        assert_eq!(classify(0, -50.0), Tier::NoHorizon);
    }

    #[test]
    fn thresholds_are_strict_and_ordered() {
        assert_eq!(classify(10, 500.01), Tier::Exceptional);
        assert_eq!(classify(10, 500.0), Tier::Excellent);
        assert_eq!(classify(10, 200.0), Tier::Strong);
        assert_eq!(classify(10, 100.0), Tier::Positive);
        assert_eq!(classify(10, 50.0), Tier::Modest);
        assert_eq!(classify(10, 0.0), Tier::NoReturn);
        assert_eq!(classify(10, -12.0), Tier::NoReturn);
        assert_eq!(classify(10, f64::NAN), Tier::NoReturn);
    }

    #[test]
    fn forty_years_at_eight_percent_is_exceptional() {
        let result = run_projection(&ProjectionInput {
            initial_capital: 10_000.0,
            current_age: 20,
            target_age: 60,
            annual_rate: 8.0,
            monthly_contribution: 200.0,
        });
        let tier = Tier::of(&result);

        assert_eq!(tier, Tier::Exceptional);
        assert!(!tier.icon().is_empty());
    }

    #[test]
    fn tiers_serialize_in_kebab_case() {
        let json = serde_json::to_string(&[Tier::NoHorizon, Tier::NoReturn, Tier::Strong])
            .expect("tiers should serialize");
        assert_eq!(json, r#"["no-horizon","none","strong"]"#);
    }
}
