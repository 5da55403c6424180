use super::format::{format_currency, format_percent};
use crate::core::{ProjectionResult, Tier};

/// Sentence shown under the results for the projection's tier.
pub fn tier_message(tier: Tier, result: &ProjectionResult) -> String {
    match tier {
        Tier::NoHorizon => "Adjust your target age to project your savings over time.".to_string(),
        Tier::Exceptional => format!(
            "Impressive! Your interest amounts to {} of what you invested. Compound interest is your best ally!",
            format_percent(result.yield_ratio)
        ),
        Tier::Excellent => format!(
            "Excellent! Your money will multiply significantly. In {} years you will have {}.",
            result.years,
            format_currency(result.final_value)
        ),
        Tier::Strong => {
            "Very good! You will double your investment. Consistency and time are the keys to financial success."
                .to_string()
        }
        Tier::Positive => format!(
            "On the right track! Your savings will grow {} beyond what you invest.",
            format_percent(result.yield_ratio)
        ),
        Tier::Modest => {
            "Every peso counts. With consistency and time, you will see your savings grow.".to_string()
        }
        Tier::NoReturn => {
            "Start investing today. The best time to start was yesterday, the second best is now!"
                .to_string()
        }
    }
}
