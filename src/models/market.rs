use chrono::{DateTime, Utc};

/// Quote/info lookup result. Every field may be absent upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerInfo {
    pub current_price: Option<f64>,
    pub sector: Option<String>,
    pub beta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionContract {
    pub contract_symbol: String,
    pub strike: f64,
    pub implied_volatility: Option<f64>,
}

/// Calls for a single expiration.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionChain {
    pub expiration: DateTime<Utc>,
    pub calls: Vec<OptionContract>,
}

impl OptionChain {
    /// Call whose strike is closest to `price`. Ties keep the first one seen;
    /// contracts with a non-finite strike are skipped.
    pub fn at_the_money_call(&self, price: f64) -> Option<&OptionContract> {
        let mut best: Option<(&OptionContract, f64)> = None;
        for contract in &self.calls {
            if !contract.strike.is_finite() {
                continue;
            }
            let distance = (contract.strike - price).abs();
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((contract, distance)),
            }
        }
        best.map(|(contract, _)| contract)
    }
}
