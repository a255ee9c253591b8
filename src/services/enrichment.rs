use crate::data_provider::MarketDataProvider;
use crate::errors::{Result, WeeklysError};
use crate::models::ticker::{TickerMetrics, NOT_AVAILABLE};
use log::{debug, warn};

/// Looks up price, sector, beta, next earnings and at-the-money IV for one ticker.
///
/// Never fails. A failed info lookup yields [`TickerMetrics::degraded`]; a
/// failed calendar or option lookup only blanks that field.
pub async fn enrich_ticker<P>(provider: &P, symbol: &str, fetch_real_iv: bool) -> TickerMetrics
where
    P: MarketDataProvider + ?Sized,
{
    let info = match provider.fetch_info(symbol).await {
        Ok(info) => info,
        Err(e) => {
            warn!("Lookup failed for {}: {}", symbol, e);
            return TickerMetrics::degraded();
        }
    };

    let price = info.current_price.unwrap_or(0.0);
    let sector = info.sector.unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let earnings_date = match provider.fetch_earnings_calendar(symbol).await {
        Ok(dates) => dates.first().copied(),
        Err(e) => {
            debug!("No earnings calendar for {}: {}", symbol, e);
            None
        }
    };

    let implied_volatility = if fetch_real_iv {
        match fetch_at_the_money_iv(provider, symbol, price).await {
            Ok(iv) => iv,
            Err(e) => {
                debug!("No implied volatility for {}: {}", symbol, e);
                None
            }
        }
    } else {
        None
    };

    TickerMetrics {
        price,
        sector,
        beta: info.beta,
        earnings_date,
        implied_volatility,
    }
}

async fn fetch_at_the_money_iv<P>(provider: &P, symbol: &str, price: f64) -> Result<Option<f64>>
where
    P: MarketDataProvider + ?Sized,
{
    let expirations = provider.fetch_option_expirations(symbol).await?;
    let nearest = match expirations.first() {
        Some(expiration) => *expiration,
        None => return Ok(None),
    };

    let chain = provider.fetch_option_chain(symbol, nearest).await?;
    let call = chain
        .at_the_money_call(price)
        .ok_or_else(|| WeeklysError::DataError(format!("empty call chain for {}", symbol)))?;

    debug!("{} ATM call {} strike {}", symbol, call.contract_symbol, call.strike);
    Ok(call.implied_volatility.filter(|iv| iv.is_finite()))
}
