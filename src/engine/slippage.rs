use crate::engine::execution::OrderSide;

//flat slippage applied when a bar reports zero volume
pub const ZERO_VOLUME_SLIPPAGE_PCT: f64 = 0.005;

//ceiling on the modeled market impact
pub const MAX_SLIPPAGE_PCT: f64 = 0.05;

//square-root market-impact model
//slippage_pct = min(impact_coefficient * sqrt(shares / daily_volume), 5%)
//falls back to a flat 0.5% when the bar has no volume to model against
pub fn slippage_amount(
    base_price: f64,
    daily_volume: f64,
    shares: u64,
    impact_coefficient: f64,
) -> f64 {
    if daily_volume <= 0.0 {
        return base_price * ZERO_VOLUME_SLIPPAGE_PCT;
    }

    let volume_fraction = shares as f64 / daily_volume;
    let slippage_pct = (impact_coefficient * volume_fraction.sqrt()).min(MAX_SLIPPAGE_PCT);

    base_price * slippage_pct
}

//buys pay above the base price, sells receive below it
pub fn executed_price(
    base_price: f64,
    daily_volume: f64,
    shares: u64,
    impact_coefficient: f64,
    side: OrderSide,
) -> f64 {
    let amount = slippage_amount(base_price, daily_volume, shares, impact_coefficient);

    match side {
        OrderSide::Buy => base_price + amount,
        OrderSide::Sell => base_price - amount,
    }
}
