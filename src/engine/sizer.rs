//liquidity and concentration bounds on order quantity

//maximum shares purchasable under both caps:
//capital cap = floor(cash * max_pct_of_capital / price)
//volume cap = floor(volume * max_pct_of_volume)
//the more conservative of the two binds
pub fn max_shares(
    available_cash: f64,
    price: f64,
    daily_volume: f64,
    max_pct_of_capital: f64,
    max_pct_of_volume: f64,
) -> u64 {
    if price <= 0.0 || available_cash <= 0.0 {
        return 0;
    }

    let capital_cap = (available_cash * max_pct_of_capital / price).floor() as u64;
    let volume_cap = (daily_volume * max_pct_of_volume).floor() as u64;

    capital_cap.min(volume_cap)
}

//shares purchasable with all available cash at the given price,
//leaving room for commission on the notional
pub fn affordable_shares(available_cash: f64, price: f64, commission_rate: f64) -> u64 {
    if price <= 0.0 || available_cash <= 0.0 {
        return 0;
    }

    (available_cash / (price * (1.0 + commission_rate))).floor() as u64
}
