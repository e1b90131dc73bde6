/// Profit on a flip, floored at zero so it can feed commission tiering directly.
///
/// Callers validate ranges beforehand; arithmetic saturates rather than overflowing.
pub fn calculate_profit(sale_price: i64, asking_price: i64, expenses: i64) -> i64 {
    sale_price
        .saturating_sub(asking_price)
        .saturating_sub(expenses)
        .max(0)
}
