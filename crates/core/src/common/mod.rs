pub mod time;

/// # Summary
/// 规范化交易对代码。
///
/// # Logic
/// 去除首尾空白并统一转为大写，保证 `eurusd` 与 `EURUSD` 命中同一份数据集与同一个交易对记录。
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" eurusd "), "EURUSD");
        assert_eq!(normalize_symbol("GBPJPY"), "GBPJPY");
    }
}
