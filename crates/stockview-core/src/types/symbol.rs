//! 티커 심볼 정규화.
//!
//! 숫자로만 된 코드는 도쿄증권거래소 종목으로 간주하여 `.T` 접미사를 붙입니다.
//! HTTP 계층과 캐시 조회 모두 같은 규칙을 사용해야 캐시 키가 일치합니다.
//!
//! - "7203" → "7203.T"
//! - "7203.T" → "7203.T"
//! - "AAPL" → "AAPL"

use crate::error::CoreError;

/// 기본 시장(도쿄증권거래소) 접미사.
pub const DEFAULT_MARKET_SUFFIX: &str = ".T";

/// 기본 종목 (도요타 자동차).
pub const DEFAULT_SYMBOL: &str = "7203.T";

/// 심볼을 캐시/공급자 형식으로 정규화합니다.
///
/// 앞뒤 공백을 제거하고, 숫자로만 이루어진 코드에 기본 시장 접미사를 붙입니다.
/// 이미 정규화된 심볼에 다시 적용해도 결과가 같습니다.
pub fn normalize_symbol(raw: &str) -> String {
    let symbol = raw.trim();
    if !symbol.is_empty()
        && !symbol.ends_with(DEFAULT_MARKET_SUFFIX)
        && symbol.chars().all(|c| c.is_ascii_digit())
    {
        format!("{}{}", symbol, DEFAULT_MARKET_SUFFIX)
    } else {
        symbol.to_string()
    }
}

/// 심볼을 정규화하고 비어 있으면 에러를 반환합니다.
pub fn parse_symbol(raw: &str) -> Result<String, CoreError> {
    let symbol = normalize_symbol(raw);
    if symbol.is_empty() {
        return Err(CoreError::InvalidSymbol(raw.to_string()));
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_code_gets_suffix() {
        assert_eq!(normalize_symbol("7203"), "7203.T");
        assert_eq!(normalize_symbol(" 6758 "), "6758.T");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_symbol("7203");
        assert_eq!(normalize_symbol(&once), once);
        assert_eq!(normalize_symbol("7203.T"), "7203.T");
    }

    #[test]
    fn test_non_numeric_symbols_unchanged() {
        assert_eq!(normalize_symbol("AAPL"), "AAPL");
        assert_eq!(normalize_symbol("005930.KS"), "005930.KS");
        assert_eq!(normalize_symbol("^N225"), "^N225");
    }

    #[test]
    fn test_empty_symbol_rejected() {
        assert_eq!(normalize_symbol(""), "");
        assert!(parse_symbol("   ").is_err());
        assert_eq!(parse_symbol("7203").unwrap(), "7203.T");
    }
}
