//! 시그널 정규화.
//!
//! 차트/알림 서비스가 보내는 웹훅 페이로드는 필드 이름과 타입이
//! 제각각입니다 (수량이 `volume`/`lots`/`lot_size`/`size` 중 하나로,
//! 숫자 또는 숫자 문자열로 옴). 여기서 전부 canonical한
//! [`TradeIntent`]로 맞춥니다. venue 호출은 일절 하지 않습니다.

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use bridge_core::{normalize_volume, Direction, ErrorKind, PositionSide, TradeIntent};

/// 수량 필드 별칭 (우선순위 순).
const VOLUME_ALIASES: [&str; 4] = ["volume", "lots", "lot_size", "size"];

/// 정규화 실패.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// 필수 필드 누락 (누락된 필드 이름 포함)
    #[error("필수 필드 누락: {0}")]
    MissingField(String),

    /// 알 수 없는 action 값
    #[error("알 수 없는 action: {0}")]
    InvalidAction(String),

    /// 수량 파싱 실패 또는 허용 범위 초과
    #[error("유효하지 않은 수량: {0}")]
    InvalidVolume(String),

    /// 가격 필드(손절/익절) 파싱 실패
    #[error("유효하지 않은 가격: {0}")]
    InvalidPrice(String),
}

impl NormalizeError {
    /// 최상위 에러 분류로 매핑.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NormalizeError::MissingField(_) => ErrorKind::MissingField,
            NormalizeError::InvalidAction(_) => ErrorKind::InvalidAction,
            NormalizeError::InvalidVolume(_) | NormalizeError::InvalidPrice(_) => {
                ErrorKind::InvalidVolume
            }
        }
    }
}

/// 웹훅 페이로드를 [`TradeIntent`]로 정규화.
///
/// - `symbol`: 필수. 공백 제거 후 대문자화.
/// - `action`: 필수. 대소문자 무시, `BUY|SELL|LONG|SHORT|CLOSE`.
/// - 수량: `volume`/`lots`/`lot_size`/`size` 중 먼저 발견되는 값.
///   전부 없으면 `default_volume` 사용.
/// - `close_existing`: bool 또는 truthy 문자열(`"true"/"1"/"yes"/"on"`).
///   기본 true.
/// - `side`: CLOSE 요청의 방향 필터 (선택).
///
/// # Errors
///
/// venue를 호출하기 전에 판정 가능한 검증 에러만 반환합니다.
pub fn normalize(payload: &Value, default_volume: Decimal) -> Result<TradeIntent, NormalizeError> {
    let symbol = extract_string(payload, "symbol");
    let action = extract_string(payload, "action");

    // 누락 필드는 한 번에 모아서 보고
    let missing: Vec<&str> = [("symbol", &symbol), ("action", &action)]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| name)
        .collect();
    if !missing.is_empty() {
        return Err(NormalizeError::MissingField(missing.join(", ")));
    }

    // 위에서 None 검사를 마쳤으므로 여기서는 항상 Some
    let symbol = match symbol {
        Some(s) => s.trim().to_uppercase(),
        None => return Err(NormalizeError::MissingField("symbol".to_string())),
    };
    let action = match action {
        Some(a) => a,
        None => return Err(NormalizeError::MissingField("action".to_string())),
    };

    let direction = parse_direction(&action)?;
    let volume = resolve_volume(payload, default_volume)?;

    let mut intent = TradeIntent::new(symbol, direction, volume)
        .with_close_existing(parse_close_existing(payload.get("close_existing")));

    // 손절/익절은 선택이지만, 보낸 값이 깨져 있으면 보호 주문 없이
    // 체결되는 것보다 즉시 거부하는 편이 안전함
    if let Some(price) = optional_price(payload, "stop_loss")? {
        intent = intent.with_stop_loss(price);
    }
    if let Some(price) = optional_price(payload, "take_profit")? {
        intent = intent.with_take_profit(price);
    }

    if direction == Direction::CloseOnly {
        if let Some(side) = parse_close_side(payload.get("side"))? {
            intent = intent.with_close_side(side);
        }
    }

    Ok(intent)
}

/// 비어 있지 않은 문자열 필드 추출.
fn extract_string(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_direction(action: &str) -> Result<Direction, NormalizeError> {
    match action.to_uppercase().as_str() {
        "BUY" | "LONG" => Ok(Direction::Buy),
        "SELL" | "SHORT" => Ok(Direction::Sell),
        "CLOSE" => Ok(Direction::CloseOnly),
        other => Err(NormalizeError::InvalidAction(other.to_string())),
    }
}

/// 별칭 목록에서 수량을 찾아 정규화. 없으면 기본 수량.
fn resolve_volume(payload: &Value, default_volume: Decimal) -> Result<Decimal, NormalizeError> {
    let raw = VOLUME_ALIASES.iter().find_map(|alias| payload.get(*alias));

    let value = match raw {
        Some(value) => parse_decimal(value)
            .ok_or_else(|| NormalizeError::InvalidVolume(value.to_string()))?,
        None => default_volume,
    };

    normalize_volume(value).ok_or_else(|| NormalizeError::InvalidVolume(value.to_string()))
}

/// 선택적 가격 필드 추출.
///
/// 필드가 없거나 null이면 `None`, 있는데 파싱이 안 되면 에러.
fn optional_price(payload: &Value, key: &str) -> Result<Option<Decimal>, NormalizeError> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_decimal(value)
            .map(Some)
            .ok_or_else(|| NormalizeError::InvalidPrice(format!("{key}={value}"))),
    }
}

/// 숫자 또는 숫자 문자열을 Decimal로 파싱.
fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// truthy 판정. bool 그대로, 문자열은 소문자화 후 비교, 그 외는 false.
fn parse_close_existing(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
        }
        Some(_) => false,
    }
}

fn parse_close_side(value: Option<&Value>) -> Result<Option<PositionSide>, NormalizeError> {
    let Some(raw) = value.and_then(Value::as_str) else {
        return Ok(None);
    };
    match raw.to_uppercase().as_str() {
        "LONG" | "BUY" => Ok(Some(PositionSide::Long)),
        "SHORT" | "SELL" => Ok(Some(PositionSide::Short)),
        other => Err(NormalizeError::InvalidAction(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn default_volume() -> Decimal {
        dec!(0.01)
    }

    #[test]
    fn test_basic_buy_signal() {
        let payload = json!({"symbol": "EURUSD", "action": "buy", "volume": 0.5});
        let intent = normalize(&payload, default_volume()).unwrap();

        assert_eq!(intent.symbol, "EURUSD");
        assert_eq!(intent.direction, Direction::Buy);
        assert_eq!(intent.volume, dec!(0.5));
        assert!(intent.close_existing);
    }

    #[test]
    fn test_symbol_trimmed_and_uppercased() {
        let payload = json!({"symbol": "eurusd ", "action": "SELL"});
        let intent = normalize(&payload, default_volume()).unwrap();
        assert_eq!(intent.symbol, "EURUSD");
    }

    #[test]
    fn test_action_aliases() {
        for (action, direction) in [
            ("LONG", Direction::Buy),
            ("short", Direction::Sell),
            ("Close", Direction::CloseOnly),
        ] {
            let payload = json!({"symbol": "EURUSD", "action": action, "volume": 1});
            let intent = normalize(&payload, default_volume()).unwrap();
            assert_eq!(intent.direction, direction, "action={action}");
        }
    }

    #[test]
    fn test_volume_alias_priority() {
        // volume이 있으면 뒤의 별칭은 무시
        let payload = json!({
            "symbol": "EURUSD", "action": "buy",
            "volume": 0.3, "lots": 0.5, "size": 9.9
        });
        let intent = normalize(&payload, default_volume()).unwrap();
        assert_eq!(intent.volume, dec!(0.3));

        let payload = json!({"symbol": "EURUSD", "action": "buy", "lot_size": "0.7"});
        let intent = normalize(&payload, default_volume()).unwrap();
        assert_eq!(intent.volume, dec!(0.7));
    }

    #[test]
    fn test_volume_string_parsing() {
        let payload = json!({"symbol": "EURUSD", "action": "buy", "volume": " 1.5 "});
        let intent = normalize(&payload, default_volume()).unwrap();
        assert_eq!(intent.volume, dec!(1.5));
    }

    #[test]
    fn test_volume_default_fallback() {
        let payload = json!({"symbol": "EURUSD", "action": "buy"});
        let intent = normalize(&payload, dec!(0.02)).unwrap();
        assert_eq!(intent.volume, dec!(0.02));
    }

    #[test]
    fn test_volume_below_minimum_after_rounding() {
        let payload = json!({"symbol": "EURUSD", "action": "buy", "volume": "0.005"});
        let err = normalize(&payload, default_volume()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidVolume);
    }

    #[test]
    fn test_volume_invalid_inputs() {
        for volume in [json!("abc"), json!(-1), json!(0), json!(101), json!(true)] {
            let payload = json!({"symbol": "EURUSD", "action": "buy", "volume": volume});
            let err = normalize(&payload, default_volume()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidVolume, "volume={volume}");
        }
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let err = normalize(&json!({}), default_volume()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
        let message = err.to_string();
        assert!(message.contains("symbol"));
        assert!(message.contains("action"));

        // 빈 문자열도 누락으로 취급
        let err = normalize(&json!({"symbol": "  ", "action": "buy"}), default_volume())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
    }

    #[test]
    fn test_unknown_action() {
        let payload = json!({"symbol": "EURUSD", "action": "HOLD"});
        let err = normalize(&payload, default_volume()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAction);
    }

    #[test]
    fn test_close_existing_parsing() {
        for (value, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!("true"), true),
            (json!("1"), true),
            (json!("YES"), true),
            (json!("on"), true),
            (json!("off"), false),
            (json!("no"), false),
            (json!(1), false), // 문자열/불리언 외의 타입은 false
        ] {
            let payload = json!({
                "symbol": "EURUSD", "action": "buy", "volume": 1,
                "close_existing": value
            });
            let intent = normalize(&payload, default_volume()).unwrap();
            assert_eq!(intent.close_existing, expected, "value={value}");
        }
    }

    #[test]
    fn test_stop_loss_take_profit() {
        let payload = json!({
            "symbol": "EURUSD", "action": "buy", "volume": 0.1,
            "stop_loss": 1.05, "take_profit": "1.20"
        });
        let intent = normalize(&payload, default_volume()).unwrap();
        assert_eq!(intent.stop_loss, Some(dec!(1.05)));
        assert_eq!(intent.take_profit, Some(dec!(1.20)));
    }

    #[test]
    fn test_malformed_stop_loss_take_profit_rejected() {
        // 깨진 가격을 조용히 버리면 보호 주문 없는 체결이 됨
        let payload = json!({
            "symbol": "EURUSD", "action": "buy", "volume": 0.1,
            "stop_loss": "not-a-number"
        });
        let err = normalize(&payload, default_volume()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidVolume);
        assert!(err.to_string().contains("stop_loss"), "{err}");

        let payload = json!({
            "symbol": "EURUSD", "action": "buy", "volume": 0.1,
            "take_profit": "1.2O"
        });
        let err = normalize(&payload, default_volume()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidVolume);

        // null은 필드 없음과 동일
        let payload = json!({
            "symbol": "EURUSD", "action": "buy", "volume": 0.1,
            "stop_loss": null, "take_profit": null
        });
        let intent = normalize(&payload, default_volume()).unwrap();
        assert_eq!(intent.stop_loss, None);
        assert_eq!(intent.take_profit, None);
    }

    #[test]
    fn test_close_side_filter() {
        let payload = json!({
            "symbol": "EURUSD", "action": "close", "volume": 0.5, "side": "long"
        });
        let intent = normalize(&payload, default_volume()).unwrap();
        assert_eq!(intent.direction, Direction::CloseOnly);
        assert_eq!(intent.close_side, Some(PositionSide::Long));

        let payload = json!({
            "symbol": "EURUSD", "action": "close", "volume": 0.5, "side": "stale"
        });
        let err = normalize(&payload, default_volume()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAction);
    }
}
