//! keyset pagination cursors for order listings.
//!
//! the order cursor is url-safe unpadded base64 of `"<unixSeconds>|<id>"`,
//! taken from the last row of the previous page. drones use a plain decimal
//! id token and need none of this.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, NaiveDateTime};
use thiserror::Error;

use skycourier_types::Order;

/// separator between the cursor components.
const CURSOR_SEPARATOR: char = '|';

/// fallback placement timestamp format (sqlite CURRENT_TIMESTAMP), read as utc.
const SQLITE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// cursor decoding failures; surfaced to clients as invalid-argument.
#[derive(Debug, Error)]
pub enum CursorError {
    /// the token is not valid base64.
    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// the decoded token does not have the two expected components.
    #[error("invalid cursor format")]
    Format,

    /// a component is not a valid integer.
    #[error("parse: {0}")]
    Parse(#[from] std::num::ParseIntError),
}

/// build an opaque next_page_token from placement unix seconds and order id.
pub fn encode_cursor(seconds: i64, id: i64) -> String {
    let raw = format!("{seconds}{CURSOR_SEPARATOR}{id}");
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

/// parse an opaque page_token into placement unix seconds and order id.
pub fn decode_cursor(token: &str) -> Result<(i64, i64), CursorError> {
    let bytes = URL_SAFE_NO_PAD.decode(token)?;
    let raw = String::from_utf8(bytes).map_err(|_| CursorError::Format)?;
    let (seconds, id) = raw.split_once(CURSOR_SEPARATOR).ok_or(CursorError::Format)?;
    Ok((seconds.parse()?, id.parse()?))
}

/// parse a stored placement timestamp into unix seconds.
///
/// accepts rfc3339 and the sqlite CURRENT_TIMESTAMP calendar form (utc).
pub fn placement_to_unix_seconds(s: &str) -> Result<i64, String> {
    if s.is_empty() {
        return Err("empty placement timestamp".to_string());
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.timestamp());
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, SQLITE_DATE_FORMAT) {
        return Ok(t.and_utc().timestamp());
    }
    Err(format!("unsupported placement timestamp format: {s:?}"))
}

/// next-page token for an order listing.
///
/// a token is only emitted when the page came back exactly full. the anchor
/// is the last row whose placement timestamp parses; rows with exotic legacy
/// values are served but skipped as anchors.
pub fn order_page_token(orders: &[Order], page_size: u64) -> Option<String> {
    if orders.is_empty() || orders.len() as u64 != page_size {
        return None;
    }
    orders.iter().rev().find_map(|order| {
        placement_to_unix_seconds(&order.placement_at)
            .ok()
            .map(|seconds| encode_cursor(seconds, order.id.0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycourier_types::{Coordinates, OrderId, OrderStatus, UserId};

    fn order_with_placement(id: i64, placement_at: &str) -> Order {
        Order {
            id: OrderId(id),
            origin: Coordinates::new(0.0, 0.0),
            destination: Coordinates::new(1.0, 1.0),
            status: OrderStatus::Placed,
            placement_at: placement_at.to_string(),
            submitted_by: UserId(1),
            pickup: None,
            drone_path: String::new(),
        }
    }

    #[test]
    fn test_cursor_round_trip() {
        for (seconds, id) in [(0i64, 1i64), (1767268800, 42), (i64::MAX, i64::MAX)] {
            let token = encode_cursor(seconds, id);
            assert_eq!(decode_cursor(&token).unwrap(), (seconds, id));
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_cursor("!!!not-base64!!!").is_err());
        // valid base64, wrong shape
        let no_separator = URL_SAFE_NO_PAD.encode(b"12345");
        assert!(decode_cursor(&no_separator).is_err());
        let not_numbers = URL_SAFE_NO_PAD.encode(b"abc|def");
        assert!(decode_cursor(&not_numbers).is_err());
    }

    #[test]
    fn test_placement_parsing_formats() {
        // sqlite CURRENT_TIMESTAMP form, interpreted as utc
        assert_eq!(
            placement_to_unix_seconds("2026-01-01 12:00:00").unwrap(),
            1767268800
        );
        // rfc3339
        assert_eq!(
            placement_to_unix_seconds("2026-01-01T12:00:00Z").unwrap(),
            1767268800
        );
        assert!(placement_to_unix_seconds("").is_err());
        assert!(placement_to_unix_seconds("January 1st").is_err());
    }

    #[test]
    fn test_page_token_only_on_full_page() {
        let orders = vec![
            order_with_placement(3, "2026-01-01 12:00:00"),
            order_with_placement(2, "2026-01-01 11:00:00"),
        ];
        assert!(order_page_token(&orders, 2).is_some());
        assert!(order_page_token(&orders, 3).is_none());
        assert!(order_page_token(&[], 0).is_none());
    }

    #[test]
    fn test_page_token_skips_unparseable_anchor() {
        let orders = vec![
            order_with_placement(3, "2026-01-01 12:00:00"),
            order_with_placement(2, "garbage"),
        ];
        // the last row fails to parse, so the anchor falls back to row 3
        let token = order_page_token(&orders, 2).unwrap();
        let (seconds, id) = decode_cursor(&token).unwrap();
        assert_eq!(id, 3);
        assert_eq!(seconds, 1767268800);
    }
}
