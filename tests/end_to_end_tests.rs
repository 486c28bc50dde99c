//! Full pipeline runs: image bytes in, payload out, through the rqrr decoder.

mod common;

use common::{MinResolution, blank, encode_luma, synthetic_qr};
use image::ImageOutputFormat;
use qr_sieve::{DecodeError, RqrrDecoder, ScanConfig, Scanner, SearchMode, decode};
use serde_json::Value;
use std::time::Duration;

#[test]
fn test_clean_symbol_wins_on_first_attempt() {
    let png = encode_luma(&synthetic_qr("HELLO", 8, false), ImageOutputFormat::Png);
    assert_eq!(decode(&png).unwrap(), "HELLO");

    let hit = Scanner::new().scan_bytes(&png).unwrap();
    assert_eq!(hit.attempts, 1);
    assert_eq!(hit.variant_index, 0);
    assert_eq!(hit.variant_name, "original");
    assert_eq!(hit.config_index, 0);
    assert_eq!(hit.config_name, "try_harder_utf8");
}

#[test]
fn test_inverted_low_resolution_json() {
    // One pixel per module, light modules on a dark background
    let symbol = synthetic_qr(r#"{"a":1}"#, 1, true);
    let png = encode_luma(&symbol, ImageOutputFormat::Png);

    let hit = Scanner::new().scan_bytes(&png).unwrap();
    assert!(hit.attempts > 1);
    let parsed: Value = serde_json::from_str(&hit.payload).unwrap();
    assert_eq!(parsed["a"], 1);
    assert_eq!(parsed.as_object().map(|o| o.len()), Some(1));
}

#[test]
fn test_inverted_symbol_read_through_enlargement() {
    // 29x29 light-on-dark symbol; the decoder needs at least 100px a side,
    // so only the x4 and larger variants can be read
    let symbol = synthetic_qr(r#"{"a":1}"#, 1, true);
    let png = encode_luma(&symbol, ImageOutputFormat::Png);
    let decoder = MinResolution {
        inner: RqrrDecoder::new(),
        min_side: 100,
    };

    for mode in [SearchMode::Sequential, SearchMode::Parallel] {
        let scanner = Scanner::with_decoder(ScanConfig::default().with_mode(mode), &decoder);
        let hit = scanner.scan_bytes(&png).unwrap();

        assert_eq!(hit.variant_name, "gray>invert>scale(4)");
        assert_eq!(hit.variant_index, 14 + 2 * 12);
        assert_eq!(hit.config_name, "try_harder_utf8");
        // Every smaller variant was skipped without an attempt
        assert_eq!(hit.attempts, 1);

        let parsed: Value = serde_json::from_str(&hit.payload).unwrap();
        assert_eq!(parsed, serde_json::json!({"a": 1}));
    }
}

#[test]
fn test_parallel_mode_matches_sequential() {
    let symbol = synthetic_qr("PARALLEL", 1, true);
    let sequential = Scanner::new().scan_matrix(symbol.clone()).unwrap();
    let parallel = Scanner::with_config(ScanConfig::default().with_mode(SearchMode::Parallel))
        .scan_matrix(symbol)
        .unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn test_jpeg_and_gif_containers() {
    let symbol = synthetic_qr("CONTAINER", 6, false);
    for format in [ImageOutputFormat::Jpeg(95), ImageOutputFormat::Gif] {
        let bytes = encode_luma(&symbol, format);
        assert_eq!(decode(&bytes).unwrap(), "CONTAINER");
    }
}

#[test]
fn test_blank_image_exhausts_search() {
    let png = encode_luma(&blank(32, 32), ImageOutputFormat::Png);
    match decode(&png) {
        Err(DecodeError::NoQrCodeFound {
            attempts,
            last_failure,
        }) => {
            assert_eq!(attempts, 98 * 6);
            assert_eq!(last_failure.as_deref(), Some("NoGridFound"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_input_errors() {
    assert!(matches!(decode(&[]), Err(DecodeError::InvalidInput(_))));
    assert!(matches!(
        decode(b"plain text, not pixels"),
        Err(DecodeError::UnsupportedFormat(_))
    ));

    let config = ScanConfig {
        max_input_bytes: 16,
        ..ScanConfig::default()
    };
    let png = encode_luma(&blank(8, 8), ImageOutputFormat::Png);
    assert!(matches!(
        Scanner::with_config(config).scan_bytes(&png),
        Err(DecodeError::InvalidInput(_))
    ));
}

#[test]
fn test_time_budget_is_enforced() {
    let png = encode_luma(&blank(64, 64), ImageOutputFormat::Png);
    let scanner = Scanner::with_config(ScanConfig::default().with_time_budget(Duration::ZERO));
    assert!(matches!(
        scanner.scan_bytes(&png),
        Err(DecodeError::Timeout { attempts: 0, .. })
    ));
}
