use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::json;

use super::extract_image_bytes;
use crate::core::error::ProviderError;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\nrest-of-image";

#[test]
fn test_binary_body_by_content_type() {
    let bytes = extract_image_bytes("image/png", b"raw image bytes").unwrap();
    assert_eq!(bytes, b"raw image bytes");

    let bytes = extract_image_bytes("application/octet-stream", b"blob").unwrap();
    assert_eq!(bytes, b"blob");
}

#[test]
fn test_binary_body_by_magic_bytes() {
    // Some gateways return the image under a JSON content type.
    let bytes = extract_image_bytes("application/json", PNG_MAGIC).unwrap();
    assert_eq!(bytes, PNG_MAGIC);

    let jpeg = [0xff, 0xd8, 0xff, 0xe0, 0x00];
    let bytes = extract_image_bytes("", &jpeg).unwrap();
    assert_eq!(bytes, jpeg);
}

#[test]
fn test_base64_in_result_envelope() {
    let body = json!({"result": {"image": BASE64.encode(b"png-bytes")}}).to_string();
    let bytes = extract_image_bytes("application/json", body.as_bytes()).unwrap();
    assert_eq!(bytes, b"png-bytes");
}

#[test]
fn test_base64_top_level_image_field() {
    let body = json!({"image": BASE64.encode(b"png-bytes")}).to_string();
    let bytes = extract_image_bytes("application/json", body.as_bytes()).unwrap();
    assert_eq!(bytes, b"png-bytes");
}

#[test]
fn test_openai_style_data_array() {
    let body = json!({"data": [{"b64_json": BASE64.encode(b"png-bytes")}]}).to_string();
    let bytes = extract_image_bytes("application/json", body.as_bytes()).unwrap();
    assert_eq!(bytes, b"png-bytes");
}

#[test]
fn test_stability_style_artifacts() {
    let body = json!({"artifacts": [{"base64": BASE64.encode(b"png-bytes")}]}).to_string();
    let bytes = extract_image_bytes("application/json", body.as_bytes()).unwrap();
    assert_eq!(bytes, b"png-bytes");
}

#[test]
fn test_data_url_prefix_is_stripped() {
    let body = json!({
        "image": format!("data:image/png;base64,{}", BASE64.encode(b"png-bytes"))
    })
    .to_string();
    let bytes = extract_image_bytes("application/json", body.as_bytes()).unwrap();
    assert_eq!(bytes, b"png-bytes");
}

#[test]
fn test_probe_order_skips_undecodable_fields() {
    let body = json!({
        "result": {"image": "!!! not base64 !!!"},
        "image": BASE64.encode(b"good"),
    })
    .to_string();
    let bytes = extract_image_bytes("application/json", body.as_bytes()).unwrap();
    assert_eq!(bytes, b"good");
}

#[test]
fn test_unrecognized_json_names_its_keys() {
    let body = json!({"success": true, "errors": []}).to_string();
    let err = extract_image_bytes("application/json", body.as_bytes()).unwrap_err();
    match err {
        ProviderError::UnrecognizedShape(desc) => {
            assert!(desc.contains("success"), "got: {desc}");
            assert!(desc.contains("errors"), "got: {desc}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unrecognized_plain_text() {
    let err = extract_image_bytes("text/plain", b"an apology, not an image").unwrap_err();
    assert!(matches!(err, ProviderError::UnrecognizedShape(_)));
}
