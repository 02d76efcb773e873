// src/handlers/download.rs

use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};

/// Binary body served as a download under `filename`.
pub fn file_response(filename: &str, content_type: &str, bytes: Vec<u8>) -> Response {
    let content_type = HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&content_disposition(filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

// ASCII fallback plus RFC 5987 `filename*` for names like "Сравнение.xlsx"
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();

    if fallback == filename {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let mut encoded = String::with_capacity(filename.len() * 3);
    for byte in filename.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", fallback, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_names_are_quoted_as_is() {
        assert_eq!(
            content_disposition("comparison_lot_1.xlsx"),
            "attachment; filename=\"comparison_lot_1.xlsx\""
        );
    }

    #[test]
    fn non_ascii_names_get_an_encoded_variant() {
        let value = content_disposition("протокол_T-1.pdf");
        assert!(value.starts_with("attachment; filename=\"________T-1.pdf\""));
        assert!(value.contains("filename*=UTF-8''%D0%BF"));
        assert!(HeaderValue::from_str(&value).is_ok());
    }

    #[test]
    fn response_carries_headers() {
        let response = file_response("a.pdf", "application/pdf", vec![1, 2, 3]);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"a.pdf\""
        );
    }
}
