//! HTTP status reason phrases and response framing.
//!
//! Trimmed down from the teacher's exhaustive `StatusCode` table to the
//! handful of codes this dispatcher can actually produce: `200` for a
//! matched route, `404` for an unmatched path, `500` for an output-capture
//! failure.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub fn reason_phrase(self) -> &'static str {
        match self.0 {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

/// Frames a status, content type, and body as a complete HTTP/1.1 response.
/// Every response closes the connection after being sent, matching the
/// dispatcher's one-response-per-connection accept loop.
pub fn frame(status: StatusCode, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status.0,
        status.reason_phrase(),
        content_type,
        body.len(),
        body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_a_200_with_correct_content_length() {
        let framed = frame(StatusCode::OK, "text/plain", "hi");
        assert!(framed.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(framed.contains("Content-Length: 2\r\n"));
        assert!(framed.ends_with("\r\n\r\nhi"));
    }

    #[test]
    fn frames_a_404_with_empty_body() {
        let framed = frame(StatusCode::NOT_FOUND, "text/plain", "");
        assert!(framed.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(framed.contains("Content-Length: 0\r\n"));
    }

    #[test]
    fn content_length_counts_bytes_not_chars() {
        let framed = frame(StatusCode::OK, "text/plain", "héllo");
        assert!(framed.contains(&format!("Content-Length: {}\r\n", "héllo".len())));
    }
}
