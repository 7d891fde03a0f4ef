use encoding_rs::Encoding;
use tracing::debug;

/// Decode response bytes against an ordered list of encoding labels. The first
/// label that decodes without malformed sequences wins; if none do, the bytes
/// are decoded as lossy UTF-8 so classification can still run on what's there.
pub fn decode_body(body: &[u8], labels: &[String]) -> String {
    for label in labels {
        let Some(enc) = Encoding::for_label(label.as_bytes()) else {
            debug!(label = %label, "unknown encoding label, skipping");
            continue;
        };
        let (text, _, had_errors) = enc.decode(body);
        if !had_errors {
            debug!(label = %label, "decoded response body");
            return text.into_owned();
        }
    }
    debug!("no configured encoding decoded cleanly, falling back to lossy utf-8");
    String::from_utf8_lossy(body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_utf8_wins_first() {
        let body = "訂單管理".as_bytes();
        assert_eq!(decode_body(body, &labels(&["utf-8", "big5"])), "訂單管理");
    }

    #[test]
    fn test_big5_decodes_through_list() {
        // "中" in Big5; not valid UTF-8, so the list has to fall through
        let body: &[u8] = &[0xa4, 0xa4];
        assert_eq!(decode_body(body, &labels(&["utf-8", "big5"])), "中");
    }

    #[test]
    fn test_lossy_fallback_when_nothing_decodes() {
        // Invalid in both UTF-8 and Big5
        let body: &[u8] = &[0xff, 0xff, 0xfe];
        let text = decode_body(body, &labels(&["utf-8", "big5"]));
        assert!(text.contains('\u{fffd}'));
    }

    #[test]
    fn test_unknown_label_is_skipped() {
        let body = b"plain ascii";
        assert_eq!(decode_body(body, &labels(&["not-a-charset", "utf-8"])), "plain ascii");
    }
}
