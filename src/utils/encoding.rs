use base64::{engine::general_purpose, Engine as _};

/// Base64-encode raw upload bytes for JSON transport. Linear in the input
/// size, so multi-megabyte uploads are fine.
pub fn encode_image_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Build the `data:` URI the chat API expects for inline image content.
pub fn image_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, encode_image_base64(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode(encoded: &str) -> Vec<u8> {
        general_purpose::STANDARD.decode(encoded).unwrap()
    }

    #[test]
    fn empty_input_encodes_to_empty_string() {
        assert_eq!(encode_image_base64(&[]), "");
        assert_eq!(decode(""), Vec::<u8>::new());
    }

    #[test]
    fn every_byte_value_round_trips() {
        let all_bytes: Vec<u8> = (0..=255u8).collect();
        assert_eq!(decode(&encode_image_base64(&all_bytes)), all_bytes);
    }

    #[test]
    fn data_uri_carries_mime_and_payload() {
        let uri = image_data_uri("image/png", b"abc");
        assert_eq!(uri, "data:image/png;base64,YWJj");
    }

    proptest! {
        #[test]
        fn encode_then_decode_is_identity(bytes in proptest::collection::vec(any::<u8>(), 0..4096)) {
            prop_assert_eq!(decode(&encode_image_base64(&bytes)), bytes);
        }
    }
}
