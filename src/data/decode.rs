//! Byte-to-text decoding with an ordered encoding fallback chain

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::config::DecodeConfig;
use crate::error::RaceCardError;

/// Text plus the encoding that produced it
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// Tries each encoding in order until one decodes without replacement
#[derive(Debug, Clone)]
pub struct TextDecoder {
    encodings: Vec<&'static Encoding>,
}

impl Default for TextDecoder {
    fn default() -> Self {
        Self {
            encodings: vec![UTF_8, WINDOWS_1252],
        }
    }
}

impl TextDecoder {
    pub fn new(encodings: Vec<&'static Encoding>) -> Self {
        let mut unique: Vec<&'static Encoding> = Vec::with_capacity(encodings.len());
        for encoding in encodings {
            if !unique.contains(&encoding) {
                unique.push(encoding);
            }
        }
        Self { encodings: unique }
    }

    /// Build from WHATWG encoding labels ("utf-8", "latin1", "cp1252", ...)
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self, RaceCardError> {
        let mut encodings = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
                RaceCardError::Config(format!("Unknown encoding label: {}", label))
            })?;
            encodings.push(encoding);
        }
        Ok(Self::new(encodings))
    }

    pub fn from_config(config: &DecodeConfig) -> Result<Self, RaceCardError> {
        Self::from_labels(&config.encodings)
    }

    pub fn encodings(&self) -> Vec<&'static str> {
        self.encodings.iter().map(|e| e.name()).collect()
    }

    /// Decode bytes with the first encoding that accepts them
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedText, RaceCardError> {
        for encoding in &self.encodings {
            let input = if *encoding == UTF_8 {
                bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
            } else {
                bytes
            };

            match encoding.decode_without_bom_handling_and_without_replacement(input) {
                Some(text) => {
                    debug!("Decoded {} bytes as {}", bytes.len(), encoding.name());
                    return Ok(DecodedText {
                        text: text.into_owned(),
                        encoding: encoding.name(),
                    });
                }
                None => debug!("Input is not valid {}", encoding.name()),
            }
        }

        Err(RaceCardError::Decode {
            tried: self.encodings().join(", "),
        })
    }

    /// Read and decode a text file
    pub fn read_file(&self, path: &Path) -> Result<DecodedText, RaceCardError> {
        let bytes = fs::read(path)?;
        self.decode(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        let decoder = TextDecoder::default();
        let decoded = decoder.decode("1 PEÑA BRAVA (VEN) 54".as_bytes()).unwrap();
        assert_eq!(decoded.encoding, "UTF-8");
        assert!(decoded.text.contains("PEÑA"));
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let decoder = TextDecoder::default();
        let decoded = decoder.decode(b"\xEF\xBB\xBFThunder 55").unwrap();
        assert_eq!(decoded.text, "Thunder 55");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        let decoder = TextDecoder::default();
        // "PEÑA" in Latin-1: Ñ = 0xD1, not valid UTF-8
        let decoded = decoder.decode(b"PE\xD1A BRAVA 54").unwrap();
        assert_eq!(decoded.encoding, "windows-1252");
        assert_eq!(decoded.text, "PEÑA BRAVA 54");
    }

    #[test]
    fn test_decode_error_when_no_encoding_fits() {
        let decoder = TextDecoder::new(vec![UTF_8]);
        let err = decoder.decode(b"PE\xD1A").unwrap_err();
        assert!(matches!(err, RaceCardError::Decode { .. }));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_decode_error_with_empty_chain() {
        let decoder = TextDecoder::new(Vec::new());
        assert!(decoder.decode(b"abc").is_err());
    }

    #[test]
    fn test_from_labels() {
        let decoder = TextDecoder::from_labels(&["utf-8", "latin1", "iso-8859-1", "cp1252"]).unwrap();
        // the Latin-1 labels all resolve to windows-1252
        assert_eq!(decoder.encodings(), vec!["UTF-8", "windows-1252"]);

        assert!(matches!(
            TextDecoder::from_labels(&["klingon"]),
            Err(RaceCardError::Config(_))
        ));
    }

    #[test]
    fn test_from_config_default() {
        let decoder = TextDecoder::from_config(&DecodeConfig::default()).unwrap();
        assert_eq!(decoder.encodings(), vec!["UTF-8", "windows-1252"]);
    }

    #[test]
    fn test_read_file_missing() {
        let decoder = TextDecoder::default();
        let err = decoder
            .read_file(Path::new("/nonexistent/racecard/program.txt"))
            .unwrap_err();
        assert!(matches!(err, RaceCardError::Io(_)));
    }
}
