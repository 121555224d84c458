//! Property-based tests for DSV encoding and decoding
//!
//! These tests check the round-trip law, re-encoding stability, blank-line
//! skipping and custom separator/escape pairs over generated records.

use proptest::prelude::*;

use dsv_codec::codec::{decode_str, encode_to_string, DsvConfig, DsvReader, DsvWriter, StrSource};
use dsv_codec::Record;

/// Strategy for generating fields heavy in characters the codec must escape
fn special_chars_field_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Separators
        "[a-z]{0,5}:[a-z]{0,5}".prop_map(|s| s),
        // Escapes, including doubled ones
        "[a-z]{0,5}\\\\{1,3}[a-z]{0,5}".prop_map(|s| s),
        // Embedded newlines, including leading and trailing ones
        "\n?[a-z]{0,5}\n[a-z]{0,5}\n?".prop_map(|s| s),
        // Everything mixed with whitespace
        "[a-z :\\\\\n\t]{0,16}".prop_map(|s| s),
        Just(":\\\n".to_string()),
        Just("\\".to_string()),
    ]
}

/// Strategy for generating arbitrary field content
fn arbitrary_field_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Plain text
        "[a-zA-Z0-9 ]{0,20}".prop_map(|s| s),
        // Empty field
        Just(String::new()),
        special_chars_field_strategy(),
        // Unicode text
        Just("caf\u{e9} \u{4e16}\u{754c} \u{1f30d}".to_string()),
        // Any printable or control character
        "\\PC{0,10}".prop_map(|s| s),
    ]
}

/// Strategy for generating records that survive a round trip.
///
/// `[]` and `[""]` both encode to a blank line, which the reader skips.
fn record_strategy() -> impl Strategy<Value = Record> {
    prop::collection::vec(arbitrary_field_strategy(), 1..6)
        .prop_filter("record must not encode to a blank line", |record| {
            !(record.len() == 1 && record[0].is_empty())
        })
}

/// Strategy for generating sequences of records
fn records_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(record_strategy(), 0..8)
}

/// Strategy for generating raw DSV text, valid or not
fn raw_text_strategy() -> impl Strategy<Value = String> {
    "[ab :\\\\\n]{0,40}"
}

/// Strategy for generating a valid separator/escape pair
fn config_strategy() -> impl Strategy<Value = DsvConfig> {
    let candidates = prop::sample::select(vec![':', ',', '|', '\t', ';', '\\', '%', '^', '\u{2022}']);
    (candidates.clone(), candidates)
        .prop_filter("separator and escape must differ", |(sep, esc)| sep != esc)
        .prop_map(|(sep, esc)| DsvConfig::new(sep, esc).expect("distinct non-newline pair"))
}

fn encode_with(config: DsvConfig, records: &[Record]) -> String {
    let mut writer = DsvWriter::with_config(Vec::new(), config).expect("valid config");
    writer.write_all(records).expect("in-memory write");
    String::from_utf8(writer.into_inner().expect("in-memory flush")).expect("UTF-8 output")
}

fn decode_with(config: DsvConfig, text: &str) -> Vec<Record> {
    let mut reader = DsvReader::with_config(StrSource::new(text), config).expect("valid config");
    reader.read_all().expect("string source cannot fail")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Property 1: Round-Trip
    // *For any* sequence of records, encoding then decoding with the default
    // configuration SHALL yield the same records, field for field.
    #[test]
    fn property_1_round_trip(records in records_strategy()) {
        let text = encode_to_string(&records).expect("encode");
        let decoded = decode_str(&text).expect("decode");

        prop_assert_eq!(decoded, records, "round trip should preserve every field");
    }

    // Property 1: Round-Trip
    // Fields made only of special characters
    #[test]
    fn property_1_round_trip_special_chars(
        fields in prop::collection::vec(special_chars_field_strategy(), 2..5)
    ) {
        let records = vec![fields];
        let text = encode_to_string(&records).expect("encode");

        prop_assert_eq!(decode_str(&text).expect("decode"), records);
    }

    // Property 2: Encoded Shape
    // *For any* sequence of records, the encoding SHALL end with exactly one
    // newline per record and contain no unescaped newline inside a record.
    #[test]
    fn property_2_one_terminator_per_record(records in records_strategy()) {
        let text = encode_to_string(&records).expect("encode");

        let mut terminators = 0;
        let mut escaping = false;
        for c in text.chars() {
            if escaping {
                escaping = false;
            } else if c == '\\' {
                escaping = true;
            } else if c == '\n' {
                terminators += 1;
            }
        }
        prop_assert_eq!(terminators, records.len());
        prop_assert!(records.is_empty() || text.ends_with('\n'));
    }

    // Property 3: Idempotent Re-Encode
    // *For any* text, decoding, encoding and decoding again SHALL yield the
    // records of the first decode.
    #[test]
    fn property_3_idempotent_reencode(text in raw_text_strategy()) {
        let first = decode_str(&text).expect("decode");
        // A lone dangling escape decodes to [""], which encodes to a blank line.
        prop_assume!(!first.iter().any(|r| r.len() == 1 && r[0].is_empty()));

        let reencoded = encode_to_string(&first).expect("encode");
        let second = decode_str(&reencoded).expect("decode");

        prop_assert_eq!(second, first);
    }

    // Property 4: Blank Lines Are Skipped
    // *For any* sequence of records, inserting runs of newlines before each
    // encoded record SHALL not change the decoded records.
    #[test]
    fn property_4_leading_newlines_ignored(
        records in records_strategy(),
        extra in 0usize..5,
    ) {
        let padding = "\n".repeat(extra);
        let mut padded = String::new();
        for record in &records {
            padded.push_str(&padding);
            padded.push_str(&encode_to_string([record]).expect("encode"));
        }
        padded.push_str(&padding);

        prop_assert_eq!(decode_str(&padded).expect("decode"), records);
    }

    // Property 5: Newline-Only Input
    // *For any* number of newlines, decoding SHALL yield no records.
    #[test]
    fn property_5_newlines_only_yield_nothing(count in 0usize..64) {
        let text = "\n".repeat(count);
        prop_assert!(decode_str(&text).expect("decode").is_empty());
    }

    // Property 6: Custom Configuration Round-Trip
    // *For any* valid separator/escape pair, records containing both
    // characters SHALL round-trip through a writer and reader sharing it.
    #[test]
    fn property_6_custom_config_round_trip(
        config in config_strategy(),
        records in records_strategy(),
    ) {
        let salted: Vec<Record> = records
            .into_iter()
            .map(|record| {
                record
                    .into_iter()
                    .map(|field| format!("{}{}{}", config.separator(), field, config.escape()))
                    .collect()
            })
            .collect();

        let text = encode_with(config, &salted);
        prop_assert_eq!(decode_with(config, &text), salted);
    }
}
