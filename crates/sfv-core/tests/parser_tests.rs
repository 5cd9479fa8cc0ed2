use sfv_core::{
    parse_dictionary, parse_item, parse_list, Parser, Profile, ScalarValue, SfvError,
};

/// Helper: the item field must parse and its scalar must match.
fn assert_item_value(input: &str, expected: ScalarValue) {
    let item = parse_item(input).unwrap_or_else(|e| panic!("{input:?} failed to parse: {e}"));
    assert_eq!(
        item.value(),
        &expected,
        "wrong value parsed from {input:?}"
    );
}

/// Helper: the item field must be rejected with a syntax error.
fn assert_item_rejected(input: &str) {
    match parse_item(input) {
        Ok(item) => panic!("{input:?} should have been rejected, parsed {item:?}"),
        Err(SfvError::Syntax { .. }) => {}
        Err(other) => panic!("{input:?} should fail with a syntax error, got {other:?}"),
    }
}

/// Helper: the syntax error for an item field must sit at `offset`.
fn assert_error_offset(input: &str, expected: usize) {
    match parse_item(input) {
        Err(SfvError::Syntax { offset, message }) => assert_eq!(
            offset, expected,
            "wrong offset for {input:?} ({message})"
        ),
        other => panic!("{input:?} should fail with a syntax error, got {other:?}"),
    }
}

// ============================================================================
// Item fields and edge whitespace
// ============================================================================

#[test]
fn item_with_leading_and_trailing_spaces() {
    assert_item_value("  42  ", ScalarValue::integer(42).unwrap());
}

#[test]
fn empty_item_field_is_rejected() {
    assert_item_rejected("");
    assert_item_rejected("   ");
}

#[test]
fn item_with_trailing_garbage_is_rejected() {
    assert_item_rejected("42 x");
    assert_item_rejected("42,");
}

#[test]
fn item_edge_whitespace_is_spaces_only() {
    // Tabs are only valid around member commas, not at field edges.
    assert_item_rejected("\t42");
    assert_item_rejected("42\t");
}

#[test]
fn space_before_semicolon_is_rejected() {
    assert_item_rejected("1 ;a=2");
}

// ============================================================================
// Integers
// ============================================================================

#[test]
fn integer_zero() {
    assert_item_value("0", ScalarValue::integer(0).unwrap());
}

#[test]
fn negative_zero_reads_as_zero() {
    assert_item_value("-0", ScalarValue::integer(0).unwrap());
}

#[test]
fn integer_at_both_range_ends() {
    assert_item_value(
        "999999999999999",
        ScalarValue::integer(999_999_999_999_999).unwrap(),
    );
    assert_item_value(
        "-999999999999999",
        ScalarValue::integer(-999_999_999_999_999).unwrap(),
    );
}

#[test]
fn sixteen_digit_integer_is_rejected() {
    assert_item_rejected("1000000000000000");
    assert_item_rejected("-1000000000000000");
}

#[test]
fn leading_zeros_are_rejected() {
    assert_item_rejected("00");
    assert_item_rejected("042");
    assert_item_rejected("-042");
    assert_item_rejected("00.5");
}

#[test]
fn bare_minus_is_rejected() {
    assert_item_rejected("-");
    assert_item_rejected("- 1");
}

// ============================================================================
// Decimals
// ============================================================================

#[test]
fn decimal_basic() {
    let item = parse_item("4.5").unwrap();
    assert_eq!(item.value().as_decimal().unwrap().thousandths(), 4500);
}

#[test]
fn decimal_zero_point_five() {
    let item = parse_item("0.5").unwrap();
    assert_eq!(item.value().as_decimal().unwrap().thousandths(), 500);
}

#[test]
fn decimal_negative() {
    let item = parse_item("-0.005").unwrap();
    assert_eq!(item.value().as_decimal().unwrap().thousandths(), -5);
}

#[test]
fn decimal_at_range_end() {
    let item = parse_item("999999999999.999").unwrap();
    assert_eq!(
        item.value().as_decimal().unwrap().thousandths(),
        999_999_999_999_999
    );
}

#[test]
fn decimal_with_four_fraction_digits_is_rejected() {
    assert_item_rejected("42.1234");
}

#[test]
fn decimal_with_thirteen_integer_digits_is_rejected() {
    assert_item_rejected("1234567890123.1");
}

#[test]
fn decimal_without_fraction_digits_is_rejected() {
    assert_item_rejected("1.");
    assert_item_rejected("1. 2");
}

#[test]
fn decimal_with_two_points_is_rejected() {
    assert_item_rejected("1.2.3");
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn string_basic() {
    assert_item_value("\"hello world\"", ScalarValue::string("hello world").unwrap());
}

#[test]
fn string_empty() {
    assert_item_value("\"\"", ScalarValue::string("").unwrap());
}

#[test]
fn string_escapes_unfold() {
    assert_item_value(r#""say \"hi\"""#, ScalarValue::string("say \"hi\"").unwrap());
    assert_item_value(r#""a\\b""#, ScalarValue::string("a\\b").unwrap());
}

#[test]
fn string_with_unknown_escape_is_rejected() {
    assert_item_rejected(r#""line1\nline2""#);
    assert_item_rejected(r#""tab\there""#);
}

#[test]
fn unterminated_string_is_rejected() {
    assert_item_rejected("\"abc");
    assert_item_rejected("\"abc\\");
    assert_item_rejected("\"abc\\\"");
}

#[test]
fn string_with_control_byte_is_rejected() {
    assert_item_rejected("\"a\tb\"");
    assert_item_rejected("\"a\u{7f}b\"");
}

#[test]
fn string_with_non_ascii_is_rejected() {
    assert_item_rejected("\"caf\u{e9}\"");
}

// ============================================================================
// Tokens
// ============================================================================

#[test]
fn token_basic() {
    assert_item_value("sugar", ScalarValue::token("sugar").unwrap());
}

#[test]
fn token_star() {
    assert_item_value("*", ScalarValue::token("*").unwrap());
}

#[test]
fn token_with_slash_and_colon() {
    assert_item_value("text/html", ScalarValue::token("text/html").unwrap());
    assert_item_value("a:b/c", ScalarValue::token("a:b/c").unwrap());
}

#[test]
fn token_with_full_charset() {
    let input = "a!#$%&'*+-.^_`|~:/09AZ";
    assert_item_value(input, ScalarValue::token(input).unwrap());
}

#[test]
fn token_stops_at_non_token_byte() {
    let item = parse_item("abc;x=1").unwrap();
    assert_eq!(item.value(), &ScalarValue::token("abc").unwrap());
    assert_eq!(
        item.parameters().get("x"),
        Some(&ScalarValue::integer(1).unwrap())
    );
}

// ============================================================================
// Byte sequences
// ============================================================================

#[test]
fn byte_sequence_basic() {
    let item = parse_item(":SGVsbG8gV29ybGQ=:").unwrap();
    assert_eq!(item.value().as_bytes().unwrap(), b"Hello World");
}

#[test]
fn byte_sequence_accepts_unpadded_base64() {
    let item = parse_item(":SGVsbG8:").unwrap();
    assert_eq!(item.value().as_bytes().unwrap(), b"Hello");
}

#[test]
fn byte_sequence_empty() {
    let item = parse_item("::").unwrap();
    assert_eq!(item.value().as_bytes().unwrap(), b"");
}

#[test]
fn byte_sequence_with_invalid_character_is_rejected() {
    assert_item_rejected(":SGV sbG8=:");
    assert_item_rejected(":SGV$:");
}

#[test]
fn byte_sequence_with_bad_shape_is_rejected() {
    // A single base64 character can never encode a whole byte.
    assert_item_rejected(":A:");
    assert_item_rejected(":SGVsbG8===:");
}

#[test]
fn unterminated_byte_sequence_is_rejected() {
    assert_item_rejected(":SGVsbG8=");
}

// ============================================================================
// Booleans
// ============================================================================

#[test]
fn boolean_literals() {
    assert_item_value("?1", ScalarValue::boolean(true));
    assert_item_value("?0", ScalarValue::boolean(false));
}

#[test]
fn malformed_boolean_is_rejected() {
    assert_item_rejected("?");
    assert_item_rejected("?2");
    assert_item_rejected("?true");
}

// ============================================================================
// Dates
// ============================================================================

#[test]
fn date_basic() {
    let item = parse_item("@1659578233").unwrap();
    assert_eq!(item.value().as_date().unwrap().unix_seconds(), 1_659_578_233);
}

#[test]
fn date_before_the_epoch() {
    let item = parse_item("@-1").unwrap();
    assert_eq!(item.value().as_date().unwrap().unix_seconds(), -1);
}

#[test]
fn fractional_date_is_rejected() {
    assert_item_rejected("@1659578233.12");
}

#[test]
fn date_outside_integer_range_is_rejected() {
    assert_item_rejected("@1000000000000000");
}

#[test]
fn bare_at_sign_is_rejected() {
    assert_item_rejected("@");
}

// ============================================================================
// Display strings
// ============================================================================

#[test]
fn display_string_ascii() {
    let item = parse_item("%\"hello\"").unwrap();
    assert_eq!(item.value().as_display_string().unwrap(), "hello");
}

#[test]
fn display_string_decodes_utf8_escapes() {
    let item = parse_item("%\"f%c3%bc%c3%bc\"").unwrap();
    assert_eq!(item.value().as_display_string().unwrap(), "f\u{fc}\u{fc}");
}

#[test]
fn display_string_uppercase_hex_is_rejected() {
    assert_item_rejected("%\"%C3%BC\"");
}

#[test]
fn display_string_bare_percent_is_rejected() {
    assert_item_rejected("%\"100%\"");
}

#[test]
fn display_string_invalid_utf8_is_rejected() {
    assert_item_rejected("%\"%ff\"");
}

#[test]
fn unterminated_display_string_is_rejected() {
    assert_item_rejected("%\"abc");
    assert_item_rejected("%\"abc%");
    assert_item_rejected("%\"abc%c");
}

#[test]
fn display_string_raw_non_ascii_is_rejected() {
    // Non-ASCII bytes must arrive percent-encoded.
    assert_item_rejected("%\"f\u{fc}\u{fc}\"");
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn parameters_basic() {
    let item = parse_item("\"foo\";a=1;b=2").unwrap();
    assert_eq!(item.value(), &ScalarValue::string("foo").unwrap());
    assert_eq!(item.parameters().len(), 2);
    assert_eq!(
        item.parameters().get("a"),
        Some(&ScalarValue::integer(1).unwrap())
    );
    assert_eq!(
        item.parameters().get("b"),
        Some(&ScalarValue::integer(2).unwrap())
    );
}

#[test]
fn parameter_without_value_is_true() {
    let item = parse_item("1;a").unwrap();
    assert_eq!(item.parameters().get("a"), Some(&ScalarValue::boolean(true)));
}

#[test]
fn spaces_after_semicolon_are_discarded() {
    let item = parse_item("1;  a=2;   b").unwrap();
    assert_eq!(item.parameters().len(), 2);
    assert_eq!(
        item.parameters().get("a"),
        Some(&ScalarValue::integer(2).unwrap())
    );
}

#[test]
fn duplicate_parameter_keeps_later_value_at_the_end() {
    let item = parse_item("1;x=1;y=2;x=3").unwrap();
    let keys: Vec<&str> = item.parameters().keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["y", "x"]);
    assert_eq!(
        item.parameters().get("x"),
        Some(&ScalarValue::integer(3).unwrap())
    );
}

#[test]
fn parameter_key_with_uppercase_is_rejected() {
    assert_item_rejected("1;Q=1");
}

#[test]
fn parameter_key_full_charset() {
    let item = parse_item("1;*a-b_c.9*").unwrap();
    assert!(item.parameters().contains_key("*a-b_c.9*"));
}

#[test]
fn semicolon_without_key_is_rejected() {
    assert_item_rejected("1;");
    assert_item_rejected("1;=2");
}

// ============================================================================
// Inner lists
// ============================================================================

#[test]
fn inner_list_empty() {
    let list = parse_list("()").unwrap();
    let inner = list.get(0).unwrap().as_inner_list().unwrap();
    assert!(inner.is_empty());
}

#[test]
fn inner_list_basic() {
    let list = parse_list("(1 2 3)").unwrap();
    let inner = list.get(0).unwrap().as_inner_list().unwrap();
    assert_eq!(inner.len(), 3);
    assert_eq!(inner.get(1).unwrap().value(), &ScalarValue::integer(2).unwrap());
}

#[test]
fn inner_list_tolerates_extra_spaces() {
    let list = parse_list("(  1   2  )").unwrap();
    let inner = list.get(0).unwrap().as_inner_list().unwrap();
    assert_eq!(inner.len(), 2);
}

#[test]
fn inner_list_with_parameters_everywhere() {
    let list = parse_list("(\"a\";q=0.5 \"b\");side=left").unwrap();
    let inner = list.get(0).unwrap().as_inner_list().unwrap();
    assert_eq!(
        inner.get(0).unwrap().parameters().get("q"),
        Some(&ScalarValue::decimal(0.5).unwrap())
    );
    assert_eq!(
        inner.parameters().get("side"),
        Some(&ScalarValue::token("left").unwrap())
    );
}

#[test]
fn inner_list_items_need_space_separation() {
    assert!(parse_list("(1\"a\")").is_err());
    assert!(parse_list("(1(2))").is_err());
}

#[test]
fn inner_list_cannot_nest() {
    assert!(parse_list("((1))").is_err());
}

#[test]
fn unterminated_inner_list_is_rejected() {
    assert!(parse_list("(1 2").is_err());
    assert!(parse_list("(1 ").is_err());
    assert!(parse_list("(").is_err());
}

#[test]
fn inner_list_with_tab_is_rejected() {
    assert!(parse_list("(1\t2)").is_err());
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn empty_input_is_an_empty_list() {
    assert!(parse_list("").unwrap().is_empty());
    assert!(parse_list("   ").unwrap().is_empty());
}

#[test]
fn list_basic() {
    let list = parse_list("sugar, tea, rum").unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(
        list.get(0).unwrap().as_item().unwrap().value(),
        &ScalarValue::token("sugar").unwrap()
    );
    assert_eq!(
        list.get(-1).unwrap().as_item().unwrap().value(),
        &ScalarValue::token("rum").unwrap()
    );
}

#[test]
fn list_accepts_ows_around_commas() {
    let list = parse_list("a\t,\tb ,  c,d").unwrap();
    assert_eq!(list.len(), 4);
}

#[test]
fn list_mixes_items_and_inner_lists() {
    let list = parse_list("a, (b c), d;x").unwrap();
    assert_eq!(list.len(), 3);
    assert!(list.get(1).unwrap().as_inner_list().is_some());
}

#[test]
fn trailing_comma_is_rejected() {
    assert!(parse_list("a,").is_err());
    assert!(parse_list("a, ").is_err());
    assert!(parse_list("a,b,").is_err());
}

#[test]
fn leading_comma_is_rejected() {
    assert!(parse_list(",a").is_err());
}

#[test]
fn double_comma_is_rejected() {
    assert!(parse_list("a,,b").is_err());
}

// ============================================================================
// Dictionaries
// ============================================================================

#[test]
fn dictionary_basic() {
    let dict = parse_dictionary("a=1, b=\"x\", c=?0").unwrap();
    assert_eq!(dict.len(), 3);
    assert_eq!(
        dict.get("a").unwrap().as_item().unwrap().value(),
        &ScalarValue::integer(1).unwrap()
    );
    assert_eq!(
        dict.get("c").unwrap().as_item().unwrap().value(),
        &ScalarValue::boolean(false)
    );
}

#[test]
fn empty_input_is_an_empty_dictionary() {
    assert!(parse_dictionary("").unwrap().is_empty());
    assert!(parse_dictionary("  ").unwrap().is_empty());
}

#[test]
fn bare_key_means_boolean_true() {
    let dict = parse_dictionary("a, b=2").unwrap();
    assert_eq!(
        dict.get("a").unwrap().as_item().unwrap().value(),
        &ScalarValue::boolean(true)
    );
}

#[test]
fn bare_key_still_takes_parameters() {
    let dict = parse_dictionary("a;x=1;y").unwrap();
    let item = dict.get("a").unwrap().as_item().unwrap();
    assert_eq!(item.value(), &ScalarValue::boolean(true));
    assert_eq!(item.parameters().get("x"), Some(&ScalarValue::integer(1).unwrap()));
    assert_eq!(item.parameters().get("y"), Some(&ScalarValue::boolean(true)));
}

#[test]
fn dictionary_member_can_be_inner_list() {
    let dict = parse_dictionary("accept=(gzip br), reject=()").unwrap();
    assert_eq!(dict.get("accept").unwrap().as_inner_list().unwrap().len(), 2);
    assert!(dict.get("reject").unwrap().as_inner_list().unwrap().is_empty());
}

#[test]
fn duplicate_key_keeps_later_member() {
    let dict = parse_dictionary("a=1, a=2").unwrap();
    assert_eq!(dict.len(), 1);
    assert_eq!(
        dict.get("a").unwrap().as_item().unwrap().value(),
        &ScalarValue::integer(2).unwrap()
    );
}

#[test]
fn duplicate_key_moves_to_the_end() {
    let dict = parse_dictionary("a=1, b=2, a=3").unwrap();
    let keys: Vec<&str> = dict.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["b", "a"]);
    assert_eq!(
        dict.get("a").unwrap().as_item().unwrap().value(),
        &ScalarValue::integer(3).unwrap()
    );
}

#[test]
fn dictionary_key_with_uppercase_is_rejected() {
    assert!(parse_dictionary("Abc=1").is_err());
}

#[test]
fn dictionary_trailing_comma_is_rejected() {
    assert!(parse_dictionary("a=1,").is_err());
    assert!(parse_dictionary("a=1, ").is_err());
}

#[test]
fn dictionary_key_without_member_after_equals_is_rejected() {
    assert!(parse_dictionary("a=").is_err());
}

// ============================================================================
// Profile gating
// ============================================================================

#[test]
fn legacy_profile_rejects_dates() {
    let parser = Parser::new(Profile::Legacy);
    match parser.item("@1659578233") {
        Err(SfvError::MissingFeature { feature, profile }) => {
            assert_eq!(feature, "date");
            assert_eq!(profile, Profile::Legacy);
        }
        other => panic!("expected a missing-feature error, got {other:?}"),
    }
}

#[test]
fn legacy_profile_rejects_display_strings() {
    let parser = Parser::new(Profile::Legacy);
    match parser.item("%\"hi\"") {
        Err(SfvError::MissingFeature { feature, .. }) => {
            assert_eq!(feature, "display string");
        }
        other => panic!("expected a missing-feature error, got {other:?}"),
    }
}

#[test]
fn legacy_profile_gates_parameter_values_too() {
    let parser = Parser::new(Profile::Legacy);
    assert!(matches!(
        parser.item("1;d=@1659578233"),
        Err(SfvError::MissingFeature { .. })
    ));
}

#[test]
fn legacy_profile_accepts_the_original_kinds() {
    let parser = Parser::new(Profile::Legacy);
    assert!(parser.item("42").is_ok());
    assert!(parser.item("4.5").is_ok());
    assert!(parser.item("\"x\"").is_ok());
    assert!(parser.item("tok").is_ok());
    assert!(parser.item("::").is_ok());
    assert!(parser.item("?1").is_ok());
}

#[test]
fn default_parser_speaks_the_current_profile() {
    assert_eq!(Parser::default().profile(), Profile::Current);
    assert!(parse_item("@1659578233").is_ok());
    assert!(parse_item("%\"hi\"").is_ok());
}

// ============================================================================
// Error offsets
// ============================================================================

#[test]
fn offsets_are_zero_based_byte_positions() {
    assert_error_offset("\"ab\u{7f}\"", 3);
    assert_error_offset("042", 0);
    assert_error_offset("-042", 1);
    assert_error_offset("1;x=#", 4);
}

#[test]
fn offset_for_list_garbage_points_at_the_member() {
    match parse_list("a, $") {
        Err(SfvError::Syntax { offset, .. }) => assert_eq!(offset, 3),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn offset_at_end_of_truncated_input() {
    match parse_item("\"abc") {
        Err(SfvError::Syntax { offset, .. }) => assert_eq!(offset, 4),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}
