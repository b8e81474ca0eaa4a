use super::*;

#[test]
fn test_parse_inputs() {
    let raw = vec!["city=Oslo".to_string(), "limit=10".to_string()];
    let inputs = parse_inputs(&raw).unwrap();
    assert_eq!(inputs.get("city").map(String::as_str), Some("Oslo"));
    assert_eq!(inputs.get("limit").map(String::as_str), Some("10"));
}

#[test]
fn test_parse_inputs_keeps_equals_in_value() {
    let raw = vec!["query=a=b".to_string()];
    let inputs = parse_inputs(&raw).unwrap();
    assert_eq!(inputs.get("query").map(String::as_str), Some("a=b"));
}

#[test]
fn test_parse_inputs_rejects_bad_pairs() {
    assert!(parse_inputs(&["no-equals".to_string()]).is_err());
    assert!(parse_inputs(&["=value".to_string()]).is_err());
}
