//! Tests for CLI type enums.

use super::*;

#[test]
fn test_output_format_from_str() {
    assert_eq!("text".parse::<OutputFormat>().expect("parsing should succeed"), OutputFormat::Text);
    assert_eq!("json".parse::<OutputFormat>().expect("parsing should succeed"), OutputFormat::Json);
    assert_eq!("JSON".parse::<OutputFormat>().expect("parsing should succeed"), OutputFormat::Json);
    assert!("yaml".parse::<OutputFormat>().is_err());
}

#[test]
fn test_output_format_default() {
    assert_eq!(OutputFormat::default(), OutputFormat::Text);
}

#[test]
fn test_mail_type_from_str_is_case_insensitive() {
    assert_eq!("BEGIN".parse::<MailType>().expect("parsing should succeed"), MailType::Begin);
    assert_eq!("end".parse::<MailType>().expect("parsing should succeed"), MailType::End);
    assert_eq!("None".parse::<MailType>().expect("parsing should succeed"), MailType::None);
    assert!("SOMETIMES".parse::<MailType>().is_err());
}

#[test]
fn test_mail_type_display_is_uppercase() {
    assert_eq!(MailType::Requeue.to_string(), "REQUEUE");
    assert_eq!(MailType::default().to_string(), "BEGIN");
}

#[test]
fn test_quota_type_roundtrip_display() {
    for quota in [QuotaType::Reserved, QuotaType::Auto, QuotaType::Spot] {
        let parsed: QuotaType = quota.to_string().parse().expect("parsing should succeed");
        assert_eq!(parsed, quota);
    }
    assert!("premium".parse::<QuotaType>().is_err());
}
