use super::*;

#[test]
fn registration_number_formats_all_segments() {
    let reg = RegistrationNumber::new("BBDITM/BT-CS", 2025, 12345).unwrap();
    assert_eq!(reg.to_string(), "BBDITM/BT-CS/2025/12345");
    assert_eq!(reg.prefix(), "BBDITM/BT-CS");
    assert_eq!(reg.year(), 2025);
    assert_eq!(reg.serial(), 12345);
}

#[test]
fn registration_number_validates_ranges() {
    assert!(RegistrationNumber::new("P/S", 2025, 9_999).is_err());
    assert!(RegistrationNumber::new("P/S", 2025, 100_000).is_err());
    assert!(RegistrationNumber::new("P/S", 25, 12345).is_err());
    assert!(RegistrationNumber::new("", 2025, 12345).is_err());
    assert!(RegistrationNumber::new("has space", 2025, 12345).is_err());
    assert!(RegistrationNumber::new("P/S", 2025, 10_000).is_ok());
    assert!(RegistrationNumber::new("P/S", 2025, 99_999).is_ok());
}

#[test]
fn registration_number_parse_round_trips() {
    let reg = RegistrationNumber::parse("PFX/SUF/2025/12345").unwrap();
    assert_eq!(reg.prefix(), "PFX/SUF");
    assert_eq!(reg.to_string(), "PFX/SUF/2025/12345");

    assert!(RegistrationNumber::parse("PFX/SUF/2025/1234").is_err());
    assert!(RegistrationNumber::parse("PFX/SUF/20x5/12345").is_err());
    assert!(RegistrationNumber::parse("12345").is_err());
}

#[test]
fn random_serials_stay_five_digits() {
    for _ in 0..500 {
        let reg = RegistrationNumber::random("P/S", 2025).unwrap();
        assert!((SERIAL_MIN..=SERIAL_MAX).contains(&reg.serial()));
        assert_eq!(reg.to_string().rsplit('/').next().unwrap().len(), 5);
    }
}

#[test]
fn card_fields_reject_blank_and_multiline_values() {
    assert!(CardFields::new("P/S/2025/12345", "", "B", "1").is_err());
    assert!(CardFields::new("P/S/2025/12345", "A", "B\nC", "1").is_err());
    assert!(CardFields::new("not a reg", "A", "B", "1").is_err());
    assert!(CardFields::new("P/S/2025/12345", "A", "B", "1").is_ok());
}

#[test]
fn sample_fields_match_the_reference_card() {
    let f = CardFields::sample("PFX/SUF", 2025).unwrap();
    assert_eq!(f.registration_number(), "PFX/SUF/2025/12345");
    assert_eq!(f.name(), "Nguyen Van A");
    assert_eq!(f.father_name(), "Nguyen Van B");
    assert_eq!(f.phone(), "0123456789");
}

#[test]
fn random_source_produces_valid_printable_fields() {
    let source = RandomFieldSource::new("BBDITM/BT-CS", 2025).unwrap();
    for _ in 0..100 {
        let f = source.fields().unwrap();
        assert!(f.registration_number().starts_with("BBDITM/BT-CS/2025/"));
        for v in [f.name(), f.father_name(), f.phone()] {
            assert!(v.chars().all(|c| (' '..='~').contains(&c)), "{v:?}");
        }
        assert!(f.phone().starts_with("+91 "));
        assert_eq!(f.phone().len(), 4 + 10);
    }
}

#[test]
fn random_source_rejects_bad_prefix_up_front() {
    assert!(RandomFieldSource::new("bad prefix", 2025).is_err());
}

#[test]
fn fixed_source_repeats_its_fields() {
    let f = CardFields::sample("P/S", 2025).unwrap();
    let source = FixedFieldSource(f.clone());
    assert_eq!(source.fields().unwrap(), f);
    assert_eq!(source.fields().unwrap(), f);
}
