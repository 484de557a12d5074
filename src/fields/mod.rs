//! Card field values and the sources that produce them.

use std::fmt;

use rand::{Rng, seq::IndexedRandom};

use crate::foundation::error::{CardError, CardResult};

/// Lowest registration serial (inclusive).
pub const SERIAL_MIN: u32 = 10_000;
/// Highest registration serial (inclusive).
pub const SERIAL_MAX: u32 = 99_999;

/// `PREFIX/SUFFIX/YEAR/DDDDD` registration number.
///
/// `prefix` holds everything before the year, slashes included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationNumber {
    prefix: String,
    year: i32,
    serial: u32,
}

impl RegistrationNumber {
    /// Validated registration number.
    pub fn new(prefix: impl Into<String>, year: i32, serial: u32) -> CardResult<Self> {
        let prefix = prefix.into();
        let prefix = prefix.trim_matches('/').to_string();
        if prefix.is_empty() {
            return Err(CardError::validation("registration prefix must be non-empty"));
        }
        if !prefix.chars().all(|c| c.is_ascii_graphic()) {
            return Err(CardError::validation(format!(
                "registration prefix {prefix:?} must be printable ASCII without spaces"
            )));
        }
        if !(1000..=9999).contains(&year) {
            return Err(CardError::validation(format!(
                "registration year {year} must have four digits"
            )));
        }
        if !(SERIAL_MIN..=SERIAL_MAX).contains(&serial) {
            return Err(CardError::validation(format!(
                "registration serial {serial} outside {SERIAL_MIN}..={SERIAL_MAX}"
            )));
        }
        Ok(Self {
            prefix,
            year,
            serial,
        })
    }

    /// Registration number with a uniformly drawn serial.
    pub fn random(prefix: impl Into<String>, year: i32) -> CardResult<Self> {
        let serial = rand::rng().random_range(SERIAL_MIN..=SERIAL_MAX);
        Self::new(prefix, year, serial)
    }

    /// Parse `PREFIX/.../YEAR/DDDDD`.
    pub fn parse(s: &str) -> CardResult<Self> {
        let mut parts = s.rsplitn(3, '/');
        let (Some(serial), Some(year), Some(prefix)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(CardError::validation(format!(
                "registration number {s:?} must look like PREFIX/SUFFIX/YEAR/DDDDD"
            )));
        };
        if serial.len() != 5 || !serial.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CardError::validation(format!(
                "registration serial {serial:?} must be five digits"
            )));
        }
        let year = year
            .parse::<i32>()
            .map_err(|_| CardError::validation(format!("registration year {year:?} is not a number")))?;
        let serial = serial
            .parse::<u32>()
            .map_err(|_| CardError::validation(format!("registration serial {serial:?} is not a number")))?;
        Self::new(prefix, year, serial)
    }

    /// Everything before the year.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Issue year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Five-digit serial.
    pub fn serial(&self) -> u32 {
        self.serial
    }
}

impl fmt::Display for RegistrationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{:05}", self.prefix, self.year, self.serial)
    }
}

/// Values printed on one card. The registration number doubles as the barcode payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardFields {
    registration_number: String,
    name: String,
    father_name: String,
    phone: String,
}

impl CardFields {
    /// Validated field set. Text fields must be single-line and non-empty.
    pub fn new(
        registration_number: impl Into<String>,
        name: impl Into<String>,
        father_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> CardResult<Self> {
        let registration_number = registration_number.into();
        RegistrationNumber::parse(&registration_number)?;

        let fields = Self {
            registration_number,
            name: name.into(),
            father_name: father_name.into(),
            phone: phone.into(),
        };
        for (label, value) in [
            ("name", &fields.name),
            ("father name", &fields.father_name),
            ("phone", &fields.phone),
        ] {
            if value.trim().is_empty() {
                return Err(CardError::validation(format!("{label} must be non-empty")));
            }
            if value.contains(['\n', '\r']) {
                return Err(CardError::validation(format!("{label} must be a single line")));
            }
        }
        Ok(fields)
    }

    /// Registration number, also the barcode payload.
    pub fn registration_number(&self) -> &str {
        &self.registration_number
    }

    /// Holder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Holder's father's name.
    pub fn father_name(&self) -> &str {
        &self.father_name
    }

    /// Contact phone number.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// The fixed sample card used by the test route.
    pub fn sample(prefix: &str, year: i32) -> CardResult<Self> {
        let reg = RegistrationNumber::new(prefix, year, 12_345)?;
        Self::new(reg.to_string(), "Nguyen Van A", "Nguyen Van B", "0123456789")
    }
}

/// Produces the field values for a new card.
pub trait FieldSource: Send + Sync {
    /// Fresh field set.
    fn fields(&self) -> CardResult<CardFields>;
}

/// Always returns the same fields.
#[derive(Clone, Debug)]
pub struct FixedFieldSource(pub CardFields);

impl FieldSource for FixedFieldSource {
    fn fields(&self) -> CardResult<CardFields> {
        Ok(self.0.clone())
    }
}

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Aditi", "Akash", "Ananya", "Arjun", "Diya", "Ishaan", "Kavya", "Krishna", "Meera",
    "Neha", "Nikhil", "Pooja", "Priya", "Rahul", "Rohan", "Saanvi", "Sanjay", "Shreya", "Vihaan",
    "Vikram", "Yash",
];

const LAST_NAMES: &[&str] = &[
    "Agarwal", "Banerjee", "Chopra", "Desai", "Gupta", "Iyer", "Joshi", "Kapoor", "Kumar",
    "Malhotra", "Mehta", "Nair", "Patel", "Rao", "Reddy", "Sharma", "Singh", "Verma",
];

/// Plausible random names and phone numbers.
#[derive(Clone, Debug)]
pub struct RandomFieldSource {
    prefix: String,
    year: i32,
}

impl RandomFieldSource {
    /// Source issuing registration numbers under `prefix` for `year`.
    pub fn new(prefix: impl Into<String>, year: i32) -> CardResult<Self> {
        let prefix = prefix.into();
        // Validate once so every later draw succeeds.
        RegistrationNumber::new(prefix.clone(), year, SERIAL_MIN)?;
        Ok(Self { prefix, year })
    }

    fn full_name<R: Rng + ?Sized>(rng: &mut R) -> String {
        let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Asha");
        let last = LAST_NAMES.choose(rng).copied().unwrap_or("Kumar");
        format!("{first} {last}")
    }

    fn phone<R: Rng + ?Sized>(rng: &mut R) -> String {
        let lead = rng.random_range(6..=9);
        let rest = rng.random_range(0..1_000_000_000u64);
        format!("+91 {lead}{rest:09}")
    }
}

impl FieldSource for RandomFieldSource {
    fn fields(&self) -> CardResult<CardFields> {
        let mut rng = rand::rng();
        let reg = RegistrationNumber::random(self.prefix.clone(), self.year)?;
        let name = Self::full_name(&mut rng);
        let father_name = Self::full_name(&mut rng);
        let phone = Self::phone(&mut rng);
        CardFields::new(reg.to_string(), name, father_name, phone)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fields/mod.rs"]
mod tests;
