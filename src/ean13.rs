//! EAN-13 code generation and checksum helpers.
//!
//! Product codes are `20` + ten hash digits + check digit. The hash is 64-bit
//! FNV-1a over the UTF-8 bytes of the name, so a name maps to the same code on
//! every run and every platform.

use std::fmt;

use crate::catalog::ProductName;
use crate::consts::{CODE_PREFIX, EAN13_LEN};
use crate::error::Ean13Error;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A 13-digit code whose last digit is a valid check digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ean13(String);

impl Ean13 {
    /// Accept exactly 13 digits with a correct check digit.
    pub fn parse(code: &str) -> Result<Self, Ean13Error> {
        ensure_digits(code, EAN13_LEN)?;
        let expected = check_digit(&code[..12])?;
        let found = code.as_bytes()[12] - b'0';
        if expected != found {
            return Err(Ean13Error::CheckDigit { expected, found });
        }
        Ok(Ean13(code.to_string()))
    }

    /// Append the check digit to 12 data digits.
    pub fn from_data_digits(first12: &str) -> Result<Self, Ean13Error> {
        let check = check_digit(first12)?;
        let mut code = String::with_capacity(EAN13_LEN);
        code.push_str(first12);
        code.push(char::from(b'0' + check));
        Ok(Ean13(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 12 digits before the check digit (EPL2 `E30` computes its own).
    pub fn data_digits(&self) -> &str {
        &self.0[..12]
    }

    pub fn check(&self) -> u8 {
        self.0.as_bytes()[12] - b'0'
    }

    /// Digit values, most significant first.
    pub fn digits(&self) -> [u8; EAN13_LEN] {
        let mut out = [0u8; EAN13_LEN];
        for (slot, b) in out.iter_mut().zip(self.0.bytes()) {
            *slot = b - b'0';
        }
        out
    }
}

impl fmt::Display for Ean13 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ean13 {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the product's code. Total: `ProductName` is never empty.
pub fn generate_code(name: &ProductName) -> Ean13 {
    let width = 12 - CODE_PREFIX.len();
    let modulus = 10u64.pow(width as u32);
    let payload = fnv1a64(name.as_str().as_bytes()) % modulus;
    let first12 = format!("{CODE_PREFIX}{payload:0width$}");
    // prefix and payload are digits by construction
    let check = weighted_check(first12.bytes().map(|b| b - b'0'));
    let mut code = first12;
    code.push(char::from(b'0' + check));
    Ean13(code)
}

/// EAN-13 check digit for exactly 12 ASCII digits.
pub fn check_digit(first12: &str) -> Result<u8, Ean13Error> {
    ensure_digits(first12, 12)?;
    Ok(weighted_check(first12.bytes().map(|b| b - b'0')))
}

/// Strip non-digits; 12 digits get a check digit appended, 13 are validated.
pub fn normalize_ean13(raw: &str) -> Result<Ean13, Ean13Error> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        12 => Ean13::from_data_digits(&digits),
        13 => Ean13::parse(&digits),
        n => Err(Ean13Error::Length { expected: EAN13_LEN, actual: n }),
    }
}

fn weighted_check(digits: impl Iterator<Item = u8>) -> u8 {
    let sum: u32 = digits
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d as u32 } else { d as u32 * 3 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

fn ensure_digits(s: &str, expected: usize) -> Result<(), Ean13Error> {
    if let Some(c) = s.chars().find(|c| !c.is_ascii_digit()) {
        return Err(Ean13Error::NonDigit(c));
    }
    if s.len() != expected {
        return Err(Ean13Error::Length { expected, actual: s.len() });
    }
    Ok(())
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| (hash ^ b as u64).wrapping_mul(FNV_PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ProductName {
        ProductName::new(s).unwrap()
    }

    fn assert_valid(code: &Ean13) {
        let s = code.as_str();
        assert_eq!(s.len(), 13, "{s}");
        assert!(s.bytes().all(|b| b.is_ascii_digit()), "{s}");
        assert_eq!(check_digit(&s[..12]).unwrap(), code.check(), "{s}");
    }

    #[test]
    fn known_gtins_have_expected_check_digits() {
        assert_eq!(check_digit("400638133393").unwrap(), 1);
        assert_eq!(check_digit("590123412345").unwrap(), 7);
        assert!(Ean13::parse("4006381333931").is_ok());
        assert!(Ean13::parse("5901234123457").is_ok());
    }

    #[test]
    fn parse_rejects_bad_check_digit() {
        assert_eq!(
            Ean13::parse("4006381333932"),
            Err(Ean13Error::CheckDigit { expected: 1, found: 2 })
        );
    }

    #[test]
    fn parse_rejects_wrong_length_and_non_digits() {
        assert_eq!(
            Ean13::parse("400638133393"),
            Err(Ean13Error::Length { expected: 13, actual: 12 })
        );
        assert_eq!(Ean13::parse("40063813339x1"), Err(Ean13Error::NonDigit('x')));
    }

    #[test]
    fn generated_codes_are_deterministic() {
        for s in ["Apple 1kg", "Banana 500g", "تفاح ١ كجم", "A"] {
            assert_eq!(generate_code(&name(s)), generate_code(&name(s)));
        }
    }

    #[test]
    fn generated_codes_are_valid_ean13() {
        for s in ["Apple 1kg", "Apple 500g", "Mango 1kg", "x", "~!@#$%^&*()", "تفاح"] {
            assert_valid(&generate_code(&name(s)));
        }
    }

    #[test]
    fn distinct_names_get_distinct_codes() {
        assert_ne!(generate_code(&name("Apple 1kg")), generate_code(&name("Apple 500g")));
    }

    #[test]
    fn single_character_name() {
        let code = generate_code(&name("A"));
        assert_valid(&code);
        assert!(code.as_str().starts_with(CODE_PREFIX));
    }

    #[test]
    fn banana_code_uses_internal_prefix() {
        let code = generate_code(&name("Banana 1kg"));
        assert!(code.as_str().starts_with("20"));
        assert_valid(&code);
        // reparsing the generated code must succeed
        assert_eq!(Ean13::parse(code.as_str()).unwrap(), code);
    }

    #[test]
    fn generated_codes_are_pinned() {
        // any change to prefix, hash, modulus or padding shows up here
        assert_eq!(generate_code(&name("Apple 1kg")).as_str(), "2094736506224");
        assert_eq!(generate_code(&name("Banana 1kg")).as_str(), "2053679408293");
    }

    #[test]
    fn hash_is_stable_across_releases() {
        // FNV-1a reference vectors
        assert_eq!(fnv1a64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a64(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn normalize_strips_separators() {
        assert_eq!(normalize_ean13("400-6381-33393").unwrap().as_str(), "4006381333931");
        assert_eq!(normalize_ean13(" 5901234123457\r\n").unwrap().as_str(), "5901234123457");
        assert!(matches!(
            normalize_ean13("12345"),
            Err(Ean13Error::Length { expected: 13, actual: 5 })
        ));
    }

    #[test]
    fn data_digits_drop_check_digit() {
        let code = Ean13::parse("5901234123457").unwrap();
        assert_eq!(code.data_digits(), "590123412345");
        assert_eq!(code.digits()[0], 5);
        assert_eq!(code.digits()[12], 7);
    }
}
