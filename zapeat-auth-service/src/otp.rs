use rand::Rng;

use crate::error::AuthError;

pub const CODE_LENGTH: usize = 6;

/// Strips spaces, dashes and parentheses and requires `+` followed by 9 to 15 digits.
pub fn normalize_mobile_number(raw: &str) -> Result<String, AuthError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = cleaned
        .strip_prefix('+')
        .ok_or(AuthError::InvalidMobileNumber)?;
    if (9..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) {
        Ok(cleaned)
    } else {
        Err(AuthError::InvalidMobileNumber)
    }
}

pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(0..1_000_000);
    format!("{code:0width$}", width = CODE_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_is_removed() {
        assert_eq!(
            normalize_mobile_number("+91 (987) 654-3210").unwrap(),
            "+919876543210"
        );
        assert_eq!(
            normalize_mobile_number("+91 98765-43210").unwrap(),
            "+919876543210"
        );
        assert_eq!(normalize_mobile_number("+123456789").unwrap(), "+123456789");
    }

    #[test]
    fn numbers_without_country_prefix_are_rejected() {
        assert!(matches!(
            normalize_mobile_number("9876543210"),
            Err(AuthError::InvalidMobileNumber)
        ));
    }

    #[test]
    fn digit_count_is_bounded() {
        assert!(normalize_mobile_number("+12345678").is_err());
        assert!(normalize_mobile_number("+1234567890123456").is_err());
        assert!(normalize_mobile_number("+91987654321a").is_err());
        assert!(normalize_mobile_number("12345").is_err());
        assert!(normalize_mobile_number("").is_err());
    }

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
