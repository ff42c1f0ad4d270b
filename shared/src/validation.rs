//! Validation helpers shared by the server and the browser

use rust_decimal::Decimal;

use crate::models::{is_known_source, STOCK_UNITS};

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

pub fn validate_product_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Product name is required");
    }
    Ok(())
}

/// Prices entered in forms must be strictly positive
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be greater than zero");
    }
    Ok(())
}

pub fn validate_unit(unit: &str) -> Result<(), &'static str> {
    if STOCK_UNITS.contains(&unit) {
        Ok(())
    } else {
        Err("Unit must be one of: set, buc")
    }
}

pub fn validate_sale_source(source: &str) -> Result<(), &'static str> {
    if is_known_source(source.trim()) {
        Ok(())
    } else {
        Err("Unknown sale source")
    }
}

/// Parse a price typed with either a decimal point or a decimal comma
pub fn parse_price_input(input: &str) -> Option<Decimal> {
    input.trim().replace(',', ".").parse::<Decimal>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("ana").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("parola123").is_ok());
        assert!(validate_password("scurt").is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Set oale").is_ok());
        assert!(validate_product_name("   ").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Decimal::new(1, 2)).is_ok());
        assert!(validate_price(Decimal::ZERO).is_err());
        assert!(validate_price(Decimal::from(-5)).is_err());
    }

    #[test]
    fn test_validate_unit() {
        assert!(validate_unit("set").is_ok());
        assert!(validate_unit("buc").is_ok());
        assert!(validate_unit("kg").is_err());
    }

    #[test]
    fn test_validate_sale_source() {
        assert!(validate_sale_source("Prieteni").is_ok());
        assert!(validate_sale_source(" TikTok ").is_ok());
        assert!(validate_sale_source("Radio").is_err());
    }

    #[test]
    fn test_parse_price_input() {
        assert_eq!(parse_price_input("12,50"), Some(Decimal::new(1250, 2)));
        assert_eq!(parse_price_input(" 7.5 "), Some(Decimal::new(75, 1)));
        assert_eq!(parse_price_input("abc"), None);
    }
}
