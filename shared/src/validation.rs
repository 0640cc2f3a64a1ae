//! Validation utilities for the Yerba Store Platform
//!
//! Includes Argentina-specific validations for the store's local market.

use rust_decimal::Decimal;

// ============================================================================
// Order & Inventory Validations
// ============================================================================

/// Largest package size the store sells
pub const MAX_PACKAGE_SIZE_KG: u32 = 25;

/// Validate a package size in kilograms
///
/// Sizes are discrete retail quantities (0.25, 0.5, 1, 2, ...): positive,
/// at most two decimal places, and no larger than the biggest bag sold.
pub fn validate_package_size(size_kg: Decimal) -> Result<(), &'static str> {
    if size_kg <= Decimal::ZERO {
        return Err("Package size must be positive");
    }
    if size_kg > Decimal::from(MAX_PACKAGE_SIZE_KG) {
        return Err("Package size exceeds maximum bag size");
    }
    if size_kg.normalize().scale() > 2 {
        return Err("Package size supports at most two decimal places");
    }
    Ok(())
}

/// Validate an order number in the `ORD-YYYYMMDD-NNNN` format
pub fn validate_order_number(order_number: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = order_number.split('-').collect();

    if parts.len() != 3 {
        return Err("Order number must be in format ORD-YYYYMMDD-NNNN");
    }
    if parts[0] != "ORD" {
        return Err("Order number must start with 'ORD'");
    }
    if parts[1].len() != 8 || !parts[1].chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid date in order number");
    }
    if parts[2].len() < 4 || !parts[2].chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid sequence number in order number");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a URL-safe slug (lowercase alphanumeric and dashes)
pub fn validate_slug(slug: &str) -> Result<(), &'static str> {
    if slug.is_empty() {
        return Err("Slug cannot be empty");
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Slug must be lowercase alphanumeric with dashes");
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err("Slug cannot start or end with a dash");
    }
    Ok(())
}

// ============================================================================
// Argentina-Specific Validations
// ============================================================================

/// Validate an Argentine phone number format
/// Accepts: 3514567890, 0351-456-7890, +5493514567890
pub fn validate_argentine_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Area code + number without trunk prefix (e.g., 3514567890)
    if digits.len() == 10 && !digits.starts_with('0') {
        return Ok(());
    }
    // With leading trunk zero (e.g., 03514567890)
    if digits.len() == 11 && digits.starts_with('0') {
        return Ok(());
    }
    // International format: 54 + number (e.g., 543514567890)
    if digits.len() == 12 && digits.starts_with("54") {
        return Ok(());
    }
    // International mobile format: 549 + number (e.g., 5493514567890)
    if digits.len() == 13 && digits.starts_with("549") {
        return Ok(());
    }

    Err("Invalid Argentine phone number format")
}

/// Validate an Argentine postal code
/// Accepts the legacy 4-digit format (5000) and the CPA format (X5000ABC)
pub fn validate_argentine_postal_code(postal_code: &str) -> Result<(), &'static str> {
    let code = postal_code.trim();

    // Legacy numeric format
    if code.len() == 4 && code.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }

    // CPA: one letter, four digits, three letters
    if code.len() == 8 {
        let chars: Vec<char> = code.chars().collect();
        let letter_head = chars[0].is_ascii_alphabetic();
        let digits_mid = chars[1..5].iter().all(|c| c.is_ascii_digit());
        let letters_tail = chars[5..8].iter().all(|c| c.is_ascii_alphabetic());
        if letter_head && digits_mid && letters_tail {
            return Ok(());
        }
    }

    Err("Invalid Argentine postal code")
}

/// Argentine provinces where yerba mate is traditionally grown
pub const YERBA_PROVINCES: &[&str] = &["Misiones", "Corrientes"];

/// Check whether an origin label names a traditional yerba-growing province
pub fn is_traditional_yerba_origin(origin: &str) -> bool {
    YERBA_PROVINCES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(origin.trim()))
}
