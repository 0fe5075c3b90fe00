use std::ops::RangeInclusive;

use rand::Rng;

/// Range from which access codes are drawn.
pub const ACCESS_CODE_RANGE: RangeInclusive<i32> = 100_001..=999_999;

/// Subject line of the access code email.
pub const ACCESS_CODE_SUBJECT: &str = "Verify Your Access";

/// Draws a fresh 6-digit access code.
pub fn generate_access_code() -> i32 {
    rand::thread_rng().gen_range(ACCESS_CODE_RANGE)
}

/// HTML body of the access code email.
pub fn access_code_email_body(first_name: &str, code: i32) -> String {
    format!("<p>Hello {first_name},</p> <p>Your access code is {code}.</p>")
}

/// Exact comparison; a principal that never requested a code never matches.
pub fn code_matches(stored: Option<i32>, supplied: i32) -> bool {
    stored == Some(supplied)
}
