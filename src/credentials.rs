//! Form checks run before login, registration and account requests.
//!
//! Each `*_issues` function returns every problem it finds so a form can
//! show them together; an empty list means the input is acceptable.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{NewAccount, RegisterRequest};

/// Longest accepted email address.
pub const MAX_EMAIL_LEN: usize = 255;

/// Largest balance an account may be opened with.
pub const MAX_ACCOUNT_BALANCE: f64 = 10_000_000.0;

/// Characters that satisfy the password "special character" rule.
const PASSWORD_SPECIALS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Characters reported as special in a name.
const NAME_SPECIALS: &str = "!@#$%^&*()_+=[]{}|;:\",.<>?/\\`~";

/// Returns the compiled email pattern.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
    })
}

/// Returns `true` for a plausibly valid email of at most 255 characters.
#[inline]
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && email_pattern().is_match(email)
}

/// Lists the password rules `password` breaks.
#[inline]
#[must_use]
pub fn password_issues(password: &str) -> Vec<String> {
    let len = password.chars().count();
    let rules: [(bool, &str); 6] = [
        (len < 8, "Password must be at least 8 characters long"),
        (len > 128, "Password must be less than 128 characters"),
        (
            !password.chars().any(|ch| ch.is_ascii_lowercase()),
            "Password must contain at least one lowercase letter (a-z)",
        ),
        (
            !password.chars().any(|ch| ch.is_ascii_uppercase()),
            "Password must contain at least one uppercase letter (A-Z)",
        ),
        (
            !password.chars().any(|ch| ch.is_ascii_digit()),
            "Password must contain at least one number (0-9)",
        ),
        (
            !password.chars().any(|ch| PASSWORD_SPECIALS.contains(ch)),
            "Password must contain at least one special character (!@#$%^&*...)",
        ),
    ];
    collect_failures(&rules)
}

/// Lists the problems with a full name. Surrounding whitespace is ignored.
#[inline]
#[must_use]
pub fn name_issues(name: &str) -> Vec<String> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    let only_letters = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphabetic() || ch.is_whitespace() || ch == '\'' || ch == '-');
    let rules: [(bool, &str); 5] = [
        (
            trimmed.split_whitespace().count() < 2,
            "Please enter both first and last name (separated by space)",
        ),
        (len < 5, "Name must be at least 5 characters long"),
        (len > 100, "Name must be less than 100 characters"),
        (
            !only_letters && trimmed.chars().any(|ch| ch.is_ascii_digit()),
            "Name cannot contain numbers",
        ),
        (
            !only_letters && trimmed.chars().any(|ch| NAME_SPECIALS.contains(ch)),
            "Name cannot contain special characters (except - and ')",
        ),
    ];
    collect_failures(&rules)
}

/// Lists the problems with a new account form.
#[inline]
#[must_use]
pub fn account_issues(account: &NewAccount) -> Vec<String> {
    let rules: [(bool, &str); 5] = [
        (account.name.trim().is_empty(), "Please enter an account name"),
        (account.kind.trim().is_empty(), "Please select an account type"),
        (
            !account.balance.is_finite() || account.balance < 0.0_f64,
            "Please enter a valid balance (0 or greater)",
        ),
        (
            account.balance > MAX_ACCOUNT_BALANCE,
            "Balance cannot exceed 10,000,000",
        ),
        (account.currency.trim().is_empty(), "Please enter a currency"),
    ];
    collect_failures(&rules)
}

/// Lists the problems with a login form.
#[inline]
#[must_use]
pub fn login_issues(email: &str, password: &str) -> Vec<String> {
    let rules: [(bool, &str); 2] = [
        (!is_valid_email(email), "Please enter a valid email address"),
        (password.is_empty(), "Please enter your password"),
    ];
    collect_failures(&rules)
}

/// Lists the problems with a registration form.
#[inline]
#[must_use]
pub fn registration_issues(request: &RegisterRequest) -> Vec<String> {
    let mut issues = name_issues(&request.name);
    if !is_valid_email(&request.email) {
        issues.push("Please enter a valid email address".to_owned());
    }
    issues.extend(password_issues(&request.password));
    issues
}

/// Keeps the messages whose condition is true.
fn collect_failures(rules: &[(bool, &str)]) -> Vec<String> {
    rules
        .iter()
        .filter(|&&(failed, _)| failed)
        .map(|&(_, message)| message.to_owned())
        .collect()
}
