pub mod password {

    pub const HISTORY_LIMIT: usize = 5;

    pub const MIN_LENGTH: usize = 8;

    pub const MAX_AGE_DAYS: i64 = 90;

    /// Characters that satisfy the "symbol" strength rule.
    pub const SYMBOLS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;
}

pub mod otp {

    pub const DIGITS: usize = 6;

    pub const LIFETIME_MS: i64 = 15 * 60 * 1000;
}

pub mod tokens {

    pub const USER_TTL_SECS: u64 = 7 * 24 * 60 * 60;

    pub const ADMIN_TTL_SECS: u64 = 90 * 24 * 60 * 60;
}

pub mod payments {

    pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

    /// Accepted clock skew between the gateway's signature timestamp and ours.
    pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;
}

pub mod limits {

    pub const DEFAULT_PAGE_SIZE: u64 = 50;

    pub const MAX_PAGE_SIZE: u64 = 500;
}
