pub const PLATFORM_FEE_RATE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub payout: f64,
    pub fee: f64,
    pub total: f64,
}

/// Platform fee on a driver payout. Rounded to whole dollars with
/// `f64::round`, i.e. half away from zero. The value persisted at job
/// creation is authoritative; this is only re-run for quote previews.
pub fn platform_fee(payout: f64) -> f64 {
    (payout * PLATFORM_FEE_RATE).round()
}

pub fn quote(payout: f64) -> Quote {
    let fee = platform_fee(payout);
    Quote {
        payout,
        fee,
        total: payout + fee,
    }
}
