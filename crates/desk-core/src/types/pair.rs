//! Currency pairs accepted by the trading backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyPair {
    EurUsd,
    GbpUsd,
    UsdJpy,
    UsdChf,
    AudUsd,
    UsdCad,
    NzdUsd,
    EurJpy,
    GbpJpy,
    EurGbp,
    AudCad,
    CadJpy,
}

impl CurrencyPair {
    /// Every supported pair, in the order the pair picker lists them.
    pub const ALL: [CurrencyPair; 12] = [
        CurrencyPair::EurUsd,
        CurrencyPair::GbpUsd,
        CurrencyPair::UsdJpy,
        CurrencyPair::UsdChf,
        CurrencyPair::AudUsd,
        CurrencyPair::UsdCad,
        CurrencyPair::NzdUsd,
        CurrencyPair::EurJpy,
        CurrencyPair::GbpJpy,
        CurrencyPair::EurGbp,
        CurrencyPair::AudCad,
        CurrencyPair::CadJpy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyPair::EurUsd => "EURUSD",
            CurrencyPair::GbpUsd => "GBPUSD",
            CurrencyPair::UsdJpy => "USDJPY",
            CurrencyPair::UsdChf => "USDCHF",
            CurrencyPair::AudUsd => "AUDUSD",
            CurrencyPair::UsdCad => "USDCAD",
            CurrencyPair::NzdUsd => "NZDUSD",
            CurrencyPair::EurJpy => "EURJPY",
            CurrencyPair::GbpJpy => "GBPJPY",
            CurrencyPair::EurGbp => "EURGBP",
            CurrencyPair::AudCad => "AUDCAD",
            CurrencyPair::CadJpy => "CADJPY",
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|pair| pair.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unsupported currency pair: {}", wanted.to_uppercase()))
    }
}
