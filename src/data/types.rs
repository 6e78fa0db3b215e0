use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub amount: f64,
    /// Best-effort, providers do not always report it
    pub usd_value: f64,
    /// Average native-currency price paid per held unit
    pub cost_basis_native: f64,
}

/// A candidate or held token, rebuilt from upstream providers every iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub name: String,
    pub address: String,
    pub chain_id: String,
    pub balance: Option<TokenBalance>,
}

impl Token {
    pub fn new(symbol: &str, name: &str, address: &str, chain_id: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            chain_id: chain_id.to_string(),
            balance: None,
        }
    }

    pub fn with_balance(mut self, balance: TokenBalance) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn has_position(&self) -> bool {
        self.balance.as_ref().map(|b| b.amount > 0.0).unwrap_or(false)
    }

    /// Symbol identity used for merging candidate lists.
    pub fn dedup_key(&self) -> String {
        self.symbol.to_lowercase()
    }
}

// ============= Social =============

/// A social post as returned by the search provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialItem {
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub replies_count: u64,
    #[serde(default)]
    pub retweets_count: u64,
    #[serde(default)]
    pub quotes_count: u64,
    #[serde(default)]
    pub smart_engagement_points: f64,
    #[serde(default)]
    pub engagements_count: u64,
    #[serde(default)]
    pub impressions_count: u64,
    #[serde(default)]
    pub is_quote: bool,
    #[serde(default)]
    pub is_reply: bool,
    #[serde(default)]
    pub matching_score: f64,
}

/// A social item plus the fields derived when it was fetched. Never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredSocialItem {
    #[serde(flatten)]
    pub item: SocialItem,
    pub score: f64,
    pub relative_age: String,
    pub single_line_text: String,
    pub engagement_summary: String,
}

// ============= Market pairs =============

/// Reporting windows used by the market data provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    M5,
    H1,
    H6,
    H24,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::M5, Period::H1, Period::H6, Period::H24];

    pub fn window(&self) -> Duration {
        match self {
            Period::M5 => Duration::minutes(5),
            Period::H1 => Duration::hours(1),
            Period::H6 => Duration::hours(6),
            Period::H24 => Duration::hours(24),
        }
    }
}

/// One optional value per reporting window. `None` means "not measurable yet", never zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodValues<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m5: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h1: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h6: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h24: Option<T>,
}

impl<T> Default for PeriodValues<T> {
    fn default() -> Self {
        Self { m5: None, h1: None, h6: None, h24: None }
    }
}

impl<T> PeriodValues<T> {
    pub fn get(&self, period: Period) -> Option<&T> {
        match period {
            Period::M5 => self.m5.as_ref(),
            Period::H1 => self.h1.as_ref(),
            Period::H6 => self.h6.as_ref(),
            Period::H24 => self.h24.as_ref(),
        }
    }

    fn slot(&mut self, period: Period) -> &mut Option<T> {
        match period {
            Period::M5 => &mut self.m5,
            Period::H1 => &mut self.h1,
            Period::H6 => &mut self.h6,
            Period::H24 => &mut self.h24,
        }
    }

    /// Drop every value whose window is longer than `age`.
    pub fn retain_mature(&mut self, age: Duration) {
        for period in Period::ALL {
            if age < period.window() {
                *self.slot(period) = None;
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TxnStats {
    pub buys: u64,
    pub sells: u64,
}

impl TxnStats {
    pub fn total(&self) -> u64 {
        self.buys + self.sells
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Liquidity {
    #[serde(default)]
    pub usd: f64,
    #[serde(default)]
    pub base: f64,
    #[serde(default)]
    pub quote: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PairToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

/// A tradable pair with its per-period statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPair {
    pub chain_id: String,
    pub dex_id: String,
    #[serde(default)]
    pub url: String,
    pub pair_address: String,
    pub base_token: PairToken,
    pub quote_token: PairToken,
    #[serde(default)]
    pub price_native: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub txns: PeriodValues<TxnStats>,
    #[serde(default)]
    pub volume: PeriodValues<f64>,
    #[serde(default)]
    pub price_change: PeriodValues<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<Liquidity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fdv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_created_at: Option<i64>,
}

impl MarketPair {
    pub fn price_native(&self) -> f64 {
        self.price_native.parse().unwrap_or(0.0)
    }

    pub fn price_usd(&self) -> f64 {
        self.price_usd
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or(0.0)
    }

    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.map(|l| l.usd).unwrap_or(0.0)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.pair_created_at.and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.created_at().map(|created| now - created)
    }

    pub fn age_hours(&self, now: DateTime<Utc>) -> Option<f64> {
        self.age(now).map(|age| age.num_milliseconds() as f64 / 3_600_000.0)
    }

    /// Copy of the pair with every statistic younger than its reporting window removed.
    /// Pairs without a creation time keep all of their statistics.
    pub fn without_immature_stats(&self, now: DateTime<Utc>) -> MarketPair {
        let mut pair = self.clone();
        if let Some(age) = self.age(now) {
            pair.txns.retain_mature(age);
            pair.volume.retain_mature(age);
            pair.price_change.retain_mature(age);
        }
        pair
    }
}

// ============= Portfolio =============

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapLeg {
    pub address: String,
    #[serde(default)]
    pub symbol: String,
    pub amount: String,
    #[serde(default)]
    pub usd_amount: f64,
}

impl SwapLeg {
    pub fn amount(&self) -> f64 {
        self.amount.parse().unwrap_or(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapKind {
    Buy,
    Sell,
}

/// One historical wallet swap, used only for cost basis replay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    pub transaction_hash: String,
    pub transaction_type: SwapKind,
    #[serde(default)]
    pub block_timestamp: String,
    pub bought: SwapLeg,
    pub sold: SwapLeg,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Holdings {
    pub native_balance: f64,
    pub tokens: Vec<Token>,
}
