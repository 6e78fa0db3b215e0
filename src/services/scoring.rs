//! Social item and market pair scoring.
//!
//! Both functions are pure; `market_score` takes `now` explicitly so the age
//! bucket is deterministic under test.

use chrono::{DateTime, Utc};

use crate::constants::scoring::*;
use crate::data::types::{MarketPair, SocialItem, TxnStats};

/// Engagement-weighted score of a social item. Not clamped.
pub fn social_score(item: &SocialItem) -> f64 {
    let base = item.likes_count as f64 * LIKE_WEIGHT
        + item.replies_count as f64 * REPLY_WEIGHT
        + item.retweets_count as f64 * REPOST_WEIGHT
        + item.quotes_count as f64 * QUOTE_WEIGHT;

    base + item.smart_engagement_points * SMART_ENGAGEMENT_WEIGHT
}

/// Age range of a pair, selecting thresholds and weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairAgeBucket {
    /// <= 30 minutes
    Launch,
    /// <= 1 hour
    FirstHour,
    /// <= 6 hours
    Early,
    /// <= 24 hours
    FirstDay,
    Established,
}

impl PairAgeBucket {
    pub fn from_age_hours(hours: f64) -> Self {
        if hours <= 0.5 {
            PairAgeBucket::Launch
        } else if hours <= 1.0 {
            PairAgeBucket::FirstHour
        } else if hours <= 6.0 {
            PairAgeBucket::Early
        } else if hours <= 24.0 {
            PairAgeBucket::FirstDay
        } else {
            PairAgeBucket::Established
        }
    }

    fn index(&self) -> usize {
        match self {
            PairAgeBucket::Launch => 0,
            PairAgeBucket::FirstHour => 1,
            PairAgeBucket::Early => 2,
            PairAgeBucket::FirstDay => 3,
            PairAgeBucket::Established => 4,
        }
    }

    /// Up to six hours old.
    pub fn is_young(&self) -> bool {
        matches!(
            self,
            PairAgeBucket::Launch | PairAgeBucket::FirstHour | PairAgeBucket::Early
        )
    }

    pub fn thresholds(&self) -> ScoreThresholds {
        let i = self.index();
        ScoreThresholds {
            liquidity: LIQUIDITY_THRESHOLDS[i],
            volume: VOLUME_THRESHOLDS[i],
            market_cap: MARKET_CAP_THRESHOLDS[i],
            txns: TXN_THRESHOLDS[i],
        }
    }

    pub fn weights(&self) -> ScoreWeights {
        match self {
            PairAgeBucket::Launch => ScoreWeights {
                liquidity: 0.4,
                volume: 0.35,
                transactions: 0.2,
                price_stability: 0.05,
                market_cap: 0.05,
                fdv_to_mcap: 0.0,
            },
            PairAgeBucket::FirstHour | PairAgeBucket::Early => ScoreWeights {
                liquidity: 0.35,
                volume: 0.3,
                transactions: 0.2,
                price_stability: 0.1,
                market_cap: 0.05,
                fdv_to_mcap: 0.0,
            },
            PairAgeBucket::FirstDay | PairAgeBucket::Established => ScoreWeights {
                liquidity: 0.3,
                volume: 0.25,
                transactions: 0.2,
                price_stability: 0.15,
                market_cap: 0.05,
                fdv_to_mcap: 0.05,
            },
        }
    }

    pub fn age_bonus(&self) -> f64 {
        AGE_BONUS[self.index()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreThresholds {
    pub liquidity: f64,
    pub volume: f64,
    pub market_cap: f64,
    pub txns: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreWeights {
    pub liquidity: f64,
    pub volume: f64,
    pub transactions: f64,
    pub price_stability: f64,
    pub market_cap: f64,
    pub fdv_to_mcap: f64,
}

fn saturating_ratio(value: f64, threshold: f64) -> f64 {
    (value / threshold).min(1.0)
}

/// Buy-side share of 24h transactions, lenient tiers for young pairs.
fn buy_ratio_score(buy_ratio: f64, bucket: PairAgeBucket) -> f64 {
    if bucket.is_young() {
        if buy_ratio >= 0.5 {
            1.0
        } else if buy_ratio >= 0.4 {
            0.8
        } else if buy_ratio >= 0.3 {
            0.6
        } else {
            0.3
        }
    } else if buy_ratio >= 0.6 {
        1.0
    } else if buy_ratio >= 0.45 {
        0.8
    } else if buy_ratio >= 0.3 {
        0.5
    } else {
        0.2
    }
}

/// Inverted volatility score, more movement tolerated for young pairs.
fn stability_score(volatility: f64, bucket: PairAgeBucket) -> f64 {
    if bucket.is_young() {
        if volatility <= 40.0 {
            1.0
        } else if volatility <= 60.0 {
            0.8
        } else if volatility <= 80.0 {
            0.5
        } else {
            0.2
        }
    } else if volatility <= 20.0 {
        1.0
    } else if volatility <= 40.0 {
        0.8
    } else if volatility <= 60.0 {
        0.5
    } else if volatility <= 80.0 {
        0.3
    } else {
        0.1
    }
}

fn fdv_ratio_score(ratio: f64) -> f64 {
    if ratio >= 0.6 {
        1.0
    } else if ratio >= 0.4 {
        0.8
    } else if ratio >= 0.2 {
        0.5
    } else {
        0.2
    }
}

/// Score a pair in [0, 100]. Missing statistics count as zero.
/// Pairs without a creation time fall into the oldest bucket.
pub fn market_score(pair: &MarketPair, now: DateTime<Utc>) -> f64 {
    let age_hours = pair.age_hours(now).unwrap_or(f64::INFINITY);
    let bucket = PairAgeBucket::from_age_hours(age_hours);
    let thresholds = bucket.thresholds();
    let weights = bucket.weights();

    let market_cap = pair.market_cap.unwrap_or(0.0);

    let liquidity_score = saturating_ratio(pair.liquidity_usd(), thresholds.liquidity) * weights.liquidity;
    let volume_score = saturating_ratio(pair.volume.h24.unwrap_or(0.0), thresholds.volume) * weights.volume;
    let mcap_score = saturating_ratio(market_cap, thresholds.market_cap) * weights.market_cap;

    let h24_txns = pair.txns.h24.unwrap_or(TxnStats::default());
    let total_txns = h24_txns.total() as f64;
    let txn_score = if total_txns > 0.0 {
        let buy_ratio = h24_txns.buys as f64 / total_txns;
        let adequacy = saturating_ratio(total_txns, thresholds.txns);
        buy_ratio_score(buy_ratio, bucket) * adequacy * weights.transactions
    } else {
        0.0
    };

    let volatility = pair.price_change.h24.unwrap_or(0.0).abs();
    let stability = stability_score(volatility, bucket) * weights.price_stability;

    let fdv_score = if bucket.is_young() {
        0.0
    } else {
        let ratio = match pair.fdv {
            Some(fdv) if market_cap != 0.0 && fdv != 0.0 => market_cap / fdv,
            _ => 0.0,
        };
        fdv_ratio_score(ratio) * weights.fdv_to_mcap
    };

    let total = (liquidity_score + volume_score + mcap_score + txn_score + stability + fdv_score) * 100.0
        + bucket.age_bonus();

    total.clamp(0.0, 100.0)
}

pub fn market_score_now(pair: &MarketPair) -> f64 {
    market_score(pair, Utc::now())
}
