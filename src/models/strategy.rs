use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order in which candidates are considered before the top `count` are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Market rank, best (lowest number) first
    #[default]
    Rank,
    /// Window profit, highest first
    Profit,
    /// Max drawdown, shallowest first
    Drawdown,
}

/// How portions are computed for the selected assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightBy {
    /// Inverse market rank
    Rank,
    /// Inverse market rank scaled by window profit
    #[default]
    Profit,
    /// Inverse max drawdown
    Drawdown,
    /// Same portion for every asset
    Equal,
    /// Average of the profit and drawdown allocations
    Optimal,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rank" => Ok(SortBy::Rank),
            "profit" => Ok(SortBy::Profit),
            "drawdown" => Ok(SortBy::Drawdown),
            other => Err(format!(
                "Invalid sort-by '{}'. Must be 'rank', 'profit', or 'drawdown'",
                other
            )),
        }
    }
}

impl FromStr for WeightBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rank" => Ok(WeightBy::Rank),
            "profit" => Ok(WeightBy::Profit),
            "drawdown" => Ok(WeightBy::Drawdown),
            "equal" => Ok(WeightBy::Equal),
            "optimal" => Ok(WeightBy::Optimal),
            other => Err(format!(
                "Invalid weight-by '{}'. Must be one of rank, profit, drawdown, equal, optimal",
                other
            )),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SortBy::Rank => write!(f, "rank"),
            SortBy::Profit => write!(f, "profit"),
            SortBy::Drawdown => write!(f, "drawdown"),
        }
    }
}

impl fmt::Display for WeightBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WeightBy::Rank => write!(f, "rank"),
            WeightBy::Profit => write!(f, "profit"),
            WeightBy::Drawdown => write!(f, "drawdown"),
            WeightBy::Equal => write!(f, "equal"),
            WeightBy::Optimal => write!(f, "optimal"),
        }
    }
}
