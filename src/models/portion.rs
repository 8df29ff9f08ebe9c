use serde::{Deserialize, Serialize};

/// Integer percentage weight of one asset inside a basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portion {
    pub asset_id: String,
    pub portion: u32,
}

impl Portion {
    pub fn new(asset_id: impl Into<String>, portion: u32) -> Self {
        Self {
            asset_id: asset_id.into(),
            portion,
        }
    }
}

fn default_starting_balance() -> f64 {
    1.0
}

/// Named composition of an index: which assets, in which portions, and the
/// monetary value the index starts at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    pub name: String,
    pub portions: Vec<Portion>,
    #[serde(default = "default_starting_balance")]
    pub starting_balance: f64,
}

impl Basket {
    pub fn new(name: impl Into<String>, portions: Vec<Portion>) -> Self {
        Self {
            name: name.into(),
            portions,
            starting_balance: default_starting_balance(),
        }
    }

    pub fn with_starting_balance(mut self, starting_balance: f64) -> Self {
        self.starting_balance = starting_balance;
        self
    }
}

/// Asset metadata as delivered by the market-data collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMeta {
    pub id: String,
    pub rank: u32,
    pub symbol: String,
}

/// A candidate asset with the statistics the allocation strategies rank on.
///
/// `profit` and `drawdown` are percentages over the index window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAsset {
    pub id: String,
    pub symbol: String,
    pub rank: u32,
    pub profit: f64,
    pub drawdown: f64,
}

impl RankedAsset {
    pub fn new(id: impl Into<String>, rank: u32, profit: f64, drawdown: f64) -> Self {
        let id = id.into();
        Self {
            symbol: id.clone(),
            id,
            rank,
            profit,
            drawdown,
        }
    }

    pub fn from_meta(meta: &AssetMeta, profit: f64, drawdown: f64) -> Self {
        Self {
            id: meta.id.clone(),
            symbol: meta.symbol.clone(),
            rank: meta.rank,
            profit,
            drawdown,
        }
    }
}
