//! The fixed shop item catalogue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds added to a player's personal deadline by freeze_time.
pub const FREEZE_BONUS_MS: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemId {
    DoublePoints,
    Shield,
    BuybackToken,
    FiftyFifty,
    FreezeTime,
}

/// Passive items arm a one-shot buff consumed automatically at reveal;
/// active items are triggered by the player during a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Passive,
    Active,
}

#[derive(Debug, Clone, Copy)]
pub struct ItemSpec {
    pub id: ItemId,
    pub kind: ItemKind,
    pub cost: u64,
}

pub const ITEM_CATALOGUE: [ItemSpec; 5] = [
    ItemSpec {
        id: ItemId::DoublePoints,
        kind: ItemKind::Passive,
        cost: 100,
    },
    ItemSpec {
        id: ItemId::Shield,
        kind: ItemKind::Passive,
        cost: 100,
    },
    ItemSpec {
        id: ItemId::BuybackToken,
        kind: ItemKind::Passive,
        cost: 120,
    },
    ItemSpec {
        id: ItemId::FiftyFifty,
        kind: ItemKind::Active,
        cost: 80,
    },
    ItemSpec {
        id: ItemId::FreezeTime,
        kind: ItemKind::Active,
        cost: 70,
    },
];

impl ItemId {
    #[must_use]
    pub const fn spec(self) -> &'static ItemSpec {
        match self {
            Self::DoublePoints => &ITEM_CATALOGUE[0],
            Self::Shield => &ITEM_CATALOGUE[1],
            Self::BuybackToken => &ITEM_CATALOGUE[2],
            Self::FiftyFifty => &ITEM_CATALOGUE[3],
            Self::FreezeTime => &ITEM_CATALOGUE[4],
        }
    }

    #[must_use]
    pub const fn kind(self) -> ItemKind {
        self.spec().kind
    }

    #[must_use]
    pub const fn cost(self) -> u64 {
        self.spec().cost
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DoublePoints => "double_points",
            Self::Shield => "shield",
            Self::BuybackToken => "buyback_token",
            Self::FiftyFifty => "fifty_fifty",
            Self::FreezeTime => "freeze_time",
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_specs_are_self_consistent() {
        for spec in &ITEM_CATALOGUE {
            assert_eq!(spec.id.spec().cost, spec.cost);
            assert_eq!(spec.id.kind(), spec.kind);
        }
    }

    #[test]
    fn costs_match_the_shop_board() {
        assert_eq!(ItemId::DoublePoints.cost(), 100);
        assert_eq!(ItemId::Shield.cost(), 100);
        assert_eq!(ItemId::BuybackToken.cost(), 120);
        assert_eq!(ItemId::FiftyFifty.cost(), 80);
        assert_eq!(ItemId::FreezeTime.cost(), 70);
    }

    #[test]
    fn serde_uses_snake_case_ids() {
        assert_eq!(
            serde_json::to_string(&ItemId::FiftyFifty).unwrap(),
            r#""fifty_fifty""#
        );
    }
}
