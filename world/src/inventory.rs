//! Wood and stone counters spent on towers.

use town_defence_core::ResourceCost;

/// Player stockpile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Inventory {
    wood: u32,
    stone: u32,
}

impl Inventory {
    pub(crate) fn wood(&self) -> u32 {
        self.wood
    }

    pub(crate) fn stone(&self) -> u32 {
        self.stone
    }

    pub(crate) fn deposit(&mut self, wood: u32, stone: u32) {
        self.wood = self.wood.saturating_add(wood);
        self.stone = self.stone.saturating_add(stone);
    }

    pub(crate) fn can_afford(&self, cost: ResourceCost) -> bool {
        self.wood >= cost.wood && self.stone >= cost.stone
    }

    /// Deducts the cost when affordable; otherwise leaves the counters untouched.
    pub(crate) fn try_spend(&mut self, cost: ResourceCost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.wood -= cost.wood;
        self.stone -= cost.stone;
        true
    }
}
