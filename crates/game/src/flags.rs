//! Game flag sets
//!
//! Every set starts with a real `NO_*` (or default) member at bit 1, so a
//! zero bit pattern never decodes.

use bitflags::bitflags;
use cybergunk_model::flag_sets;

bitflags! {
    /// What consuming or equipping an item does
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Effect: u64 {
        const NO_EFFECT = 1 << 0;
        const RESTORE_HEALTH = 1 << 1;
        const RESTORE_HUNGER = 1 << 2;
        const RESTORE_THIRST = 1 << 3;
        const RESTORE_STAMINA = 1 << 4;
    }
}

bitflags! {
    /// Where an item can be carried or equipped
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ItemSlot: u64 {
        const NO_SLOT = 1 << 0;
        const WALLET = 1 << 1;
        const HEAD = 1 << 2;
        const NECK = 1 << 3;
        const SHOULDERS = 1 << 4;
        const CHEST = 1 << 5;
        const BACK = 1 << 6;
        const WRISTS = 1 << 7;
        const HANDS = 1 << 8;
        const FINGERS = 1 << 9;
        const WAIST = 1 << 10;
        const LEGS = 1 << 11;
        const FEET = 1 << 12;
        const MAIN_HAND = 1 << 13;
        const OFF_HAND = 1 << 14;
        const TWO_HAND = 1 << 15;
        const RANGED = 1 << 16;
        const AMMO = 1 << 17;
        const TOOL = 1 << 18;
        const CONSUMABLE = 1 << 19;
        const JUNK = 1 << 20;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DamageType: u64 {
        const NO_DAMAGE_TYPE = 1 << 0;
        const BALLISTIC = 1 << 1;
        const BLUNT = 1 << 2;
        const PIERCING = 1 << 3;
        const SLASHING = 1 << 4;
        const FIRE = 1 << 5;
        const COLD = 1 << 6;
        const ELECTRIC = 1 << 7;
        const POISON = 1 << 8;
        const RADIATION = 1 << 9;
        const SONIC = 1 << 10;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AmmoType: u64 {
        const NO_AMMO_TYPE = 1 << 0;
        const BULLET = 1 << 1;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Targets: u64 {
        const NO_TARGET = 1 << 0;
        const SELF = 1 << 1;
        const OTHER = 1 << 2;
        const ALL = 1 << 3;
        const IN_RANGE = 1 << 4;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WeaponModSlot: u64 {
        const NO_SLOT = 1 << 0;
        const BARREL = 1 << 1;
        const STOCK = 1 << 2;
        const GRIP = 1 << 3;
        const SIGHT = 1 << 4;
        const MAGAZINE = 1 << 5;
        const MUZZLE = 1 << 6;
        const UNDERBARREL = 1 << 7;
        const BLADE = 1 << 8;
    }
}

bitflags! {
    /// Actions an object allows
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectAction: u64 {
        const NO_ACTION = 1 << 0;
        const PICK_UP = 1 << 1;
        const DROP = 1 << 2;
        const USE = 1 << 3;
        const EQUIP = 1 << 4;
        const UNEQUIP = 1 << 5;
        const STACK = 1 << 6;
        const UNSTACK = 1 << 7;
        const INSPECT = 1 << 8;
        const ATTACK = 1 << 9;
        const DEFEND = 1 << 10;
        const MOVE = 1 << 11;
        const SELL = 1 << 12;
        const BUY = 1 << 13;
        const TRADE = 1 << 14;
    }
}

bitflags! {
    /// Level of detail for inspection
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InspectionDetails: u64 {
        const NO_INSPECT = 1 << 0;
        const SHORT_INSPECT = 1 << 1;
        const LONG_INSPECT = 1 << 2;
        const DETAILED_INSPECT = 1 << 3;
        const ACTION_INSPECT = 1 << 4;
        const SELF_INSPECT = 1 << 5;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Affliction: u64 {
        const NO_AFFLICTION = 1 << 0;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WorldSpaceType: u64 {
        const ROOM = 1 << 0;
        const HALLWAY = 1 << 1;
        const STAIRS = 1 << 2;
        const STREET = 1 << 3;
        const ALLEY = 1 << 4;
        const BUILDING = 1 << 5;
        const PARK = 1 << 6;
        const FOREST = 1 << 7;
        const MOUNTAIN = 1 << 8;
        const WATER = 1 << 9;
        const UNDERGROUND = 1 << 10;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WorldSpaceFlavor: u64 {
        const NO_FLAVOR = 1 << 0;
        const DARK = 1 << 1;
        const LIGHT = 1 << 2;
        const COLD = 1 << 3;
        const HOT = 1 << 4;
        const WET = 1 << 5;
        const DRY = 1 << 6;
        const WINDY = 1 << 7;
        const CALM = 1 << 8;
        const QUIET = 1 << 9;
        const NOISY = 1 << 10;
        const SMELLY = 1 << 11;
        const FRESH = 1 << 12;
        const DENSE = 1 << 13;
        const OPEN = 1 << 14;
        const CROWDED = 1 << 15;
        const DANGEROUS = 1 << 16;
        const SAFE = 1 << 17;
        const CLEAN = 1 << 18;
        const DIRTY = 1 << 19;
        const FAMILIAR = 1 << 20;
        const UNFAMILIAR = 1 << 21;
        const COMFORTABLE = 1 << 22;
        const UNCOMFORTABLE = 1 << 23;
    }
}

flag_sets!(
    Effect,
    ItemSlot,
    DamageType,
    AmmoType,
    Targets,
    WeaponModSlot,
    ObjectAction,
    InspectionDetails,
    Affliction,
    WorldSpaceType,
    WorldSpaceFlavor,
);
