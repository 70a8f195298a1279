pub mod roster;
pub mod spells;

pub use roster::{
    load_roster, load_roster_or_default, HealerDef, Roster, TankDef, DEFAULT_ROSTER_PATH,
};
pub use spells::{find_spell, spells_for, HealerClass, SpellProfile, SPELLS};
