//! Registered types the game ships with.

use serde::{Deserialize, Serialize};

use crate::error::{PtError, PtResult};
use crate::family::{EnumFamily, FlagsFamily};
use crate::registry::{Converters, TypeRegistry};
use crate::value::CustomType;

/// Type name of the gender enum.
pub const GENDER: &str = "Gender";
/// Type name of the item flags.
pub const ITEM_FLAGS: &str = "ItemFlags";
/// Type name of [`CharacterStats`].
pub const CHARACTER_STATS: &str = "CharacterStats";

const GENDER_NAMES: &[&str] = &["Unspecified", "Male", "Female"];
const ITEM_FLAG_NAMES: &[&str] = &["Portable", "Hidden", "Stackable", "AttachedToWall"];

/// The six base attributes of a character, race or class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    /// Physical power.
    pub strength: i32,
    /// Agility and precision.
    pub dexterity: i32,
    /// Health and recovery.
    pub vitality: i32,
    /// Stamina.
    pub endurance: i32,
    /// Reasoning and magic.
    pub intelligence: i32,
    /// Devotion and divine power.
    pub faith: i32,
}

impl CustomType for CharacterStats {
    const TYPE_NAME: &'static str = CHARACTER_STATS;
}

impl CharacterStats {
    fn fields(&self) -> [i32; 6] {
        [
            self.strength,
            self.dexterity,
            self.vitality,
            self.endurance,
            self.intelligence,
            self.faith,
        ]
    }

    /// Six integers separated by spaces, in declaration order.
    pub fn to_user_text(&self) -> String {
        self.fields()
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Read six whitespace-separated integers.
    pub fn from_user_text(text: &str) -> PtResult<Self> {
        let fail = |reason: &str| PtError::decode(CHARACTER_STATS, text, reason);
        let numbers = text
            .split_whitespace()
            .map(str::parse::<i32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| fail("every stat must be an integer"))?;
        match numbers[..] {
            [strength, dexterity, vitality, endurance, intelligence, faith] => Ok(Self {
                strength,
                dexterity,
                vitality,
                endurance,
                intelligence,
                faith,
            }),
            _ => Err(fail(
                "expected strength, dexterity, vitality, endurance, intelligence and faith",
            )),
        }
    }
}

/// Register every built-in type.
pub fn register(registry: &mut TypeRegistry) -> PtResult<()> {
    registry.register_enum(EnumFamily::new(GENDER, GENDER_NAMES)?)?;
    registry.register_flags(FlagsFamily::new(ITEM_FLAGS, ITEM_FLAG_NAMES)?)?;
    registry.register_custom::<CharacterStats>(
        Converters::for_custom(
            |stats: &CharacterStats| Ok(stats.to_user_text()),
            CharacterStats::from_user_text,
        ),
        Converters::for_custom(
            |stats: &CharacterStats| Ok(serde_json::to_string(stats)?),
            stats_from_wire,
        ),
    )
}

/// Wire text for stats is a JSON object keyed by field name. Serde would
/// also take a positional array, which the wire form never carries.
fn stats_from_wire(text: &str) -> PtResult<CharacterStats> {
    let fail = |reason: String| PtError::decode(CHARACTER_STATS, text, reason);
    match serde_json::from_str::<serde_json::Value>(text).map_err(|e| fail(e.to_string()))? {
        object @ serde_json::Value::Object(_) => {
            serde_json::from_value(object).map_err(|e| fail(e.to_string()))
        }
        _ => Err(fail("expected a JSON object".to_string())),
    }
}
