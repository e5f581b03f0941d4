//! The fixed set of companions a user can pick from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::CompanionError;

/// Which animal is following the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimalKind {
    #[default]
    Cat,
    Dog,
    Fox,
    Rabbit,
    Panda,
    Dragon,
}

impl AnimalKind {
    pub const ALL: [AnimalKind; 6] = [
        AnimalKind::Cat,
        AnimalKind::Dog,
        AnimalKind::Fox,
        AnimalKind::Rabbit,
        AnimalKind::Panda,
        AnimalKind::Dragon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnimalKind::Cat => "Cat",
            AnimalKind::Dog => "Dog",
            AnimalKind::Fox => "Fox",
            AnimalKind::Rabbit => "Rabbit",
            AnimalKind::Panda => "Panda",
            AnimalKind::Dragon => "Dragon",
        }
    }

    /// The persona record for this animal.
    pub fn persona(&self) -> &'static Persona {
        match self {
            AnimalKind::Cat => &PERSONAS[0],
            AnimalKind::Dog => &PERSONAS[1],
            AnimalKind::Fox => &PERSONAS[2],
            AnimalKind::Rabbit => &PERSONAS[3],
            AnimalKind::Panda => &PERSONAS[4],
            AnimalKind::Dragon => &PERSONAS[5],
        }
    }
}

impl fmt::Display for AnimalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimalKind {
    type Err = CompanionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimalKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CompanionError::UnknownPersona(s.to_string()))
    }
}

/// An sRGB colour used when drawing a companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Colours a front-end paints the companion's badge with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylingTokens {
    pub fill: Rgb,
    pub border: Rgb,
}

/// Immutable description of one companion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub kind: AnimalKind,
    pub glyph: &'static str,
    pub styling: StylingTokens,
    /// Character brief handed to the remark generator.
    pub prompt: &'static str,
}

pub static PERSONAS: [Persona; 6] = [
    Persona {
        kind: AnimalKind::Cat,
        glyph: "🐱",
        styling: StylingTokens {
            fill: Rgb(0xff, 0xed, 0xd5),
            border: Rgb(0xfd, 0xba, 0x74),
        },
        prompt: "You are a lazy, slightly judgmental house cat following a laser pointer (the cursor). Be witty and succinct.",
    },
    Persona {
        kind: AnimalKind::Dog,
        glyph: "🐶",
        styling: StylingTokens {
            fill: Rgb(0xfe, 0xf3, 0xc7),
            border: Rgb(0xfc, 0xd3, 0x4d),
        },
        prompt: "You are an overly excited golden retriever puppy following your human. You are happy, energetic, and easily distracted.",
    },
    Persona {
        kind: AnimalKind::Fox,
        glyph: "🦊",
        styling: StylingTokens {
            fill: Rgb(0xfe, 0xd7, 0xaa),
            border: Rgb(0xfb, 0x92, 0x3c),
        },
        prompt: "You are a clever and mysterious fox. You speak in riddles or clever observations about the digital world.",
    },
    Persona {
        kind: AnimalKind::Rabbit,
        glyph: "🐰",
        styling: StylingTokens {
            fill: Rgb(0xfc, 0xe7, 0xf3),
            border: Rgb(0xf9, 0xa8, 0xd4),
        },
        prompt: "You are a nervous but fast bunny. You are constantly worried about being late or checking for carrots.",
    },
    Persona {
        kind: AnimalKind::Panda,
        glyph: "🐼",
        styling: StylingTokens {
            fill: Rgb(0xf1, 0xf5, 0xf9),
            border: Rgb(0x1e, 0x29, 0x3b),
        },
        prompt: "You are a very chill panda. You mostly think about bamboo and napping. You move slowly (mentally).",
    },
    Persona {
        kind: AnimalKind::Dragon,
        glyph: "🐲",
        styling: StylingTokens {
            fill: Rgb(0xd1, 0xfa, 0xe5),
            border: Rgb(0x10, 0xb9, 0x81),
        },
        prompt: "You are a mighty but tiny dragon. You believe you are fearsome, but you are just following a cursor.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_every_kind_maps_to_its_own_persona() {
        for kind in AnimalKind::ALL {
            assert_eq!(kind.persona().kind, kind);
            assert!(!kind.persona().prompt.is_empty());
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("panda".parse::<AnimalKind>().unwrap(), AnimalKind::Panda);
        assert_eq!(" DRAGON ".parse::<AnimalKind>().unwrap(), AnimalKind::Dragon);
    }

    #[test]
    fn test_parse_unknown_persona() {
        assert_matches!(
            "hamster".parse::<AnimalKind>(),
            Err(CompanionError::UnknownPersona(name)) if name == "hamster"
        );
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let yaml = serde_yaml::to_string(&AnimalKind::Rabbit).unwrap();
        assert_eq!(yaml.trim(), "rabbit");
    }
}
