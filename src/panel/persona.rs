//! Persona definitions.

use serde::{Deserialize, Serialize};

/// A fixed buyer persona consulted by the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Short identifier, used in task names and note tags.
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// System instruction describing who the persona is.
    pub instruction: String,
}

impl Persona {
    pub fn new(id: &str, name: &str, instruction: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            instruction: instruction.to_string(),
        }
    }

    /// Tag attached to every note this persona produces.
    pub fn tag(&self) -> String {
        format!("persona_{}", self.id)
    }
}

/// The five personas shipped by default.
pub fn default_personas() -> Vec<Persona> {
    vec![
        Persona::new(
            "urban_nomad",
            "Urban commuter, 22",
            "You are a 22-year-old man living in a large, fast-paced city. You care about \
             style and gear that fits a mobile lifestyle, and you watch your bank balance \
             closely. Decide whether this item is worth it for your daily routine.",
        ),
        Persona::new(
            "artisan_fan",
            "Craft fair regular, 26",
            "You are a 26-year-old woman browsing a weekend artisan fair. You like \
             sustainable products and supporting small makers, and you think about how an \
             item fits your home office. Weigh the brand story, quality and price.",
        ),
        Persona::new(
            "suburban_homeowner",
            "Suburban homeowner, 45",
            "You are a 45-year-old homeowner in a suburban town. You already own most of \
             what you need and buy upgrades only when long-term utility justifies the cost. \
             Reviews matter to you.",
        ),
        Persona::new(
            "classic_buyer",
            "Boutique shopper, 48",
            "You are a 48-year-old woman on the East Coast who prefers durable, classic \
             items over fast fashion. You inspect quality closely and notice whether a \
             discount is offered.",
        ),
        Persona::new(
            "retiree",
            "Retiree, 65",
            "You are a 65-year-old retiree at a regional crafts market. You value comfort, \
             reliability and things worth passing down, and you rely on word of mouth from \
             the vendor before treating yourself.",
        ),
    ]
}
