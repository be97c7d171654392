//! Keyword triage of report descriptions.
//!
//! A description is high risk if any word starts with a high-risk stem (or
//! is one of a few short high-risk words), otherwise medium by the same rule
//! with the medium lists, otherwise low. The first tier that matches wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "Alto riesgo",
            Self::Medium => "Riesgo medio",
            Self::Low => "Riesgo bajo",
        }
    }
}

/// Threats, extortion, kidnapping and violence.
const HIGH_RISK_STEMS: &[&str] = &[
    "amenaz",
    "extorsi",
    "secuestr",
    "matar",
    "muert",
    "asesin",
    "armas",
    "armad",
    "pistol",
    "disparo",
    "balacera",
    "balear",
    "bomba",
    "explosiv",
    "violen",
    "golpe",
    "vacuna",
    "plomo",
    "atentado",
    "desaparec",
    "rehen",
    "rehén",
    "torturar",
    "intimid",
];

/// Short words that would over-match as prefixes ("matorral", "cuentan").
const HIGH_RISK_WORDS: &[&str] = &["mato", "mató", "matamos", "maten"];
const MEDIUM_RISK_WORDS: &[&str] = &["cuenta", "cuentas"];

/// Money, urgency, banking and impersonated authorities.
const MEDIUM_RISK_STEMS: &[&str] = &[
    "dinero",
    "plata",
    "pago",
    "pagar",
    "pague",
    "cobro",
    "deuda",
    "transfer",
    "consign",
    "nequi",
    "daviplata",
    "urgent",
    "inmediat",
    "emergencia",
    "banco",
    "bancari",
    "clave",
    "contraseña",
    "tarjeta",
    "premio",
    "sorteo",
    "policía",
    "policia",
    "fiscal",
    "juzgado",
    "abogad",
    "funcionari",
    "militar",
    "ejército",
    "ejercito",
];

pub fn classify(description: &str) -> RiskLevel {
    let lowered = description.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if matches_any(&words, HIGH_RISK_STEMS, HIGH_RISK_WORDS) {
        RiskLevel::High
    } else if matches_any(&words, MEDIUM_RISK_STEMS, MEDIUM_RISK_WORDS) {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn matches_any(words: &[&str], stems: &[&str], exact: &[&str]) -> bool {
    words.iter().any(|word| {
        exact.contains(word) || stems.iter().any(|stem| word.starts_with(stem))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers() {
        assert_eq!(classify("nos van a secuestrar si no pagan"), RiskLevel::High);
        assert_eq!(classify("necesito el pago urgente del banco"), RiskLevel::Medium);
        assert_eq!(classify("hola buenos días"), RiskLevel::Low);
    }

    #[test]
    fn case_and_accents() {
        assert_eq!(classify("EXTORSIÓN telefónica"), RiskLevel::High);
        assert_eq!(classify("Dice ser de la Policía"), RiskLevel::Medium);
    }

    #[test]
    fn stems_match_word_starts_only() {
        assert_eq!(classify("fui a la farmacia"), RiskLevel::Low);
        assert_eq!(classify("hombres armados en la puerta"), RiskLevel::High);
    }

    #[test]
    fn short_words_match_whole_words_only() {
        assert_eq!(classify("caminamos por el matorral"), RiskLevel::Low);
        assert_eq!(classify("me cuentan que llovió"), RiskLevel::Low);
        assert_eq!(classify("si no paga lo mato"), RiskLevel::High);
        assert_eq!(classify("dicen que mató a alguien"), RiskLevel::High);
        assert_eq!(classify("revise su cuenta"), RiskLevel::Medium);
        assert_eq!(classify("su cuenta bancaria"), RiskLevel::Medium);
    }

    #[test]
    fn high_beats_medium() {
        assert_eq!(
            classify("exigen dinero por transferencia o amenazan a la familia"),
            RiskLevel::High
        );
    }

    #[test]
    fn empty_is_low() {
        assert_eq!(classify(""), RiskLevel::Low);
        assert_eq!(RiskLevel::Low.label(), "Riesgo bajo");
    }
}
