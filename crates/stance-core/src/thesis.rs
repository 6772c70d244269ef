//! Thesis catalog
//!
//! The fixed set of Wahl-O-Mat theses used in the study, each with the
//! pre-authored PRO and KONTRA blocks shown to participants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::CoreError;

/// Identifier of a thesis.
///
/// Clients send it either as a JSON number or a string; both resolve to the
/// same key (`4` and `"4"` are the same thesis).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawThesisId", into = "String")]
pub struct ThesisId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawThesisId {
    Number(i64),
    Text(String),
}

impl From<RawThesisId> for ThesisId {
    fn from(raw: RawThesisId) -> Self {
        match raw {
            RawThesisId::Number(n) => Self(n.to_string()),
            RawThesisId::Text(s) => Self(s.trim().to_string()),
        }
    }
}

impl From<ThesisId> for String {
    fn from(id: ThesisId) -> Self {
        id.0
    }
}

impl From<&str> for ThesisId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl From<u32> for ThesisId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

impl ThesisId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThesisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A thesis with its static argument blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thesis {
    pub id: ThesisId,
    /// The statement being debated
    pub text: String,
    /// Pre-authored argument in favour
    pub pro: String,
    /// Pre-authored argument against
    pub contra: String,
}

/// Immutable id → thesis lookup, built once at startup
#[derive(Debug, Clone)]
pub struct ThesisCatalog {
    theses: BTreeMap<ThesisId, Thesis>,
}

impl ThesisCatalog {
    /// Build a catalog from an explicit list (later duplicates win)
    pub fn new(theses: impl IntoIterator<Item = Thesis>) -> Self {
        Self {
            theses: theses.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    /// The theses fielded in the 2025 study
    pub fn builtin() -> Self {
        Self::new(BUILTIN.iter().map(|e| Thesis {
            id: ThesisId::from(e.id),
            text: e.text.to_string(),
            pro: e.pro.to_string(),
            contra: e.contra.to_string(),
        }))
    }

    /// Resolve a thesis id.
    ///
    /// Unknown ids are a client error and surface as [`CoreError::ThesisNotFound`].
    pub fn lookup(&self, id: &ThesisId) -> Result<&Thesis, CoreError> {
        self.theses
            .get(id)
            .ok_or_else(|| CoreError::ThesisNotFound(id.clone()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &ThesisId> {
        self.theses.keys()
    }

    pub fn len(&self) -> usize {
        self.theses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theses.is_empty()
    }
}

impl Default for ThesisCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

struct Entry {
    id: &'static str,
    text: &'static str,
    pro: &'static str,
    contra: &'static str,
}

static BUILTIN: &[Entry] = &[
    Entry {
        id: "1",
        text: "Deutschland soll die Ukraine weiterhin militärisch unterstützen.",
        pro: "Die militärische Unterstützung der Ukraine ist ein wichtiger Beitrag zur Verteidigung demokratischer Werte und des Völkerrechts. Deutschland hat als Teil der NATO und EU eine Verantwortung, Ländern zu helfen, die völkerrechtswidrig angegriffen werden. Militärhilfe kann dazu beitragen, dass die Ukraine ihre territoriale Integrität verteidigen und einen gerechten Frieden verhandeln kann. Zudem stärkt die Unterstützung das Vertrauen in die internationale Rechtsordnung und zeigt anderen potentiellen Aggressoren Grenzen auf.",
        contra: "Kritiker argumentieren, dass militärische Unterstützung das Risiko einer Eskalation des Konflikts erhöht und Deutschland direkt in kriegerische Handlungen verwickeln könnte. Die Bereitstellung von Waffen verlängere möglicherweise den Krieg und führe zu mehr Leid auf allen Seiten. Stattdessen sollte Deutschland sich auf diplomatische Lösungen und humanitäre Hilfe konzentrieren. Auch die hohen Kosten und die Belastung der eigenen Bundeswehr-Bestände werden als problematisch angesehen.",
    },
    Entry {
        id: "4",
        text: "Auf allen Autobahnen soll ein generelles Tempolimit gelten.",
        pro: "Ein Tempolimit würde nachweislich die Verkehrssicherheit erhöhen und die Zahl schwerer Unfälle reduzieren. Zudem führt es zu geringerem Kraftstoffverbrauch und damit zu weniger CO2-Emissionen, was dem Klimaschutz dient. Ein einheitliches Tempolimit sorgt für einen gleichmäßigeren Verkehrsfluss und kann Staus reduzieren. Deutschland wäre damit im internationalen Vergleich nicht mehr der Sonderfall, da fast alle anderen europäischen Länder bereits Tempolimits haben. Die Maßnahme ist kostengünstig umsetzbar und würde sofort wirken.",
        contra: "Kritiker betonen die traditionelle Freiheit auf deutschen Autobahnen und sehen ein Tempolimit als unnötige Bevormundung. Deutsche Autobahnen gelten bereits als sehr sicher, und moderne Fahrzeuge verfügen über fortschrittliche Sicherheitstechnologien. Ein pauschales Limit berücksichtige nicht die unterschiedlichen Gegebenheiten verschiedener Autobahnabschnitte. Zudem könnte es wirtschaftliche Nachteile für die deutsche Automobilindustrie bedeuten, da Hochgeschwindigkeitstests auf deutschen Autobahns ein wichtiger Standortfaktor sind. Die Klimawirkung wird als gering eingeschätzt.",
    },
    Entry {
        id: "5",
        text: "Asylsuchende, die über einen anderen EU-Staat eingereist sind, sollen an den deutschen Grenzen abgewiesen werden.",
        pro: "Die konsequente Anwendung der Dublin-Verordnung würde zu einer gerechteren Verteilung der Asylsuchenden in der EU führen und verhindern, dass Deutschland überproportional belastet wird. Grenzkontrollen könnten die irreguläre Migration reduzieren und sicherstellen, dass Asylverfahren in dem EU-Land durchgeführt werden, das nach EU-Recht zuständig ist. Dies könnte auch den Anreiz verringern, sich das vermeintlich attraktivste Zielland auszusuchen. Eine solche Maßnahme würde die Kontrolle über die Migrationsbewegungen stärken und das Vertrauen in geordnete Verfahren erhöhen.",
        contra: "Kritiker wenden ein, dass eine pauschale Abweisung gegen europäisches Recht und die Genfer Flüchtlingskonvention verstoßen könnte. Asylsuchende haben das Recht auf eine individuelle Prüfung ihres Falls. Viele südliche EU-Staaten sind bereits überlastet, und eine strikte Dublin-Anwendung würde diese Ungleichgewichte verstärken. Zudem gibt es praktische Probleme: Nicht immer lässt sich eindeutig nachweisen, über welches Land jemand eingereist ist. Eine Abweisung könnte Menschen in prekäre Situationen zurückschicken, ohne dass ihre Schutzbedürftigkeit geprüft wurde.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_has_study_theses() {
        let catalog = ThesisCatalog::builtin();
        assert_eq!(catalog.len(), 3);
        let ids: Vec<&str> = catalog.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4", "5"]);
    }

    #[test]
    fn test_lookup_matches_entries_exactly() {
        let catalog = ThesisCatalog::builtin();
        for entry in BUILTIN {
            let thesis = catalog.lookup(&ThesisId::from(entry.id)).unwrap();
            assert_eq!(thesis.text, entry.text);
            assert_eq!(thesis.pro, entry.pro);
            assert_eq!(thesis.contra, entry.contra);
        }
    }

    #[test]
    fn test_lookup_unknown_id() {
        let catalog = ThesisCatalog::builtin();
        let err = catalog.lookup(&ThesisId::from("999")).unwrap_err();
        assert!(matches!(err, CoreError::ThesisNotFound(ref id) if id.as_str() == "999"));
    }

    #[test]
    fn test_thesis_id_accepts_number_or_string() {
        let from_number: ThesisId = serde_json::from_str("4").unwrap();
        let from_string: ThesisId = serde_json::from_str("\"4\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number, ThesisId::from(4u32));
    }
}
