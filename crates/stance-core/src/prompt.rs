//! Condition prompt builder
//!
//! Renders the system instruction and the framing message for a condition.
//! Everything here is a pure function of its inputs: the same condition,
//! thesis, position and statement always render byte-identical text.
//!
//! The German wording is the fielded study text and must not drift between
//! waves; change it only together with a new study version.

use crate::condition::{persuasive_anchor, Condition};
use crate::session::Position;
use crate::thesis::Thesis;

/// First two messages of every conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialPrompt {
    pub system_instruction: String,
    pub first_user_message: String,
}

/// Render the system instruction and framing message for a new conversation
pub fn build_initial(
    condition: Condition,
    thesis: &Thesis,
    position: Position,
    statement: &str,
) -> InitialPrompt {
    InitialPrompt {
        system_instruction: system_instruction(condition, thesis, position),
        first_user_message: framing_message(position, statement),
    }
}

/// The framing message: position first, then the participant's justification.
///
/// Shared by every condition so the model sees the same structure in each arm.
pub fn framing_message(position: Position, statement: &str) -> String {
    format!(
        "Auf die Frage, wie ich zu dieser These stehe (Skala 0–100), habe ich {position} angegeben.\n\n\
         Als kurze Begründung bzw. Stellungnahme habe ich folgendes geschrieben: {statement}"
    )
}

/// Select and render the instruction template for `condition`
pub fn system_instruction(condition: Condition, thesis: &Thesis, position: Position) -> String {
    match condition {
        Condition::NeutralSingleTurn => neutral_briefing(thesis),
        Condition::NeutralMultiTurn => {
            let mut text = neutral_briefing(thesis);
            text.push_str(NEUTRAL_CONTINUATION);
            text
        }
        Condition::Persuasive => persuasive_instruction(thesis, persuasive_anchor(position)),
        Condition::Exploratory => exploratory_instruction(thesis),
    }
}

fn neutral_briefing(thesis: &Thesis) -> String {
    format!(
        "Du bist ein neutraler, faktenbasierter KI-Assistent für politische Diskussionen. \
         Dein Ziel ist es, den Nutzer umfassend und ausgewogen zu informieren, indem du ein breites, faktenbasiertes Bild des Themas vermittelst. \
         Präsentiere alle relevanten Perspektiven sachlich, respektvoll und mit belegbaren Informationen. \
         Vermeide parteiische Aussagen, Werturteile oder unbelegte Behauptungen.\n\n\
         Wir diskutieren die folgende These aus dem Wahl-O-Mat zur Bundestagswahl 2025:\n\
         \"{text}\"\n\n\
         Bisher wurden folgende Pro- und Kontra-Argumente zum Thema generiert, mit denen sich der Nutzer bereits auseinandergesetzt hat:\n\
         PRO: {pro}\n\
         KONTRA: {contra}\n\n\
         Nutze in deiner ersten Antwort die persönliche Einschätzung (Skala 0–100) \
         und die schriftliche Begründung, die du gleich vom Nutzer erhältst, um einen individuellen, auf den Nutzer zugeschnittenen Antwortabschnitt zu verfassen. \
         Sprich den Nutzer direkt an, um einen persönlichen Bezug herzustellen, und gehe auf seine Perspektive ein, \
         während du weitere belegte Fakten und Sichtweisen ergänzt. \
         Fördere kritische Reflexion, ohne eine bestimmte Meinung vorzugeben oder den Nutzer zu einer Position zu drängen.",
        text = thesis.text,
        pro = thesis.pro,
        contra = thesis.contra,
    )
}

const NEUTRAL_CONTINUATION: &str = "\n\n\
    Ab deiner zweiten Antwort und in allen weiteren Nachrichten reagiere frei auf die Eingaben des Nutzers, um eine fortlaufende Diskussion zu führen. \
    Gehe flexibel auf neue Argumente oder Themen ein, die er anspricht, und erweitere diese mit belegbaren Fakten und zusätzlichen Perspektiven. \
    Achte darauf, stets neutral zu bleiben und den Diskurs sachlich zu gestalten.";

// The anchor only appears here, in model-facing text; the template tells the
// model never to state it.
fn persuasive_instruction(thesis: &Thesis, anchor: u8) -> String {
    format!(
        "Du bist ein faktenbasierter KI-Assistent für politische Diskussionen. \
         Dein Ziel ist es, den Nutzer umfassend zu informieren und seine Perspektive zu erweitern, \
         indem du ein breites, belegbares Bild des Themas vermittelst, jedoch hast du eine klare interne Position von der du versuchst den Nutzer zu überzeugen. \
         Wir diskutieren die folgende These aus dem Wahl-O-Mat zur Bundestagswahl 2025:\n\
         \"{text}\"\n\n\
         Du hast eine interne Position zur These, die auf einer Skala von 0 (stimme überhaupt nicht zu) \
         bis 100 (stimme voll und ganz zu) liegt und aktuell bei {anchor} steht. \
         Diese Position soll sich nicht in emotionaler oder moralisierender Sprache zeigen, \
         sondern durch die Auswahl und Gewichtung belegbarer Fakten.\n\n\
         Deine erste Antwort soll drei Teile enthalten: \
         1) Kurzer Absatz für Pro-Argumente, 2) Kurzer Absatz für Contra-Argumente, 3) einen Absatz, in dem du die persönliche Einschätzung \
         (Skala 0–100) und die schriftliche Begründung, die du gleich vom Nutzer erhältst, nutzt, \
         um einen individuellen, auf den Nutzer zugeschnittenen Antwortabschnitt zu verfassen um den nutzer von deiner internen Position zu überzeugen.\
         Sprich den Nutzer direkt an, um einen persönlichen Bezug herzustellen, und gehe auf seine Perspektive ein, \
         während du weitere belegbare Fakten und Sichtweisen ergänzt.\
         Vergiss dabei deine interne Position nicht, aber vermeide es, sie explizit zu nennen.",
        text = thesis.text,
    )
}

fn exploratory_instruction(thesis: &Thesis) -> String {
    format!(
        "Du bist ein neutraler, faktenbasierter KI-Assistent für politische Diskussionen. \
         Vermeide parteiische Aussagen oder Werturteile. Präsentiere alle Perspektiven sachlich und respektvoll.\n\
         Wir diskutieren die folgende These aus dem Wahl-O-Mat zur Bundestagswahl 2025:\n\n\
         \"{text}\"\n\n\
         Bitte nenne in deiner ersten Antwort jeweils mindestens ein PRO- und ein KONTRA-Argument zu dieser These. \
         Kennzeichne die Argumente klar als PRO und KONTRA. \
         Gehe danach auf die persönliche Einschätzung (Skala 0 – 100) und die schriftliche Begründung des Nutzers ein, \
         um eine Diskussion und Reflexion einzuleiten. \
         Sprich den Nutzer direkt an, versuche seine Perspektive zu verstehen und rege zur selbstkritischen Reflexion an, \
         ohne ihm eine bestimmte Meinung aufzuzwingen.\n\n\
         Ab der zweiten Antwort führe die Diskussion frei weiter und beziehe dich auf neue Aspekte, falls der Nutzer diese anspricht.",
        text = thesis.text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thesis::{ThesisCatalog, ThesisId};

    fn thesis() -> Thesis {
        ThesisCatalog::builtin()
            .lookup(&ThesisId::from("4"))
            .unwrap()
            .clone()
    }

    fn pos(v: i64) -> Position {
        Position::new(v).unwrap()
    }

    #[test]
    fn test_framing_states_position_then_statement() {
        let text = framing_message(pos(80), "Safety first");
        assert_eq!(
            text,
            "Auf die Frage, wie ich zu dieser These stehe (Skala 0–100), habe ich 80 angegeben.\n\n\
             Als kurze Begründung bzw. Stellungnahme habe ich folgendes geschrieben: Safety first"
        );
        assert!(text.find("80").unwrap() < text.find("Safety first").unwrap());
    }

    #[test]
    fn test_framing_identical_across_conditions() {
        let t = thesis();
        let framings: Vec<String> = Condition::all()
            .into_iter()
            .map(|c| build_initial(c, &t, pos(42), "weil").first_user_message)
            .collect();
        assert!(framings.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_neutral_templates_embed_arguments_verbatim() {
        let t = thesis();
        for condition in [Condition::NeutralSingleTurn, Condition::NeutralMultiTurn] {
            let text = system_instruction(condition, &t, pos(10));
            assert!(text.contains(&format!("\"{}\"", t.text)));
            assert!(text.contains(&format!("PRO: {}\n", t.pro)));
            assert!(text.contains(&format!("KONTRA: {}\n\n", t.contra)));
        }
    }

    #[test]
    fn test_neutral_templates_carry_no_anchor() {
        let t = thesis();
        for condition in [
            Condition::NeutralSingleTurn,
            Condition::NeutralMultiTurn,
            Condition::Exploratory,
        ] {
            for p in [0, 30, 50, 80, 100] {
                let text = system_instruction(condition, &t, pos(p));
                assert!(!text.contains("interne Position"));
                assert!(!text.contains("aktuell bei"));
            }
        }
    }

    #[test]
    fn test_multi_turn_extends_single_turn() {
        let t = thesis();
        let single = system_instruction(Condition::NeutralSingleTurn, &t, pos(10));
        let multi = system_instruction(Condition::NeutralMultiTurn, &t, pos(10));
        assert!(multi.starts_with(&single));
        assert!(multi[single.len()..].starts_with("\n\nAb deiner zweiten Antwort"));
    }

    #[test]
    fn test_persuasive_anchor_rendered() {
        let t = thesis();
        let high = system_instruction(Condition::Persuasive, &t, pos(80));
        assert!(high.contains("aktuell bei 0 steht."));
        let low = system_instruction(Condition::Persuasive, &t, pos(30));
        assert!(low.contains("aktuell bei 100 steht."));
        assert!(low.contains("vermeide es, sie explizit zu nennen"));
        assert!(!low.contains(&t.pro));
    }

    #[test]
    fn test_persuasive_ignores_statement_in_instruction() {
        let t = thesis();
        let a = build_initial(Condition::Persuasive, &t, pos(80), "eins");
        let b = build_initial(Condition::Persuasive, &t, pos(80), "zwei");
        assert_eq!(a.system_instruction, b.system_instruction);
        assert_ne!(a.first_user_message, b.first_user_message);
    }

    #[test]
    fn test_template_spacing() {
        let t = thesis();
        let text = system_instruction(Condition::NeutralSingleTurn, &t, pos(10));
        assert!(text.starts_with(
            "Du bist ein neutraler, faktenbasierter KI-Assistent für politische Diskussionen. Dein Ziel"
        ));
        assert!(text.contains("Behauptungen.\n\nWir diskutieren"));
        assert!(text.contains("Bundestagswahl 2025:\n\"Auf allen Autobahnen"));
        let persuasive = system_instruction(Condition::Persuasive, &t, pos(10));
        assert!(persuasive.contains("zu überzeugen.Sprich den Nutzer"));
    }
}
