//! # Relatório de Entidades
//!
//! Renderização textual de um documento processado: o texto de entrada, a forma
//! tokenizada (com entidades unidas por `_`) e uma linha por entidade.

use serde::{Deserialize, Serialize};

use crate::document::{Document, Entity};

/// Entidades em ordem de documento. Empates mantêm a ordem de inserção.
fn entities_in_order(document: &Document) -> Vec<&Entity> {
    let mut entities: Vec<&Entity> = document.entities.iter().collect();
    entities.sort_by_key(|e| (e.start_token, e.end_token));
    entities
}

/// Formata as entidades do documento no layout de relatório, em ordem de texto.
pub fn format_entities(document: &Document) -> String {
    let lines: Vec<String> = entities_in_order(document)
        .into_iter()
        .map(|e| format!("\t{} [{}]", e.text, e.entity_type))
        .collect();

    format!(
        "Input:\n\t'{}'\n\nTokenized Value:\n\t'{}'\n\nEntities: \n{}",
        document.raw_text,
        document.tokenized_value(true),
        lines.join("\n")
    )
}

/// Versão estruturada do relatório (usada pela API HTTP).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReport {
    pub input: String,
    pub tokenized_value: String,
    pub entities: Vec<(String, String)>,
    pub formatted: String,
}

impl EntityReport {
    pub fn from_document(document: &Document) -> Self {
        Self {
            input: document.raw_text.clone(),
            tokenized_value: document.tokenized_value(true),
            entities: entities_in_order(document)
                .into_iter()
                .map(|e| (e.text.clone(), e.entity_type.clone()))
                .collect(),
            formatted: format_entities(document),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_support::tagged_document;
    use crate::document::PartOfSpeech::*;
    use crate::document::Entity;
    use crate::language::Language;
    use crate::pipeline::Pipeline;
    use crate::spotter::Spotter;

    #[test]
    fn test_report_layout() {
        let mut doc = tagged_document(&[("Amazon", Propn), ("is", Verb), ("a", Det), ("company", Noun)]);
        doc.add_entity(Entity {
            text: "a company".into(),
            entity_type: "IsA".into(),
            start_token: 2,
            end_token: 3,
            span_index: 0,
            source: "is-a-pattern".into(),
        })
        .unwrap();

        let expected = "Input:\n\t'Amazon is a company'\n\nTokenized Value:\n\t'Amazon is a_company'\n\nEntities: \n\ta company [IsA]";
        assert_eq!(format_entities(&doc), expected);

        let report = EntityReport::from_document(&doc);
        assert_eq!(report.entities, vec![("a company".to_string(), "IsA".to_string())]);
    }

    #[test]
    fn test_report_without_entities() {
        let doc = tagged_document(&[("hello", Intj)]);
        assert!(format_entities(&doc).ends_with("Entities: \n"));
    }

    #[test]
    fn test_entities_follow_text_order() {
        let mut spotter = Spotter::new(Language::English, "langs", "ProgrammingLanguage");
        spotter.add_entry("Python").unwrap();
        spotter.add_entry("Rust").unwrap();
        let pipeline = Pipeline::build(Language::English).with(Box::new(spotter)).unwrap();
        let doc = pipeline.process_text("Rust and Python").unwrap();

        assert!(format_entities(&doc)
            .ends_with("Entities: \n\tRust [ProgrammingLanguage]\n\tPython [ProgrammingLanguage]"));
        let report = EntityReport::from_document(&doc);
        let names: Vec<&str> = report.entities.iter().map(|(text, _)| text.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Python"]);
    }
}
