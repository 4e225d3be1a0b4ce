// School Record - one entry of the essay ranking dataset
//
// The JSON shape is fixed by the published dataset (escolas.json), so the
// serde names follow the file and the Rust names follow what the fields mean.

use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORY
// ============================================================================

/// Administrative category of a school. Exactly one of two variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Publica")]
    Public,

    #[serde(rename = "Privada")]
    Private,
}

impl Category {
    /// The literal used in the dataset
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Public => "Publica",
            Category::Private => "Privada",
        }
    }

    /// Plural label used by the analysis views
    pub fn label(&self) -> &'static str {
        match self {
            Category::Public => "Escolas Públicas",
            Category::Private => "Escolas Privadas",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// COMPETENCY
// ============================================================================

/// One of the five officially scored writing dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Competency {
    C1,
    C2,
    C3,
    C4,
    C5,
}

impl Competency {
    pub const ALL: [Competency; 5] = [
        Competency::C1,
        Competency::C2,
        Competency::C3,
        Competency::C4,
        Competency::C5,
    ];

    pub fn index(&self) -> usize {
        match self {
            Competency::C1 => 0,
            Competency::C2 => 1,
            Competency::C3 => 2,
            Competency::C4 => 3,
            Competency::C5 => 4,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Competency::C1 => "C1",
            Competency::C2 => "C2",
            Competency::C3 => "C3",
            Competency::C4 => "C4",
            Competency::C5 => "C5",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Competency::C1 => "Domínio da Norma",
            Competency::C2 => "Compreensão do Tema",
            Competency::C3 => "Argumentação",
            Competency::C4 => "Coesão",
            Competency::C5 => "Proposta de Intervenção",
        }
    }
}

// ============================================================================
// SCHOOL
// ============================================================================

/// Prior-year snapshot of the six score fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "ano")]
    pub year: i32,

    #[serde(rename = "media_geral")]
    pub overall: f64,

    #[serde(rename = "comp1")]
    pub comp1: f64,

    #[serde(rename = "comp2")]
    pub comp2: f64,

    #[serde(rename = "comp3")]
    pub comp3: f64,

    #[serde(rename = "comp4")]
    pub comp4: f64,

    #[serde(rename = "comp5")]
    pub comp5: f64,
}

impl HistoryEntry {
    pub fn competencies(&self) -> [f64; 5] {
        [self.comp1, self.comp2, self.comp3, self.comp4, self.comp5]
    }
}

/// One school's exam-essay performance entry.
///
/// Records are read-only after load. `rank` comes pre-computed from the
/// dataset (1 = best overall score) and is never recomputed here. Missing
/// text and score fields load as empty / zero; only the category is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "nome", default)]
    pub name: String,

    #[serde(rename = "uf", default)]
    pub state: String,

    #[serde(rename = "cidade", default)]
    pub city: String,

    #[serde(rename = "dependencia")]
    pub category: Category,

    /// Number of essays submitted by the school
    #[serde(rename = "qtd_redacoes", default)]
    pub sample_size: u32,

    #[serde(rename = "media_geral", default)]
    pub overall: f64,

    #[serde(default)]
    pub comp1: f64,
    #[serde(default)]
    pub comp2: f64,
    #[serde(default)]
    pub comp3: f64,
    #[serde(default)]
    pub comp4: f64,
    #[serde(default)]
    pub comp5: f64,

    #[serde(rename = "ranking", default)]
    pub rank: u32,

    /// Socioeconomic index, missing for part of the dataset
    #[serde(rename = "nse", default, skip_serializing_if = "Option::is_none")]
    pub socioeconomic: Option<f64>,

    #[serde(rename = "historico", default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
}

impl School {
    /// Sub-scores in C1..C5 order
    pub fn competencies(&self) -> [f64; 5] {
        [self.comp1, self.comp2, self.comp3, self.comp4, self.comp5]
    }

    pub fn competency(&self, competency: Competency) -> f64 {
        self.competencies()[competency.index()]
    }

    pub fn is_public(&self) -> bool {
        self.category == Category::Public
    }

    /// "City - UF" line shown under the school name
    pub fn location(&self) -> String {
        format!("{} - {}", self.city, self.state)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Helper to build a school with only the fields a test cares about
    pub(crate) fn create_test_school(
        id: &str,
        name: &str,
        state: &str,
        city: &str,
        category: Category,
        sample_size: u32,
        overall: f64,
    ) -> School {
        School {
            id: id.to_string(),
            name: name.to_string(),
            state: state.to_string(),
            city: city.to_string(),
            category,
            sample_size,
            overall,
            comp1: overall / 5.0,
            comp2: overall / 5.0,
            comp3: overall / 5.0,
            comp4: overall / 5.0,
            comp5: overall / 5.0,
            rank: 1,
            socioeconomic: None,
            history: None,
        }
    }

    #[test]
    fn test_deserialize_dataset_record() {
        let json = r#"{
            "id": "35012345",
            "nome": "Colégio Exemplo",
            "uf": "SP",
            "cidade": "São Paulo",
            "dependencia": "Privada",
            "qtd_redacoes": 120,
            "media_geral": 812.4,
            "comp1": 170.0,
            "comp2": 168.2,
            "comp3": 160.1,
            "comp4": 172.5,
            "comp5": 141.6,
            "ranking": 3,
            "nse": 6.2,
            "historico": [
                {"ano": 2023, "media_geral": 790.0, "comp1": 160.0, "comp2": 160.0,
                 "comp3": 150.0, "comp4": 170.0, "comp5": 150.0}
            ]
        }"#;

        let school: School = serde_json::from_str(json).unwrap();

        assert_eq!(school.name, "Colégio Exemplo");
        assert_eq!(school.category, Category::Private);
        assert_eq!(school.sample_size, 120);
        assert_eq!(school.rank, 3);
        assert_eq!(school.socioeconomic, Some(6.2));
        assert_eq!(school.history.as_ref().map(|h| h.len()), Some(1));
        assert_eq!(school.competency(Competency::C4), 172.5);
        assert_eq!(school.location(), "São Paulo - SP");
    }

    #[test]
    fn test_optional_fields_absent() {
        let json = r#"{
            "id": "1", "nome": "Escola Estadual A", "uf": "MG", "cidade": "Belo Horizonte",
            "dependencia": "Publica", "qtd_redacoes": 0, "media_geral": 600.0,
            "comp1": 120.0, "comp2": 120.0, "comp3": 120.0, "comp4": 120.0, "comp5": 120.0,
            "ranking": 900
        }"#;

        let school: School = serde_json::from_str(json).unwrap();

        assert!(school.is_public());
        assert!(school.socioeconomic.is_none());
        assert!(school.history.is_none());

        // Absent optionals are not written back out
        let out = serde_json::to_string(&school).unwrap();
        assert!(!out.contains("nse"));
        assert!(!out.contains("historico"));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let json = r#"{
            "id": "1", "nome": "X", "uf": "MG", "cidade": "Y",
            "dependencia": "Federal", "qtd_redacoes": 10, "media_geral": 600.0,
            "comp1": 0.0, "comp2": 0.0, "comp3": 0.0, "comp4": 0.0, "comp5": 0.0,
            "ranking": 1
        }"#;

        assert!(serde_json::from_str::<School>(json).is_err());
    }

    #[test]
    fn test_competency_labels() {
        assert_eq!(Competency::ALL.len(), 5);
        assert_eq!(Competency::C2.label(), "Compreensão do Tema");
        assert_eq!(Competency::C5.code(), "C5");
        assert_eq!(Category::Public.to_string(), "Publica");
    }

    #[test]
    fn test_missing_scores_default_to_zero() {
        let json =
            r#"{"id": "7", "nome": "Escola Incompleta", "dependencia": "Publica", "comp1": 150.0}"#;

        let school: School = serde_json::from_str(json).unwrap();

        assert_eq!(school.comp1, 150.0);
        assert_eq!(school.comp3, 0.0);
        assert_eq!(school.overall, 0.0);
        assert_eq!(school.sample_size, 0);
        assert!(school.city.is_empty());
    }
}
