//! Keyword-based category classifier for statement descriptions

use serde::Serialize;

use crate::utils::fold_text;

pub const FALLBACK_CATEGORY: &str = "Outro";
pub const UNCLASSIFIED_CATEGORY: &str = "Não classificado";

const HIT_CONFIDENCE: u8 = 70;
const MISS_CONFIDENCE: u8 = 30;

/// Category guess with a 0..=100 confidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: String,
    pub confidence: u8,
}

impl Classification {
    pub fn new(category: impl Into<String>, confidence: u8) -> Self {
        Self {
            category: category.into(),
            confidence: confidence.min(100),
        }
    }
}

/// Ordered keyword table. Earlier rules win, so specific merchants
/// ("amazon prime") come before generic words ("loja"). Keywords are folded
/// (lowercase, no accents) and matched against the description padded with
/// spaces, so a leading or trailing space in a keyword marks a word boundary.
const RULES: &[(&str, &[&str])] = &[
    (
        "Assinaturas",
        &[
            "netflix", "spotify", "amazon prime", "prime video", "disney", "hbo", "youtube premium",
            "deezer", "icloud", "google one", "assinatura", "globoplay",
        ],
    ),
    (
        "Restaurante",
        &[
            "restaurante", " bar ", "lanchonete", "pizzaria", "burger", "churrascaria", "mcdonald",
            "outback", "sushi", "ifood",
        ],
    ),
    (
        "Alimentação",
        &[
            "mercado", "padaria", "acougue", "hortifruti", "feira", "atacad", "carrefour", "assai",
            "pao de acucar", "cafe",
        ],
    ),
    (
        "Transporte",
        &[
            "uber", " 99 ", "99pop", "99app", "cabify", "posto", "combustivel", "gasolina", "etanol",
            "estacionamento", "pedagio", "metro", "onibus", "bilhete unico", "sem parar",
        ],
    ),
    (
        "Moradia",
        &[
            "aluguel", "condominio", "energia", " luz ", "enel", "cemig", "sabesp", "agua", " gas ",
            "comgas", "iptu", "internet", "vivo fibra", "claro net",
        ],
    ),
    (
        "Academia/Esportes",
        &["academia", "smart fit", "smartfit", "gympass", "wellhub", "crossfit", "esporte"],
    ),
    (
        "Saúde/Beleza",
        &[
            "farmacia", "drogaria", "droga raia", "drogasil", "hospital", "clinica", "medic",
            "dentista", "laboratorio", "salao", "barbearia", "unimed",
        ],
    ),
    (
        "Educação",
        &["escola", "faculdade", "universidade", "curso", "udemy", "alura", "livraria", "mensalidade"],
    ),
    (
        "Setup/Equipamentos",
        &["kabum", "pichau", "terabyte", "informatica", "notebook", "computador", "eletronic"],
    ),
    ("Investimentos", &["investimento", "aplicacao", "tesouro", "cdb", "corretora", "b3 "]),
    ("Seguros", &["seguro", "seguradora"]),
    (
        "Viagens",
        &["hotel", "airbnb", "booking", "passagem", "latam", " gol ", " azul ", "decolar", "hostel"],
    ),
    ("Pets", &[" pet", "petz", "cobasi", "veterinari", "racao"]),
    (
        "Diversão",
        &["cinema", "ingresso", "sympla", "show", "steam", "playstation", "xbox", "nintendo", "parque"],
    ),
    (
        "Roupas/Acessórios",
        &["renner", "riachuelo", "c&a", "zara", "shein", "roupa", "calcado", "centauro", "loja"],
    ),
];

/// Maps descriptions to the default categories by keyword
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, description: &str) -> Classification {
        let padded = format!(" {} ", fold_text(description));
        for (category, keywords) in RULES {
            if keywords.iter().any(|k| padded.contains(k)) {
                return Classification::new(*category, HIT_CONFIDENCE);
            }
        }
        Classification::new(FALLBACK_CATEGORY, MISS_CONFIDENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_merchants() {
        let c = KeywordClassifier::new();
        assert_eq!(c.classify("UBER *TRIP 1234").category, "Transporte");
        assert_eq!(c.classify("Padaria Pão Quente").category, "Alimentação");
        assert_eq!(c.classify("NETFLIX.COM").category, "Assinaturas");
        assert_eq!(c.classify("Drogaria São Paulo").category, "Saúde/Beleza");
        assert_eq!(c.classify("PAGTO ALUGUEL").category, "Moradia");
        assert_eq!(c.classify("Posto Shell - gasolina").category, "Transporte");
        assert_eq!(c.classify("PETZ LOJA 12").category, "Pets");
    }

    #[test]
    fn test_hit_and_miss_confidence() {
        let c = KeywordClassifier::new();
        let hit = c.classify("Smart Fit mensal");
        assert_eq!(hit, Classification::new("Academia/Esportes", 70));

        let miss = c.classify("TED 000123");
        assert_eq!(miss.category, FALLBACK_CATEGORY);
        assert_eq!(miss.confidence, 30);
    }

    #[test]
    fn test_word_boundaries() {
        let c = KeywordClassifier::new();
        // "bar" inside "barbearia" is not a bar
        assert_eq!(c.classify("Barbearia do Zé").category, "Saúde/Beleza");
        assert_eq!(c.classify("Bar do Zé").category, "Restaurante");
    }
}
