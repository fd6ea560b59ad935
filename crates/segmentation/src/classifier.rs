//! Heuristic segment classifier — maps a customer name to an industry
//! segment by substring match against ordered keyword sets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Mineracao,
    ConstrucaoEngenharia,
    CimentoConcreto,
    Industria,
    Energia,
    MetalurgiaSiderurgia,
    Agronegocio,
    Quimica,
    TransporteLogistica,
    SetorPublico,
    Outros,
}

impl Segment {
    /// Display label, as shown on the dashboard and in exports.
    pub fn label(&self) -> &'static str {
        match self {
            Segment::Mineracao => "Mineração",
            Segment::ConstrucaoEngenharia => "Construção/Engenharia",
            Segment::CimentoConcreto => "Cimento/Concreto",
            Segment::Industria => "Indústria",
            Segment::Energia => "Energia",
            Segment::MetalurgiaSiderurgia => "Metalurgia/Siderurgia",
            Segment::Agronegocio => "Agronegócio",
            Segment::Quimica => "Química",
            Segment::TransporteLogistica => "Transporte/Logística",
            Segment::SetorPublico => "Setor Público",
            Segment::Outros => "Outros",
        }
    }
}

/// Keyword sets in match-priority order. The first set with any keyword
/// contained in the lowercased name wins, so the order is part of the
/// classification contract and must not be rearranged.
const KEYWORD_SETS: &[(Segment, &[&str])] = &[
    (Segment::Mineracao, &["miner", "mineração", "mineracao", "minera"]),
    (Segment::ConstrucaoEngenharia, &["constru", "obras", "engenharia"]),
    (Segment::CimentoConcreto, &["cimento", "concreto"]),
    (Segment::Industria, &["industria", "indústria", "fabrica", "fábrica"]),
    (Segment::Energia, &["energia", "eletric", "hidrel"]),
    (Segment::MetalurgiaSiderurgia, &["metal", "siderur", "aço", "aco"]),
    (Segment::Agronegocio, &["agricola", "agrícola", "agro"]),
    (Segment::Quimica, &["quimic", "química"]),
    (Segment::TransporteLogistica, &["transport", "logistic"]),
    (Segment::SetorPublico, &["prefeitura", "governo", "municipal"]),
];

/// Classify a customer name. Deterministic and idempotent; names that
/// match no keyword set fall into `Outros`.
pub fn classify(name: &str) -> Segment {
    let lower = name.to_lowercase();
    for (segment, keywords) in KEYWORD_SETS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *segment;
        }
    }
    Segment::Outros
}
