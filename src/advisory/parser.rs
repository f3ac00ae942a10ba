//! Advisory response parser
//!
//! Model output is untrusted and loosely structured. Decoding tries, in order:
//!
//! ```text
//! 1. empty text          → placeholder advice (blocked vs. no content)
//! 2. JSON (fenced/bare)  → localized or generic keys, per-field coercion
//! 3. labeled sections    → CONSEJOS: / RECOMENDACIONES: / PRECAUCIONES:
//! 4. anything else       → whole text as advice
//! ```
//!
//! The first branch that recovers any field wins. Parsing never fails; the
//! result may still be empty, which the orchestrator deals with.

use crate::generation::GenerationResponse;
use crate::types::AdvisoryResult;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Advice shown when the safety filter blocked the reply
pub const BLOCKED_MESSAGE: &str =
    "La respuesta de la IA fue bloqueada por las políticas de seguridad. Revisa los datos ingresados.";

/// Advice shown when the reply carried no text
pub const EMPTY_MESSAGE: &str = "La IA no proporcionó contenido. Intenta nuevamente en unos instantes.";

/// Finish reason reported for safety-filtered replies
const SAFETY_FINISH_REASON: &str = "SAFETY";

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)```").expect("fence pattern"));

static SECTION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(CONSEJOS|RECOMENDACIONES|PRECAUCIONES):").expect("section label pattern")
});

static BULLET_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:-|•|\d+\.)\s*").expect("bullet pattern"));

/// Parsed advisory, tagged with the branch that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAdvisory {
    /// No text; advice holds a placeholder message
    Empty(AdvisoryResult),

    /// Decoded from a JSON object
    Structured(AdvisoryResult),

    /// Decoded from labeled sections
    Sections(AdvisoryResult),

    /// Raw text used as advice
    Unstructured(AdvisoryResult),
}

impl ParsedAdvisory {
    pub fn result(&self) -> &AdvisoryResult {
        match self {
            ParsedAdvisory::Empty(r)
            | ParsedAdvisory::Structured(r)
            | ParsedAdvisory::Sections(r)
            | ParsedAdvisory::Unstructured(r) => r,
        }
    }

    pub fn into_result(self) -> AdvisoryResult {
        match self {
            ParsedAdvisory::Empty(r)
            | ParsedAdvisory::Structured(r)
            | ParsedAdvisory::Sections(r)
            | ParsedAdvisory::Unstructured(r) => r,
        }
    }

    /// Short name of the decoding branch, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ParsedAdvisory::Empty(_) => "empty",
            ParsedAdvisory::Structured(_) => "structured",
            ParsedAdvisory::Sections(_) => "sections",
            ParsedAdvisory::Unstructured(_) => "unstructured",
        }
    }
}

/// Parse a full response envelope
pub fn parse_response(response: &GenerationResponse) -> ParsedAdvisory {
    parse_advisory(&response.text(), response.finish_reason())
}

/// Parse raw model text; `finish_reason` only matters when the text is empty
pub fn parse_advisory(text: &str, finish_reason: Option<&str>) -> ParsedAdvisory {
    let text = text.trim();

    if text.is_empty() {
        let advice = if finish_reason == Some(SAFETY_FINISH_REASON) {
            BLOCKED_MESSAGE
        } else {
            EMPTY_MESSAGE
        };
        return ParsedAdvisory::Empty(AdvisoryResult {
            advice: advice.to_string(),
            ..Default::default()
        });
    }

    if let Some(result) = parse_json_advice(text).filter(|r| !r.is_empty()) {
        return ParsedAdvisory::Structured(result);
    }

    if let Some(result) = parse_sections(text).filter(|r| !r.is_empty()) {
        return ParsedAdvisory::Sections(result);
    }

    ParsedAdvisory::Unstructured(AdvisoryResult {
        advice: text.to_string(),
        ..Default::default()
    })
}

/// True for the parser's own "no usable content" messages
pub fn is_placeholder(advice: &str) -> bool {
    let normalized = advice.to_lowercase();
    normalized.contains("la ia no proporcionó") || normalized.contains("respuesta de la ia fue bloqueada")
}

/// Decode a JSON object, optionally wrapped in a code fence
fn parse_json_advice(raw: &str) -> Option<AdvisoryResult> {
    let json_text = FENCED_BLOCK
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw);

    let parsed: Value = serde_json::from_str(json_text.trim()).ok()?;

    let advice_items = string_list(pick(&parsed, "consejos", "advice"));
    let recommendations = string_list(pick(&parsed, "recomendaciones", "recommendations"));
    let warnings = string_list(pick(&parsed, "precauciones", "warnings"));
    let observations = pick(&parsed, "observaciones", "observations")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    let mut advice = advice_items.join("\n");
    if advice.is_empty() && !observations.is_empty() {
        advice = observations.to_string();
    }

    Some(AdvisoryResult {
        advice,
        recommendations,
        warnings,
    })
}

/// Localized key when it holds a usable value, otherwise the generic key
fn pick<'a>(value: &'a Value, localized: &str, generic: &str) -> Option<&'a Value> {
    value
        .get(localized)
        .filter(|v| is_present(v))
        .or_else(|| value.get(generic).filter(|v| is_present(v)))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Coerce a JSON field to a list of non-empty trimmed strings
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(['\n', '\r'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Decode `CONSEJOS:` / `RECOMENDACIONES:` / `PRECAUCIONES:` blocks
///
/// Each block runs from its label to the next label or the end of text. When a
/// label repeats, only its first block is used.
fn parse_sections(text: &str) -> Option<AdvisoryResult> {
    let labels: Vec<_> = SECTION_LABEL.captures_iter(text).collect();
    if labels.is_empty() {
        return None;
    }

    let mut advice: Option<String> = None;
    let mut recommendations: Option<Vec<String>> = None;
    let mut warnings: Option<Vec<String>> = None;

    for (i, caps) in labels.iter().enumerate() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = labels
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        let block = &text[whole.end()..end];

        match name.as_str().to_uppercase().as_str() {
            "CONSEJOS" if advice.is_none() => {
                let items = list_items(block);
                advice = Some(if items.is_empty() {
                    block.trim().to_string()
                } else {
                    items.join("\n")
                });
            }
            "RECOMENDACIONES" if recommendations.is_none() => {
                recommendations = Some(list_items(block));
            }
            "PRECAUCIONES" if warnings.is_none() => {
                warnings = Some(list_items(block));
            }
            _ => {}
        }
    }

    Some(AdvisoryResult {
        advice: advice.unwrap_or_default(),
        recommendations: recommendations.unwrap_or_default(),
        warnings: warnings.unwrap_or_default(),
    })
}

/// Split a block into items, stripping `-`, `•` and `N.` markers
fn list_items(block: &str) -> Vec<String> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            if BULLET_MARKER.is_match(line) {
                let cleaned = BULLET_MARKER.replace(line, "");
                let cleaned = cleaned.trim();
                (!cleaned.is_empty()).then(|| cleaned.to_string())
            } else {
                Some(line.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured(parsed: &ParsedAdvisory) -> &AdvisoryResult {
        match parsed {
            ParsedAdvisory::Structured(r) => r,
            other => panic!("expected structured, got {}", other.kind()),
        }
    }

    fn sections(parsed: &ParsedAdvisory) -> &AdvisoryResult {
        match parsed {
            ParsedAdvisory::Sections(r) => r,
            other => panic!("expected sections, got {}", other.kind()),
        }
    }

    #[test]
    fn test_empty_text_placeholder() {
        let parsed = parse_advisory("", Some("STOP"));
        assert!(matches!(parsed, ParsedAdvisory::Empty(_)));
        assert_eq!(parsed.result().advice, EMPTY_MESSAGE);

        let parsed = parse_advisory("   \n", None);
        assert_eq!(parsed.result().advice, EMPTY_MESSAGE);
    }

    #[test]
    fn test_safety_block_placeholder() {
        let parsed = parse_advisory("", Some("SAFETY"));
        assert_eq!(parsed.result().advice, BLOCKED_MESSAGE);
        assert!(parsed.result().recommendations.is_empty());
        assert!(parsed.result().warnings.is_empty());
    }

    #[test]
    fn test_full_json_payload() {
        let raw = r#"{
            "consejos": ["Administra con alimentos", "Mantén hidratado al niño"],
            "recomendaciones": ["Usa jeringa oral"],
            "precauciones": ["Suspende si hay erupción"],
            "observaciones": "Sin observaciones"
        }"#;

        let parsed = parse_advisory(raw, None);
        let result = structured(&parsed);
        assert_eq!(result.advice, "Administra con alimentos\nMantén hidratado al niño");
        assert_eq!(result.recommendations, vec!["Usa jeringa oral"]);
        assert_eq!(result.warnings, vec!["Suspende si hay erupción"]);
    }

    #[test]
    fn test_fenced_json() {
        let raw = "Aquí está:\n```json\n{\"consejos\": [\"Uno\"], \"precauciones\": []}\n```\nFin";
        let parsed = parse_advisory(raw, None);
        let result = structured(&parsed);
        assert_eq!(result.advice, "Uno");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n{\"advice\": \"a\\nb\", \"warnings\": [\" w \"]}\n```";
        let result = structured(&parse_advisory(raw, None)).clone();
        assert_eq!(result.advice, "a\nb");
        assert_eq!(result.warnings, vec!["w"]);
    }

    #[test]
    fn test_generic_keys_and_coercion() {
        let raw = r#"{
            "advice": "Primera línea\r\nSegunda línea",
            "recommendations": ["ok", 3, null, "  ", {"x": 1}, "otra"],
            "warnings": 42
        }"#;

        let result = structured(&parse_advisory(raw, None)).clone();
        assert_eq!(result.advice, "Primera línea\nSegunda línea");
        assert_eq!(result.recommendations, vec!["ok", "otra"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_localized_key_preferred_over_generic() {
        let raw = r#"{"consejos": ["localizado"], "advice": ["genérico"]}"#;
        assert_eq!(structured(&parse_advisory(raw, None)).advice, "localizado");

        // Blank localized value falls back to the generic key
        let raw = r#"{"consejos": "", "advice": ["genérico"]}"#;
        assert_eq!(structured(&parse_advisory(raw, None)).advice, "genérico");
    }

    #[test]
    fn test_observations_fill_missing_advice() {
        let raw = r#"{"consejos": [], "recomendaciones": [], "precauciones": [],
                      "observaciones": "  Sin información farmacológica verificable para X  "}"#;
        let result = structured(&parse_advisory(raw, None)).clone();
        assert_eq!(result.advice, "Sin información farmacológica verificable para X");
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_generic_observations_key() {
        let raw = r#"{"warnings": ["Vigilar fiebre"], "observations": " Sin datos verificados "}"#;
        let result = structured(&parse_advisory(raw, None)).clone();
        assert_eq!(result.advice, "Sin datos verificados");
        assert_eq!(result.warnings, vec!["Vigilar fiebre"]);

        // Localized key wins when both are present
        let raw = r#"{"observaciones": "local", "observations": "generic"}"#;
        assert_eq!(structured(&parse_advisory(raw, None)).advice, "local");

        // Advice items take precedence over observations
        let raw = r#"{"advice": ["Con comida"], "observations": "ignorada"}"#;
        assert_eq!(structured(&parse_advisory(raw, None)).advice, "Con comida");
    }

    #[test]
    fn test_partial_json_does_not_degrade_to_sections() {
        // The warnings field is usable, so section labels inside strings are ignored
        let raw = r#"{"consejos": 7, "precauciones": ["CONSEJOS: no es una sección"]}"#;
        let parsed = parse_advisory(raw, None);
        let result = structured(&parsed);
        assert_eq!(result.advice, "");
        assert_eq!(result.warnings, vec!["CONSEJOS: no es una sección"]);
    }

    #[test]
    fn test_json_without_usable_fields_falls_through() {
        let raw = r#"{"otro": ["x"]}"#;
        let parsed = parse_advisory(raw, None);
        assert!(matches!(parsed, ParsedAdvisory::Unstructured(_)));
        assert_eq!(parsed.result().advice, raw);
    }

    #[test]
    fn test_invalid_fenced_json_recovers_sections() {
        let raw = "```json\n{\"consejos\": [\"sin cerrar\"\n```\n\
                   CONSEJOS:\n- Da la dosis con agua\n\
                   RECOMENDACIONES:\n1. Usa jeringa oral\n2. Registra cada toma\n\
                   PRECAUCIONES:\n• Vigila vómitos";

        let parsed = parse_advisory(raw, None);
        let result = sections(&parsed);
        assert_eq!(result.advice, "Da la dosis con agua");
        assert_eq!(result.recommendations, vec!["Usa jeringa oral", "Registra cada toma"]);
        assert_eq!(result.warnings, vec!["Vigila vómitos"]);
    }

    #[test]
    fn test_sections_are_case_insensitive_and_bounded() {
        let raw = "consejos: Reposo relativo.\nprecauciones:\n- Fiebre alta\nRecomendaciones:\n- Control en 48h";

        let result = sections(&parse_advisory(raw, None)).clone();
        assert_eq!(result.advice, "Reposo relativo.");
        assert_eq!(result.warnings, vec!["Fiebre alta"]);
        assert_eq!(result.recommendations, vec!["Control en 48h"]);
    }

    #[test]
    fn test_section_lines_without_markers_are_items() {
        let raw = "RECOMENDACIONES:\nPrimera\n\n  Segunda  \n-\n";
        let result = sections(&parse_advisory(raw, None)).clone();
        assert_eq!(result.advice, "");
        assert_eq!(result.recommendations, vec!["Primera", "Segunda"]);
    }

    #[test]
    fn test_empty_sections_fall_back_to_raw_text() {
        let raw = "CONSEJOS:\nRECOMENDACIONES:";
        let parsed = parse_advisory(raw, None);
        assert!(matches!(parsed, ParsedAdvisory::Unstructured(_)));
        assert_eq!(parsed.result().advice, raw);
    }

    #[test]
    fn test_prose_becomes_advice() {
        let raw = "Administra la dosis indicada y consulta a tu pediatra.";
        let parsed = parse_advisory(raw, Some("STOP"));
        assert!(matches!(parsed, ParsedAdvisory::Unstructured(_)));
        assert_eq!(parsed.result().advice, raw);
        assert!(parsed.result().recommendations.is_empty());
    }

    #[test]
    fn test_parse_response_envelope() {
        let parsed = parse_response(&GenerationResponse::from_text(r#"{"consejos": ["a"]}"#));
        assert_eq!(parsed.result().advice, "a");

        let parsed = parse_response(&GenerationResponse::empty_with_reason("SAFETY"));
        assert_eq!(parsed.result().advice, BLOCKED_MESSAGE);
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder(EMPTY_MESSAGE));
        assert!(is_placeholder(BLOCKED_MESSAGE));
        assert!(is_placeholder("LA IA NO PROPORCIONÓ nada"));
        assert!(!is_placeholder("Administra 5 ml cada 8 horas"));
    }
}
