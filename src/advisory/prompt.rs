//! Advisory prompt construction
//!
//! Pure string rendering: case facts, an optional pharmacology block and
//! strict instructions for a four-key JSON reply.

use crate::types::{AdvisoryRequest, KnowledgeSnippet};

/// Maximum entries requested per list
pub const MAX_LIST_ITEMS: usize = 4;

const NOT_AVAILABLE: &str = "No disponible";
const NOT_IDENTIFIED: &str = "No identificado";
const NOT_RECORDED: &str = "No registradas";

/// Render the full prompt for one advisory request
pub fn build_prompt(request: &AdvisoryRequest, knowledge: Option<&KnowledgeSnippet>) -> String {
    let description = request
        .medicine_description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(NOT_AVAILABLE);

    let knowledge_block = match knowledge {
        Some(snippet) => knowledge_block(snippet),
        None => missing_knowledge_block(&request.medicine_name),
    };

    format!(
        "Eres un asistente médico pediátrico. Cruza la dosis calculada con la información oficial del fármaco y prioriza la seguridad.

Datos del caso:
- Medicamento: {name}
- Descripción proporcionada: {description}
- Peso del paciente: {weight} kg
- Dosis diaria total: {daily} mg
- Frecuencia diaria: {doses} dosis
- Dosis por administración: {per_dose} mg
- Volumen por dosis: {volume} ml
- Rango seguro: {safe_range}
- Estado actual: {alert}

{knowledge_block}
Devuelve ÚNICAMENTE un objeto JSON válido (sin texto adicional, ni explicaciones, ni markdown) con esta forma:
{{
  \"consejos\": [\"texto\", \"texto\"],
  \"recomendaciones\": [\"texto\"],
  \"precauciones\": [\"texto\"],
  \"observaciones\": \"texto opcional\"
}}

Reglas:
- Las listas deben tener máximo {max_items} puntos cada una.
- Usa oraciones cortas y específicas para cuidadores.
- Si no hay datos del medicamento, responde \"Sin información farmacológica verificable para {name}\" en observaciones y evita inventar datos.
- Si falta información del paciente, indica la precaución correspondiente.
- No agregues recordatorios legales, eso ya lo muestra la aplicación.",
        name = request.medicine_name,
        description = description,
        weight = request.patient_weight,
        daily = request.daily_dose,
        doses = request.doses_per_day,
        per_dose = request.dose_per_administration,
        volume = request.volume_per_dose,
        safe_range = request.safe_range,
        alert = request.alert,
        knowledge_block = knowledge_block,
        max_items = MAX_LIST_ITEMS,
    )
}

fn knowledge_block(snippet: &KnowledgeSnippet) -> String {
    let mechanism = snippet
        .mechanism
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(NOT_IDENTIFIED);

    format!(
        "Información farmacológica encontrada:
- Clase/mecanismo principal: {}
- Indicaciones conocidas: {}
- Contraindicaciones reportadas: {}
- Usa las contraindicaciones listadas como base para PRECAUCIONES si aplican al caso.
",
        mechanism,
        format_list(&snippet.indications),
        format_list(&snippet.contraindications),
    )
}

fn missing_knowledge_block(medicine_name: &str) -> String {
    format!(
        "No se encontró evidencia farmacológica confiable para \"{}\". Si el medicamento no es reconocible, deja las listas vacías y explica en \"observaciones\" que no hay información verificada.
",
        medicine_name
    )
}

fn format_list(values: &[String]) -> String {
    if values.is_empty() {
        NOT_RECORDED.to_string()
    } else {
        values.join(", ")
    }
}
