//! Deterministic fallback advisory
//!
//! Built only from figures already present in the request, so it is available
//! whenever the model gives nothing usable.

use crate::types::{AdvisoryRequest, AdvisoryResult};

/// Templated advice sentence
pub fn default_advice(request: &AdvisoryRequest) -> String {
    format!(
        "Administra {:.2} mg ({:.2} ml) por toma, {} veces al día, respetando el rango seguro {}. Mantén hidratado al paciente y verifica que tolere la medicación.",
        request.dose_per_administration, request.volume_per_dose, request.doses_per_day, request.safe_range
    )
}

/// Confirm weight, measuring-device guidance, monitor and record
pub fn default_recommendations(request: &AdvisoryRequest) -> Vec<String> {
    vec![
        "Confirma el peso del paciente antes de cada ajuste de dosis.".to_string(),
        format!(
            "Utiliza una jeringa oral para medir {:.2} ml por dosis sin exceder el rango {}.",
            request.volume_per_dose, request.safe_range
        ),
        "Observa signos de mejoría dentro de las primeras 48 horas y registra cada administración.".to_string(),
    ]
}

/// Stop-and-consult triggers, duplicate ingredient, missed dose
pub fn default_warnings(request: &AdvisoryRequest) -> Vec<String> {
    vec![
        "Suspende el medicamento y consulta al pediatra si aparecen vómitos persistentes, erupciones o dificultad respiratoria.".to_string(),
        "No combines este fármaco con otros que contengan el mismo principio activo sin indicación médica.".to_string(),
        format!(
            "Si una dosis se omite y faltan menos de 4 horas para la siguiente, no dupliques {:.2} mg.",
            request.dose_per_administration
        ),
    ]
}

/// Complete fallback advisory
pub fn fallback_advisory(request: &AdvisoryRequest) -> AdvisoryResult {
    AdvisoryResult {
        advice: default_advice(request),
        recommendations: default_recommendations(request),
        warnings: default_warnings(request),
    }
}
