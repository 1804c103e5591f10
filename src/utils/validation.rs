//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! que el derive de `validator` no cubre.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Horario `HH:MM` (00:00 a 23:59)
    static ref TIME_OF_DAY: Regex = Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$")
        .expect("regex de horario inválida");
}

/// Validar un horario del día en formato `HH:MM`
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    if !TIME_OF_DAY.is_match(value) {
        let mut error = ValidationError::new("time_of_day");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"HH:MM".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío (ignorando espacios)
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Normalizar un identificador (matrícula, chasis): sin espacios laterales y en mayúsculas
pub fn normalize_identifier(value: &str) -> String {
    value.trim().to_uppercase()
}
