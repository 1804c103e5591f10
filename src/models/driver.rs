//! Modelo de Chauffeur
//!
//! Directorio de choferes, de solo lectura desde esta API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Chauffeur - mapea a la tabla core_chauffeur.
///
/// `statut` es un conjunto abierto (`actif`, `repos`, ...), por eso queda como texto.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Driver {
    pub id: i32,
    pub nom: String,
    pub prenom: String,
    pub telephone: String,
    pub numero_permis: String,
    pub date_obtention_permis: Option<NaiveDate>,
    pub statut: String,
}

impl Driver {
    pub fn nom_complet(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }
}
