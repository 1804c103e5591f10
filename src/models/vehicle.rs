//! Modelo de Vehicule
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD operations.
//! Mapea exactamente a la tabla legacy `core_vehicule` (primary key `id`),
//! compartida con el sistema Django existente.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Umbral (en días) a partir del cual un vencimiento pasa a "attention"
pub const ATTENTION_THRESHOLD_DAYS: i64 = 30;

/// Vehicule principal - mapea a la tabla core_vehicule
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: i32,
    pub immatriculation: String,
    pub marque: String,
    pub modele: String,
    pub couleur: String,
    pub numero_chassis: String,
    pub date_immatriculation: Option<NaiveDate>,
    pub date_expiration_assurance: NaiveDate,
    pub date_expiration_controle_technique: NaiveDate,
    pub date_expiration_vignette: NaiveDate,
    pub date_expiration_stationnement: NaiveDate,
    pub kilometrage_actuel: Option<i32>,
    pub kilometrage_dernier_entretien: i32,
    pub date_creation: DateTime<Utc>,
    pub date_modification: Option<DateTime<Utc>>,
}

/// Datos ya validados y normalizados para insertar un vehículo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub immatriculation: String,
    pub marque: String,
    pub modele: String,
    pub couleur: String,
    pub numero_chassis: String,
    pub date_immatriculation: Option<NaiveDate>,
    pub date_expiration_assurance: NaiveDate,
    pub date_expiration_controle_technique: NaiveDate,
    pub date_expiration_vignette: NaiveDate,
    pub date_expiration_stationnement: NaiveDate,
    pub kilometrage_actuel: Option<i32>,
    pub kilometrage_dernier_entretien: i32,
}

/// Update parcial: solo los campos presentes se sobreescriben
#[derive(Debug, Clone, Default)]
pub struct VehiclePatch {
    pub immatriculation: Option<String>,
    pub marque: Option<String>,
    pub modele: Option<String>,
    pub couleur: Option<String>,
    pub numero_chassis: Option<String>,
    pub date_expiration_assurance: Option<NaiveDate>,
    pub date_expiration_controle_technique: Option<NaiveDate>,
    pub date_expiration_vignette: Option<NaiveDate>,
    pub date_expiration_stationnement: Option<NaiveDate>,
    pub kilometrage_actuel: Option<i32>,
    pub kilometrage_dernier_entretien: Option<i32>,
}

impl Vehicle {
    /// Construye el registro a partir de los datos de creación
    pub fn from_new(id: i32, data: NewVehicle, now: DateTime<Utc>) -> Self {
        Self {
            id,
            immatriculation: data.immatriculation,
            marque: data.marque,
            modele: data.modele,
            couleur: data.couleur,
            numero_chassis: data.numero_chassis,
            date_immatriculation: data.date_immatriculation,
            date_expiration_assurance: data.date_expiration_assurance,
            date_expiration_controle_technique: data.date_expiration_controle_technique,
            date_expiration_vignette: data.date_expiration_vignette,
            date_expiration_stationnement: data.date_expiration_stationnement,
            kilometrage_actuel: data.kilometrage_actuel,
            kilometrage_dernier_entretien: data.kilometrage_dernier_entretien,
            date_creation: now,
            date_modification: None,
        }
    }

    /// "ABC-123 - Toyota Corolla"
    pub fn nom_complet(&self) -> String {
        format!("{} - {} {}", self.immatriculation, self.marque, self.modele)
    }

    /// Aplica un update parcial y refresca la fecha de modificación
    pub fn apply(&mut self, patch: VehiclePatch, now: DateTime<Utc>) {
        if let Some(v) = patch.immatriculation {
            self.immatriculation = v;
        }
        if let Some(v) = patch.marque {
            self.marque = v;
        }
        if let Some(v) = patch.modele {
            self.modele = v;
        }
        if let Some(v) = patch.couleur {
            self.couleur = v;
        }
        if let Some(v) = patch.numero_chassis {
            self.numero_chassis = v;
        }
        if let Some(v) = patch.date_expiration_assurance {
            self.date_expiration_assurance = v;
        }
        if let Some(v) = patch.date_expiration_controle_technique {
            self.date_expiration_controle_technique = v;
        }
        if let Some(v) = patch.date_expiration_vignette {
            self.date_expiration_vignette = v;
        }
        if let Some(v) = patch.date_expiration_stationnement {
            self.date_expiration_stationnement = v;
        }
        if let Some(v) = patch.kilometrage_actuel {
            self.kilometrage_actuel = Some(v);
        }
        if let Some(v) = patch.kilometrage_dernier_entretien {
            self.kilometrage_dernier_entretien = v;
        }
        self.date_modification = Some(now);
    }

    /// Los cuatro vencimientos, en orden fijo
    pub fn expirations(&self) -> [(ExpiryDocument, NaiveDate); 4] {
        [
            (ExpiryDocument::Assurance, self.date_expiration_assurance),
            (ExpiryDocument::ControleTechnique, self.date_expiration_controle_technique),
            (ExpiryDocument::Vignette, self.date_expiration_vignette),
            (ExpiryDocument::Stationnement, self.date_expiration_stationnement),
        ]
    }

    /// Calcula el estado de alertas documentales a una fecha dada
    pub fn alert_status(&self, as_of: NaiveDate) -> VehicleAlerts {
        let mut days_remaining = Vec::with_capacity(4);
        let mut alertes = Vec::new();
        let mut level = AlertLevel::Active;

        for (document, expiry) in self.expirations() {
            let days = (expiry - as_of).num_days();
            days_remaining.push((document, days));

            if days <= 0 {
                level = AlertLevel::Expired;
            } else if days <= ATTENTION_THRESHOLD_DAYS && level == AlertLevel::Active {
                level = AlertLevel::Attention;
            }

            if days < 0 {
                alertes.push(format!("{} EXPIRÉ depuis {} jours", document.label(), -days));
            } else if days == 0 {
                alertes.push(format!("{} expire aujourd'hui", document.label()));
            } else if days <= ATTENTION_THRESHOLD_DAYS {
                alertes.push(format!("{} expire dans {} jours", document.label(), days));
            }
        }

        VehicleAlerts {
            level,
            days_remaining,
            alertes,
        }
    }

    /// Kilómetros recorridos desde el último mantenimiento
    pub fn kilometrage_depuis_entretien(&self) -> i32 {
        self.kilometrage_actuel.unwrap_or(0) - self.kilometrage_dernier_entretien
    }
}

/// Documentos con fecha de vencimiento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryDocument {
    Assurance,
    ControleTechnique,
    Vignette,
    Stationnement,
}

impl ExpiryDocument {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryDocument::Assurance => "assurance",
            ExpiryDocument::ControleTechnique => "controle_technique",
            ExpiryDocument::Vignette => "vignette",
            ExpiryDocument::Stationnement => "stationnement",
        }
    }

    /// Etiqueta legible para los mensajes de alerta
    pub fn label(&self) -> &'static str {
        match self {
            ExpiryDocument::Assurance => "Assurance",
            ExpiryDocument::ControleTechnique => "Contrôle technique",
            ExpiryDocument::Vignette => "Vignette",
            ExpiryDocument::Stationnement => "Stationnement",
        }
    }
}

/// Clasificación documental del vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertLevel {
    #[serde(rename = "actif")]
    Active,
    #[serde(rename = "attention")]
    Attention,
    #[serde(rename = "alerte")]
    Expired,
}

/// Resultado del cálculo de alertas
#[derive(Debug, Clone)]
pub struct VehicleAlerts {
    pub level: AlertLevel,
    pub days_remaining: Vec<(ExpiryDocument, i64)>,
    pub alertes: Vec<String>,
}

/// Búsqueda de vehículos: substring insensible a mayúsculas sobre matrícula, marca o modelo
#[derive(Debug, Clone, Default)]
pub struct VehicleSearch {
    pub search: Option<String>,
}

impl VehicleSearch {
    /// Término normalizado; `None` si no hay criterio
    pub fn term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        match self.term() {
            None => true,
            Some(term) => {
                vehicle.immatriculation.to_lowercase().contains(&term)
                    || vehicle.marque.to_lowercase().contains(&term)
                    || vehicle.modele.to_lowercase().contains(&term)
            }
        }
    }
}
