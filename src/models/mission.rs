//! Modelo de Mission (course)
//!
//! Mapea a la tabla legacy `core_course`. Aquí vive la lógica pura del ledger
//! de missions: ciclo de vida del statut, filtros, timeline y estadísticas
//! del dashboard. Los repositorios solo persisten; no deciden.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Statut de una mission. Enumeración cerrada; los valores de wire son los
/// códigos legacy en francés.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MissionStatus {
    #[serde(rename = "en_attente", alias = "pending")]
    Pending,
    #[serde(rename = "planifiee", alias = "scheduled")]
    Scheduled,
    #[serde(rename = "en_cours", alias = "in_progress")]
    InProgress,
    #[serde(rename = "terminee", alias = "completed")]
    Completed,
    #[serde(rename = "annulee", alias = "cancelled")]
    Cancelled,
}

impl MissionStatus {
    pub const ALL: [MissionStatus; 5] = [
        MissionStatus::Pending,
        MissionStatus::Scheduled,
        MissionStatus::InProgress,
        MissionStatus::Completed,
        MissionStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Pending => "en_attente",
            MissionStatus::Scheduled => "planifiee",
            MissionStatus::InProgress => "en_cours",
            MissionStatus::Completed => "terminee",
            MissionStatus::Cancelled => "annulee",
        }
    }

    fn alias(&self) -> &'static str {
        match self {
            MissionStatus::Pending => "pending",
            MissionStatus::Scheduled => "scheduled",
            MissionStatus::InProgress => "in_progress",
            MissionStatus::Completed => "completed",
            MissionStatus::Cancelled => "cancelled",
        }
    }

    /// Lista de valores válidos para los mensajes de error
    pub fn valid_values() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.as_str()).collect()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MissionStatus::Completed | MissionStatus::Cancelled)
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Valor de statut no reconocido
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Statut invalide '{0}'. Statuts valides: {valid:?}", valid = MissionStatus::valid_values())]
pub struct InvalidStatus(pub String);

impl FromStr for MissionStatus {
    type Err = InvalidStatus;

    /// Insensible a mayúsculas; acepta el código legacy o el alias inglés
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted || status.alias() == wanted)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

impl TryFrom<String> for MissionStatus {
    type Error = InvalidStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Mission principal - mapea a la tabla core_course
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Mission {
    pub id: i32,
    pub destination: String,
    pub lieu_depart: Option<String>,
    pub date_souhaitee: NaiveDate,
    pub heure_depart: Option<String>,
    pub heure_retour: Option<String>,
    pub vehicule_id: Option<i32>,
    pub chauffeur_id: Option<i32>,
    pub demandeur_id: Option<i32>,
    pub distance_parcourue: i32,
    pub observations: Option<String>,
    #[sqlx(try_from = "String")]
    pub statut: MissionStatus,
    pub date_creation: DateTime<Utc>,
    pub date_modification: Option<DateTime<Utc>>,
}

/// Datos validados para crear una mission
#[derive(Debug, Clone)]
pub struct NewMission {
    pub destination: String,
    pub lieu_depart: Option<String>,
    pub date_souhaitee: NaiveDate,
    pub heure_depart: Option<String>,
    pub heure_retour: Option<String>,
    pub vehicule_id: Option<i32>,
    pub chauffeur_id: Option<i32>,
    pub demandeur_id: Option<i32>,
    pub observations: Option<String>,
}

/// Update parcial. `Some(None)` en una referencia significa "desasignar".
#[derive(Debug, Clone, Default)]
pub struct MissionPatch {
    pub destination: Option<String>,
    pub lieu_depart: Option<Option<String>>,
    pub date_souhaitee: Option<NaiveDate>,
    pub heure_depart: Option<Option<String>>,
    pub heure_retour: Option<Option<String>>,
    pub vehicule_id: Option<Option<i32>>,
    pub chauffeur_id: Option<Option<i32>>,
    pub demandeur_id: Option<Option<i32>>,
    pub distance_parcourue: Option<i32>,
    pub observations: Option<Option<String>>,
    pub statut: Option<MissionStatus>,
}

impl MissionPatch {
    /// Referencias de vehículo/chofer que el patch asigna (no las que quita)
    pub fn assigned_vehicle(&self) -> Option<i32> {
        self.vehicule_id.flatten()
    }

    pub fn assigned_driver(&self) -> Option<i32> {
        self.chauffeur_id.flatten()
    }
}

impl Mission {
    /// Nueva mission: statut `en_attente`, distancia 0
    pub fn from_new(id: i32, data: NewMission, now: DateTime<Utc>) -> Self {
        Self {
            id,
            destination: data.destination,
            lieu_depart: data.lieu_depart,
            date_souhaitee: data.date_souhaitee,
            heure_depart: data.heure_depart,
            heure_retour: data.heure_retour,
            vehicule_id: data.vehicule_id,
            chauffeur_id: data.chauffeur_id,
            demandeur_id: data.demandeur_id,
            distance_parcourue: 0,
            observations: data.observations,
            statut: MissionStatus::Pending,
            date_creation: now,
            date_modification: None,
        }
    }

    /// Aplica un update parcial ya validado y refresca la fecha de modificación
    pub fn apply(&mut self, patch: MissionPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.destination {
            self.destination = v;
        }
        if let Some(v) = patch.lieu_depart {
            self.lieu_depart = v;
        }
        if let Some(v) = patch.date_souhaitee {
            self.date_souhaitee = v;
        }
        if let Some(v) = patch.heure_depart {
            self.heure_depart = v;
        }
        if let Some(v) = patch.heure_retour {
            self.heure_retour = v;
        }
        if let Some(v) = patch.vehicule_id {
            self.vehicule_id = v;
        }
        if let Some(v) = patch.chauffeur_id {
            self.chauffeur_id = v;
        }
        if let Some(v) = patch.demandeur_id {
            self.demandeur_id = v;
        }
        if let Some(v) = patch.distance_parcourue {
            self.distance_parcourue = v;
        }
        if let Some(v) = patch.observations {
            self.observations = v;
        }
        if let Some(v) = patch.statut {
            self.set_status(v);
        }
        self.date_modification = Some(now);
    }

    /// Único punto por el que pasa cualquier cambio de statut; devuelve el anterior.
    ///
    /// El grafo es permisivo: cualquier statut reconocido es alcanzable desde
    /// cualquier otro, `annulee` incluido. La validación del valor ocurre al
    /// construir el `MissionStatus`, igual para todas las rutas de escritura.
    pub fn set_status(&mut self, status: MissionStatus) -> MissionStatus {
        std::mem::replace(&mut self.statut, status)
    }

    /// Timeline derivada de cuatro hitos fijos
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        let departed = self.statut != MissionStatus::Pending;
        let completed = self.statut == MissionStatus::Completed;

        vec![
            TimelineEntry::new(
                Some(self.date_creation.format("%H:%M").to_string()),
                "Mission créée",
                true,
            ),
            TimelineEntry::new(self.heure_depart.clone(), "Départ confirmé", departed),
            TimelineEntry::new(None, "Arrivée destination", completed),
            TimelineEntry::new(self.heure_retour.clone(), "Retour bureau", completed),
        ]
    }
}

/// Hito de la timeline de una mission
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineEntry {
    pub time: Option<String>,
    pub event: String,
    pub status: CheckpointStatus,
}

impl TimelineEntry {
    fn new(time: Option<String>, event: &str, done: bool) -> Self {
        Self {
            time,
            event: event.to_string(),
            status: if done {
                CheckpointStatus::Completed
            } else {
                CheckpointStatus::Pending
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointStatus {
    Completed,
    Pending,
}

/// Filtro de statut tal como llega del cliente
#[derive(Debug, Clone, PartialEq)]
pub enum StatusFilter {
    Any,
    Is(MissionStatus),
    /// Valor no reconocido: no coincide con ninguna mission
    Unknown(String),
}

impl StatusFilter {
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|s| !s.is_empty()) {
            None => StatusFilter::Any,
            Some(raw) => match raw.parse() {
                Ok(status) => StatusFilter::Is(status),
                Err(_) => StatusFilter::Unknown(raw.to_string()),
            },
        }
    }
}

/// Filtros de listado, combinados con AND
#[derive(Debug, Clone)]
pub struct MissionFilters {
    pub statut: StatusFilter,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    pub chauffeur_id: Option<i32>,
    pub vehicule_id: Option<i32>,
}

impl Default for MissionFilters {
    fn default() -> Self {
        Self {
            statut: StatusFilter::Any,
            date_debut: None,
            date_fin: None,
            chauffeur_id: None,
            vehicule_id: None,
        }
    }
}

impl MissionFilters {
    pub fn matches(&self, mission: &Mission) -> bool {
        let statut_ok = match &self.statut {
            StatusFilter::Any => true,
            StatusFilter::Is(status) => mission.statut == *status,
            StatusFilter::Unknown(_) => false,
        };

        statut_ok
            && self.date_debut.map_or(true, |d| mission.date_souhaitee >= d)
            && self.date_fin.map_or(true, |d| mission.date_souhaitee <= d)
            && self
                .chauffeur_id
                .map_or(true, |id| mission.chauffeur_id == Some(id))
            && self
                .vehicule_id
                .map_or(true, |id| mission.vehicule_id == Some(id))
    }
}

/// Estadísticas agregadas para el dashboard
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MissionStats {
    pub total_missions: usize,
    pub missions_aujourd_hui: usize,
    pub stats_by_status: BTreeMap<String, usize>,
    pub distance_totale_km: i64,
    pub missions_actives: usize,
    pub missions_en_attente: usize,
    pub taux_completion: f64,
}

impl MissionStats {
    pub fn compute(missions: &[Mission], as_of: NaiveDate) -> Self {
        let mut by_status: BTreeMap<MissionStatus, usize> = BTreeMap::new();
        for mission in missions {
            *by_status.entry(mission.statut).or_insert(0) += 1;
        }

        Self::from_counts(
            by_status,
            missions.iter().filter(|m| m.date_souhaitee == as_of).count(),
            missions.iter().map(|m| m.distance_parcourue as i64).sum(),
        )
    }

    /// Construye el dashboard a partir de contadores ya agregados
    pub fn from_counts(
        by_status: BTreeMap<MissionStatus, usize>,
        missions_aujourd_hui: usize,
        distance_totale_km: i64,
    ) -> Self {
        let total: usize = by_status.values().sum();
        let count = |status: MissionStatus| by_status.get(&status).copied().unwrap_or(0);

        let taux_completion = if total == 0 {
            0.0
        } else {
            let rate = count(MissionStatus::Completed) as f64 / total as f64 * 100.0;
            (rate * 10.0).round() / 10.0
        };

        Self {
            total_missions: total,
            missions_aujourd_hui,
            distance_totale_km,
            missions_actives: count(MissionStatus::InProgress),
            missions_en_attente: count(MissionStatus::Pending),
            taux_completion,
            stats_by_status: by_status
                .iter()
                .map(|(status, n)| (status.as_str().to_string(), *n))
                .collect(),
        }
    }
}
