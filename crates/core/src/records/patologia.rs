//! Pathology catalogue records.

use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::config::CoreConfig;
use crate::constants::PATOLOGIA_JSON_FILENAME;
use crate::docstore::{DocStore, RecordId};
use crate::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NivelRiesgo {
    Bajo,
    Medio,
    Alto,
    Critico,
}

impl NivelRiesgo {
    /// Alto and Crítico pathologies drive the high-risk dashboard count.
    pub fn is_high(&self) -> bool {
        matches!(self, NivelRiesgo::Alto | NivelRiesgo::Critico)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NivelRiesgo::Bajo => "bajo",
            NivelRiesgo::Medio => "medio",
            NivelRiesgo::Alto => "alto",
            NivelRiesgo::Critico => "critico",
        }
    }
}

impl FromStr for NivelRiesgo {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bajo" => Ok(NivelRiesgo::Bajo),
            "medio" => Ok(NivelRiesgo::Medio),
            "alto" => Ok(NivelRiesgo::Alto),
            "critico" | "crítico" => Ok(NivelRiesgo::Critico),
            other => Err(StoreError::InvalidInput(format!(
                "nivel_riesgo must be bajo, medio, alto or critico, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Patologia {
    pub id: RecordId,
    pub nombre: String,
    pub descripcion: String,
    pub nivel_riesgo: NivelRiesgo,
    pub activa: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPatologia {
    pub nombre: String,
    pub descripcion: String,
    pub nivel_riesgo: NivelRiesgo,
}

pub struct PatologiaService {
    store: DocStore,
}

impl PatologiaService {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            store: DocStore::new(config.patologias_dir(), PATOLOGIA_JSON_FILENAME),
        }
    }

    pub fn create(&self, input: NewPatologia) -> StoreResult<Patologia> {
        let nombre = input.nombre.trim();
        if nombre.is_empty() {
            return Err(StoreError::InvalidInput("nombre cannot be empty".into()));
        }

        let patologia = Patologia {
            id: RecordId::new(),
            nombre: nombre.to_owned(),
            descripcion: input.descripcion.trim().to_owned(),
            nivel_riesgo: input.nivel_riesgo,
            activa: true,
            created_at: Utc::now(),
        };
        self.store.insert(&patologia.id, &patologia)?;
        Ok(patologia)
    }

    pub fn get(&self, id: &RecordId) -> StoreResult<Patologia> {
        self.store.read(id)
    }

    pub fn list(&self) -> Vec<Patologia> {
        self.store.list()
    }

    pub fn count_high_risk(&self) -> usize {
        self.list().iter().filter(|p| p.nivel_riesgo.is_high()).count()
    }

    pub fn update_nivel(&self, id: &RecordId, nivel: NivelRiesgo) -> StoreResult<Patologia> {
        let mut patologia: Patologia = self.store.read(id)?;
        patologia.nivel_riesgo = nivel;
        self.store.replace(id, &patologia)?;
        Ok(patologia)
    }
}
