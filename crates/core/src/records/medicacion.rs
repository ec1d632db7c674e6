//! Medication administration records. Append-only: an administration that
//! happened is never edited away.

use chrono::{DateTime, Utc};

use crate::config::CoreConfig;
use crate::constants::{ADMINISTRACION_JSON_FILENAME, INGRESO_JSON_FILENAME};
use crate::docstore::{DocStore, RecordId};
use crate::{StoreError, StoreResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AdministracionMedicamento {
    pub id: RecordId,
    pub ingreso_id: RecordId,
    pub medicamento: String,
    pub dosis: String,
    pub fecha_hora_administracion: DateTime<Utc>,
    /// Username of the identity that recorded the administration.
    pub administrado_por: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAdministracion {
    pub ingreso_id: RecordId,
    pub medicamento: String,
    pub dosis: String,
    pub fecha_hora_administracion: DateTime<Utc>,
    pub administrado_por: String,
}

pub struct MedicacionService {
    store: DocStore,
    ingresos: DocStore,
}

impl MedicacionService {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            store: DocStore::new(config.administraciones_dir(), ADMINISTRACION_JSON_FILENAME),
            ingresos: DocStore::new(config.ingresos_dir(), INGRESO_JSON_FILENAME),
        }
    }

    pub fn create(&self, input: NewAdministracion) -> StoreResult<AdministracionMedicamento> {
        if !self.ingresos.exists(&input.ingreso_id) {
            return Err(StoreError::MissingReference(format!(
                "ingreso {}",
                input.ingreso_id
            )));
        }
        let medicamento = input.medicamento.trim();
        let dosis = input.dosis.trim();
        if medicamento.is_empty() || dosis.is_empty() {
            return Err(StoreError::InvalidInput(
                "medicamento and dosis are required".into(),
            ));
        }

        let administracion = AdministracionMedicamento {
            id: RecordId::new(),
            ingreso_id: input.ingreso_id,
            medicamento: medicamento.to_owned(),
            dosis: dosis.to_owned(),
            fecha_hora_administracion: input.fecha_hora_administracion,
            administrado_por: input.administrado_por,
            created_at: Utc::now(),
        };
        self.store.insert(&administracion.id, &administracion)?;
        Ok(administracion)
    }

    pub fn get(&self, id: &RecordId) -> StoreResult<AdministracionMedicamento> {
        self.store.read(id)
    }

    pub fn list(&self) -> Vec<AdministracionMedicamento> {
        self.store.list()
    }

    /// Administrations recorded on the given UTC date.
    pub fn count_on(&self, date: chrono::NaiveDate) -> usize {
        self.list()
            .iter()
            .filter(|a| a.fecha_hora_administracion.date_naive() == date)
            .count()
    }
}
