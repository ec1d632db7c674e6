//! Admission records with the obstetric intake data.

use chrono::{DateTime, Utc};

use crate::config::CoreConfig;
use crate::constants::{INGRESO_JSON_FILENAME, PACIENTE_JSON_FILENAME};
use crate::docstore::{DocStore, RecordId};
use crate::{StoreError, StoreResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Ingreso {
    pub id: RecordId,
    pub paciente_id: RecordId,
    pub fecha_ingreso: DateTime<Utc>,
    pub motivo: String,
    /// Gestational age in completed weeks at admission.
    pub semanas_gestacion: u8,
    /// Number of previous births.
    pub paridad: u8,
    pub activa: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewIngreso {
    pub paciente_id: RecordId,
    pub fecha_ingreso: DateTime<Utc>,
    pub motivo: String,
    pub semanas_gestacion: u8,
    pub paridad: u8,
}

pub struct IngresoService {
    store: DocStore,
    pacientes: DocStore,
}

impl IngresoService {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            store: DocStore::new(config.ingresos_dir(), INGRESO_JSON_FILENAME),
            pacientes: DocStore::new(config.pacientes_dir(), PACIENTE_JSON_FILENAME),
        }
    }

    pub fn create(&self, input: NewIngreso) -> StoreResult<Ingreso> {
        if !self.pacientes.exists(&input.paciente_id) {
            return Err(StoreError::MissingReference(format!(
                "paciente {}",
                input.paciente_id
            )));
        }
        let motivo = input.motivo.trim();
        if motivo.is_empty() {
            return Err(StoreError::InvalidInput("motivo cannot be empty".into()));
        }
        if input.semanas_gestacion > 45 {
            return Err(StoreError::InvalidInput(format!(
                "semanas_gestacion out of range: {}",
                input.semanas_gestacion
            )));
        }

        let ingreso = Ingreso {
            id: RecordId::new(),
            paciente_id: input.paciente_id,
            fecha_ingreso: input.fecha_ingreso,
            motivo: motivo.to_owned(),
            semanas_gestacion: input.semanas_gestacion,
            paridad: input.paridad,
            activa: true,
            created_at: Utc::now(),
        };
        self.store.insert(&ingreso.id, &ingreso)?;
        Ok(ingreso)
    }

    pub fn get(&self, id: &RecordId) -> StoreResult<Ingreso> {
        self.store.read(id)
    }

    pub fn list(&self) -> Vec<Ingreso> {
        self.store.list()
    }

    /// Admissions whose admission timestamp falls on the given UTC date.
    pub fn count_on(&self, date: chrono::NaiveDate) -> usize {
        self.list()
            .iter()
            .filter(|i| i.fecha_ingreso.date_naive() == date)
            .count()
    }

    pub fn close(&self, id: &RecordId) -> StoreResult<Ingreso> {
        let mut ingreso: Ingreso = self.store.read(id)?;
        ingreso.activa = false;
        self.store.replace(id, &ingreso)?;
        Ok(ingreso)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::paciente::{NewPaciente, PacienteService};
    use crate::records::persona::{NewPersona, PersonaService, Sexo};
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn setup(dir: &TempDir) -> (CoreConfig, IngresoService) {
        let config = CoreConfig::with_data_dir(dir.path().to_path_buf())
            .expect("Should build config");
        let ingresos = IngresoService::new(&config);
        (config, ingresos)
    }

    fn a_paciente(config: &CoreConfig) -> RecordId {
        let persona = PersonaService::new(config)
            .create(NewPersona {
                rut: "12.345.678-5".to_owned(),
                nombre: "Carla".to_owned(),
                apellido_paterno: "Muñoz".to_owned(),
                apellido_materno: "Silva".to_owned(),
                fecha_nacimiento: NaiveDate::from_ymd_opt(1990, 5, 14).unwrap(),
                sexo: Sexo::Femenino,
            })
            .expect("Should create persona");
        PacienteService::new(config)
            .create(NewPaciente {
                persona_id: persona.id,
                grupo_sanguineo: "O+".to_owned(),
                alergias: String::new(),
            })
            .expect("Should create paciente")
            .id
    }

    #[test]
    fn create_requires_existing_paciente() {
        let dir = TempDir::new().expect("Should create temp dir");
        let (_config, ingresos) = setup(&dir);
        let result = ingresos.create(NewIngreso {
            paciente_id: RecordId::new(),
            fecha_ingreso: Utc::now(),
            motivo: "trabajo de parto".to_owned(),
            semanas_gestacion: 39,
            paridad: 1,
        });
        assert!(matches!(result, Err(StoreError::MissingReference(_))));
    }

    #[test]
    fn counts_todays_admissions_only() {
        let dir = TempDir::new().expect("Should create temp dir");
        let (config, ingresos) = setup(&dir);
        let paciente_id = a_paciente(&config);

        let now = Utc::now();
        ingresos
            .create(NewIngreso {
                paciente_id: paciente_id.clone(),
                fecha_ingreso: now,
                motivo: "trabajo de parto".to_owned(),
                semanas_gestacion: 39,
                paridad: 1,
            })
            .expect("Should create ingreso");
        ingresos
            .create(NewIngreso {
                paciente_id,
                fecha_ingreso: now - Duration::days(3),
                motivo: "control".to_owned(),
                semanas_gestacion: 36,
                paridad: 1,
            })
            .expect("Should create ingreso");

        assert_eq!(ingresos.count_on(now.date_naive()), 1);
        assert_eq!(ingresos.list().len(), 2);
    }

    #[test]
    fn implausible_gestational_age_is_rejected() {
        let dir = TempDir::new().expect("Should create temp dir");
        let (config, ingresos) = setup(&dir);
        let paciente_id = a_paciente(&config);
        let result = ingresos.create(NewIngreso {
            paciente_id,
            fecha_ingreso: Utc::now(),
            motivo: "control".to_owned(),
            semanas_gestacion: 80,
            paridad: 0,
        });
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    }
}
