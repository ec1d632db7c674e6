//! Patient records. A paciente is always backed by a persona record.

use chrono::{DateTime, Utc};

use crate::config::CoreConfig;
use crate::constants::{PACIENTE_JSON_FILENAME, PERSONA_JSON_FILENAME};
use crate::docstore::{DocStore, RecordId};
use crate::{StoreError, StoreResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Paciente {
    pub id: RecordId,
    pub persona_id: RecordId,
    pub grupo_sanguineo: String,
    #[serde(default)]
    pub alergias: String,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPaciente {
    pub persona_id: RecordId,
    pub grupo_sanguineo: String,
    pub alergias: String,
}

pub struct PacienteService {
    store: DocStore,
    personas: DocStore,
}

impl PacienteService {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            store: DocStore::new(config.pacientes_dir(), PACIENTE_JSON_FILENAME),
            personas: DocStore::new(config.personas_dir(), PERSONA_JSON_FILENAME),
        }
    }

    pub fn create(&self, input: NewPaciente) -> StoreResult<Paciente> {
        if !self.personas.exists(&input.persona_id) {
            return Err(StoreError::MissingReference(format!(
                "persona {}",
                input.persona_id
            )));
        }
        let grupo = input.grupo_sanguineo.trim();
        if grupo.is_empty() {
            return Err(StoreError::InvalidInput(
                "grupo_sanguineo cannot be empty".into(),
            ));
        }

        let paciente = Paciente {
            id: RecordId::new(),
            persona_id: input.persona_id,
            grupo_sanguineo: grupo.to_owned(),
            alergias: input.alergias.trim().to_owned(),
            activo: true,
            created_at: Utc::now(),
        };
        self.store.insert(&paciente.id, &paciente)?;
        Ok(paciente)
    }

    pub fn get(&self, id: &RecordId) -> StoreResult<Paciente> {
        self.store.read(id)
    }

    pub fn list(&self) -> Vec<Paciente> {
        self.store.list()
    }

    /// Active clinical files, the matrona dashboard's headline number.
    pub fn count_active(&self) -> usize {
        self.list().iter().filter(|p| p.activo).count()
    }

    pub fn deactivate(&self, id: &RecordId) -> StoreResult<Paciente> {
        let mut paciente: Paciente = self.store.read(id)?;
        paciente.activo = false;
        self.store.replace(id, &paciente)?;
        Ok(paciente)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::persona::{NewPersona, PersonaService, Sexo};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup(dir: &TempDir) -> (PersonaService, PacienteService) {
        let config = CoreConfig::with_data_dir(dir.path().to_path_buf())
            .expect("Should build config");
        (PersonaService::new(&config), PacienteService::new(&config))
    }

    fn a_persona(personas: &PersonaService) -> RecordId {
        personas
            .create(NewPersona {
                rut: "12.345.678-5".to_owned(),
                nombre: "Carla".to_owned(),
                apellido_paterno: "Muñoz".to_owned(),
                apellido_materno: "Silva".to_owned(),
                fecha_nacimiento: NaiveDate::from_ymd_opt(1990, 5, 14).unwrap(),
                sexo: Sexo::Femenino,
            })
            .expect("Should create persona")
            .id
    }

    #[test]
    fn create_requires_existing_persona() {
        let dir = TempDir::new().expect("Should create temp dir");
        let (_personas, pacientes) = setup(&dir);
        let result = pacientes.create(NewPaciente {
            persona_id: RecordId::new(),
            grupo_sanguineo: "O+".to_owned(),
            alergias: String::new(),
        });
        assert!(matches!(result, Err(StoreError::MissingReference(_))));
    }

    #[test]
    fn create_get_and_count_active() {
        let dir = TempDir::new().expect("Should create temp dir");
        let (personas, pacientes) = setup(&dir);
        let persona_id = a_persona(&personas);

        let paciente = pacientes
            .create(NewPaciente {
                persona_id: persona_id.clone(),
                grupo_sanguineo: " O+ ".to_owned(),
                alergias: "penicilina".to_owned(),
            })
            .expect("Should create paciente");
        assert_eq!(paciente.grupo_sanguineo, "O+");

        let fetched = pacientes.get(&paciente.id).expect("Should fetch");
        assert_eq!(fetched.persona_id, persona_id);
        assert_eq!(pacientes.count_active(), 1);

        pacientes.deactivate(&paciente.id).expect("Should deactivate");
        assert_eq!(pacientes.count_active(), 0);
    }
}
