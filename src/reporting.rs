//! Clinic-wide dashboard figures, aggregated in memory across tables

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::Result;
use crate::storage::traits::scalar_to_string;
use crate::storage::{Record, Table, TableStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentStats {
    /// Appointments still booked
    pub scheduled: usize,
    /// Appointments moved to the history table
    pub completed: usize,
    /// Booked appointments not yet completed
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveUsers {
    pub clients: usize,
    pub staff: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub appointment_stats: AppointmentStats,
    pub active_users: ActiveUsers,
    pub total_pets: usize,
    pub avg_appointments_per_vet: f64,
}

fn assigned_vet(appointment: &Record) -> Option<String> {
    match appointment.get("id_veterinario") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) if n.as_i64() == Some(0) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(other) => Some(scalar_to_string(other)),
    }
}

impl DashboardStats {
    pub fn compute(
        appointments: &[Record],
        history: &[Record],
        clients: usize,
        staff: usize,
        pets: usize,
    ) -> Self {
        let mut per_vet: HashMap<String, usize> = HashMap::new();
        for vet in appointments.iter().filter_map(assigned_vet) {
            *per_vet.entry(vet).or_insert(0) += 1;
        }

        let avg_appointments_per_vet = if per_vet.is_empty() {
            0.0
        } else {
            per_vet.values().sum::<usize>() as f64 / per_vet.len() as f64
        };

        Self {
            appointment_stats: AppointmentStats {
                scheduled: appointments.len(),
                completed: history.len(),
                // Completing an appointment removes it from the booked table
                pending: appointments.len(),
            },
            active_users: ActiveUsers {
                clients,
                staff,
                total: clients + staff,
            },
            total_pets: pets,
            avg_appointments_per_vet,
        }
    }

    /// Read every table the dashboard needs and aggregate
    pub async fn collect(store: &dyn TableStore) -> Result<Self> {
        let appointments = store.select_all(Table::Citas).await?;
        let history = store.select_all(Table::Historial).await?;
        let clients = store.select_all(Table::Clientes).await?.len();
        let staff = store.select_all(Table::Funcionario).await?.len();
        let pets = store.select_all(Table::Mascotas).await?.len();

        Ok(Self::compute(&appointments, &history, clients, staff, pets))
    }
}
