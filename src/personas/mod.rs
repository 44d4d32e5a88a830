//! Department persona registry.
//!
//! Maps a department name to its chat persona, dashboard template and chart
//! specs. Built once at startup and shared read-only; lookups ignore case.

mod builtin;

use serde::Serialize;

use crate::models::ChartSpec;

/// Voice and scope of a department representative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub system_prompt: &'static str,
}

/// Everything the assistant knows about one department.
#[derive(Debug, Clone)]
pub struct DepartmentProfile {
    pub persona: Persona,
    pub dashboard_template: &'static str,
    pub charts: Vec<ChartSpec>,
}

impl DepartmentProfile {
    pub fn name(&self) -> &'static str {
        self.persona.name
    }
}

/// Public summary returned by GET /api/departments.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentSummary {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

/// Immutable department lookup table.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    departments: Vec<DepartmentProfile>,
}

impl PersonaRegistry {
    pub fn new(departments: Vec<DepartmentProfile>) -> Self {
        Self { departments }
    }

    /// The six departments shipped with the application.
    pub fn builtin() -> Self {
        Self::new(builtin::departments())
    }

    /// Case-insensitive exact match on the department name.
    pub fn get(&self, department: &str) -> Option<&DepartmentProfile> {
        let wanted = department.trim();
        self.departments
            .iter()
            .find(|d| d.name().eq_ignore_ascii_case(wanted))
    }

    pub fn persona(&self, department: &str) -> Option<&Persona> {
        self.get(department).map(|d| &d.persona)
    }

    pub fn dashboard_template(&self, department: &str) -> Option<&'static str> {
        self.get(department).map(|d| d.dashboard_template)
    }

    pub fn chart_specs(&self, department: &str) -> Option<&[ChartSpec]> {
        self.get(department).map(|d| d.charts.as_slice())
    }

    pub fn list(&self) -> Vec<DepartmentSummary> {
        self.departments
            .iter()
            .map(|d| DepartmentSummary {
                name: d.persona.name,
                icon: d.persona.icon,
                description: d.persona.description,
            })
            .collect()
    }
}
