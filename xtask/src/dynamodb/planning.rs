//! Pure functions for calculating deployment plans (Functional Core).

use super::config::{GsiConfig, TableConfig};

/// Observed state of an existing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub status: TableStatus,
    pub gsis: Vec<GsiState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsiState {
    pub name: String,
    pub status: GsiStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GsiStatus {
    Active,
    Creating,
    Updating,
    Deleting,
}

impl TableState {
    /// True when the table and all of its indexes accept schema changes.
    pub fn is_settled(&self) -> bool {
        self.status == TableStatus::Active
            && self.gsis.iter().all(|g| g.status == GsiStatus::Active)
    }
}

/// Planned changes for deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployPlan {
    /// Table doesn't exist and will be created with every index.
    CreateTable { config: TableConfig },
    /// Table exists but lacks some indexes. DynamoDB adds one index per update.
    AddGsis {
        table_name: String,
        gsis_to_add: Vec<GsiConfig>,
    },
    /// Table or one of its indexes is still transitioning.
    Busy {
        table_name: String,
        status: TableStatus,
    },
    NoChanges { table_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyPlan {
    DeleteTable { table_name: String },
    AlreadyGone { table_name: String },
}

/// Compares the observed table with the desired configuration.
///
/// Indexes present on the table but absent from the configuration are left
/// alone.
pub fn calculate_deploy_plan(current: Option<&TableState>, desired: &TableConfig) -> DeployPlan {
    let Some(state) = current else {
        return DeployPlan::CreateTable {
            config: desired.clone(),
        };
    };

    let gsis_to_add: Vec<GsiConfig> = desired
        .gsis
        .iter()
        .filter(|gsi| !state.gsis.iter().any(|g| g.name == gsi.name))
        .cloned()
        .collect();

    if gsis_to_add.is_empty() {
        return DeployPlan::NoChanges {
            table_name: desired.table_name.clone(),
        };
    }

    if !state.is_settled() {
        return DeployPlan::Busy {
            table_name: desired.table_name.clone(),
            status: state.status,
        };
    }

    DeployPlan::AddGsis {
        table_name: desired.table_name.clone(),
        gsis_to_add,
    }
}

pub fn calculate_destroy_plan(current: Option<&TableState>, table_name: &str) -> DestroyPlan {
    let table_name = table_name.to_string();
    match current {
        Some(_) => DestroyPlan::DeleteTable { table_name },
        None => DestroyPlan::AlreadyGone { table_name },
    }
}

fn format_gsi(gsi: &GsiConfig, lines: &mut Vec<String>) {
    match &gsi.sort_key {
        Some(sk) => lines.push(format!(
            "  + GSI: {} ({} / {})",
            gsi.name, gsi.partition_key.name, sk.name
        )),
        None => lines.push(format!("  + GSI: {} ({})", gsi.name, gsi.partition_key.name)),
    }
}

/// Human-readable plan lines. The first character marks the change kind
/// (`+` create, `~` update, `-` delete, `!` blocked, `=` nothing to do).
pub fn format_deploy_plan(plan: &DeployPlan) -> Vec<String> {
    match plan {
        DeployPlan::CreateTable { config } => {
            let mut lines = vec![format!("+ Create table: {}", config.table_name)];
            match &config.sort_key {
                Some(sk) => lines.push(format!(
                    "  Primary key: {} (S) / {} (S)",
                    config.partition_key.name, sk.name
                )),
                None => lines.push(format!("  Primary key: {} (S)", config.partition_key.name)),
            }
            for gsi in &config.gsis {
                format_gsi(gsi, &mut lines);
            }
            lines.push("  Billing: PAY_PER_REQUEST".to_string());
            lines
        }
        DeployPlan::AddGsis {
            table_name,
            gsis_to_add,
        } => {
            let mut lines = vec![format!("~ Update table: {table_name}")];
            for gsi in gsis_to_add {
                format_gsi(gsi, &mut lines);
            }
            lines
        }
        DeployPlan::Busy { table_name, status } => vec![format!(
            "! Table '{table_name}' is {status:?}, retry once it is active"
        )],
        DeployPlan::NoChanges { table_name } => {
            vec![format!("= Table '{table_name}' is up to date")]
        }
    }
}

pub fn format_destroy_plan(plan: &DestroyPlan) -> Vec<String> {
    match plan {
        DestroyPlan::DeleteTable { table_name } => {
            vec![format!("- Delete table: {table_name} (ALL DATA WILL BE LOST)")]
        }
        DestroyPlan::AlreadyGone { table_name } => {
            vec![format!("= Table '{table_name}' does not exist")]
        }
    }
}
