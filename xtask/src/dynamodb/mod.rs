//! DynamoDB infrastructure management commands.

mod client;
mod config;
mod deploy;
mod error;
mod planning;
mod seed;

use error::{DynamodbError, Result};

use crate::prelude::*;
use dialoguer::Confirm;

#[derive(Debug, clap::Parser)]
pub struct DynamodbCommand {
    #[command(subcommand)]
    pub action: DynamodbAction,
}

#[derive(Debug, clap::Subcommand)]
pub enum DynamodbAction {
    /// Deploy or destroy the feed records table.
    Deploy(DeployCommand),

    /// Insert mock feed records.
    Seed(SeedCommand),
}

#[derive(Debug, clap::Parser)]
#[command(long_about = "Deploy or destroy the feed records DynamoDB table.

Creates the table keyed by PersonId and EntryId together with the
PublishedIndex, UpdatedIndex and EntryIndex Global Secondary Indexes.
Missing indexes are added to an existing table.

The command shows a plan of changes before applying and asks for confirmation.

Environment variables:
  TABLE_NAME          - Table to manage (overridden by --table-name)
  AWS_ENDPOINT_URL    - Use local DynamoDB (e.g., http://localhost:8000)
  AWS_REGION          - AWS region (defaults to us-east-1)
  AWS_PROFILE         - AWS profile to use for credentials")]
pub struct DeployCommand {
    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,

    /// Destroy the table instead of creating/updating.
    #[arg(long)]
    pub destroy: bool,

    /// Table name to use.
    #[arg(long, env = "TABLE_NAME", default_value = config::DEFAULT_TABLE_NAME)]
    pub table_name: String,
}

#[derive(Debug, clap::Parser)]
#[command(long_about = "Generate and insert mock feed records into DynamoDB.

Records are published one minute apart going back from now. Feeds,
DML operations and worker types rotate across 25 person ids and roughly
a third of the records are marked as processed.")]
pub struct SeedCommand {
    /// Number of records to generate.
    #[arg(long, default_value = "50")]
    pub count: u32,

    /// Table name to use.
    #[arg(long, env = "TABLE_NAME", default_value = config::DEFAULT_TABLE_NAME)]
    pub table_name: String,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,
}

pub async fn run(command: DynamodbCommand, global: crate::Global) -> Result<()> {
    match command.action {
        DynamodbAction::Deploy(cmd) if cmd.destroy => run_destroy(cmd, &global).await,
        DynamodbAction::Deploy(cmd) => run_deploy(cmd, &global).await,
        DynamodbAction::Seed(cmd) => run_seed(cmd, &global).await,
    }
}

fn confirm(prompt: impl Into<String>, default: bool) -> Result<()> {
    if Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?
    {
        Ok(())
    } else {
        Err(DynamodbError::UserCancelled)
    }
}

async fn connect(global: &crate::Global) -> Result<aws_sdk_dynamodb::Client> {
    let aws_config = client::AwsConfig::default();

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), aws_config.target_display());
    }

    client::create_client(&aws_config).await
}

async fn run_destroy(cmd: DeployCommand, global: &crate::Global) -> Result<()> {
    let dynamo_client = connect(global).await?;
    let current_state = client::get_table_state(&dynamo_client, &cmd.table_name).await?;
    let plan = planning::calculate_destroy_plan(current_state.as_ref(), &cmd.table_name);

    if !global.is_silent() {
        aprintln!();
        aprintln!("{}", p_y("Destroy Plan:"));
        for line in planning::format_destroy_plan(&plan) {
            aprintln!("  {}", p_r(&line));
        }
        aprintln!();
    }

    if matches!(plan, planning::DestroyPlan::AlreadyGone { .. }) {
        if !global.is_silent() {
            aprintln!("{}", p_g("Nothing to destroy."));
        }
        return Ok(());
    }

    if !cmd.force {
        confirm(
            "Are you sure you want to delete this table? ALL DATA WILL BE LOST",
            false,
        )?;
    }

    deploy::execute_destroy_plan(&dynamo_client, &plan).await?;

    if !global.is_silent() {
        aprintln!("{}", p_g("Table destroyed successfully."));
    }
    Ok(())
}

async fn run_deploy(cmd: DeployCommand, global: &crate::Global) -> Result<()> {
    let dynamo_client = connect(global).await?;
    let current_state = client::get_table_state(&dynamo_client, &cmd.table_name).await?;
    let table_config = config::records_table_config().with_table_name(&cmd.table_name);
    let plan = planning::calculate_deploy_plan(current_state.as_ref(), &table_config);

    if !global.is_silent() {
        aprintln!();
        aprintln!("{}", p_c("Deploy Plan:"));
        for line in planning::format_deploy_plan(&plan) {
            let colored = match line.chars().next() {
                Some('+') => p_g(&line),
                Some('~') | Some('!') => p_y(&line),
                _ => line,
            };
            aprintln!("  {}", colored);
        }
        aprintln!();
    }

    if matches!(plan, planning::DeployPlan::NoChanges { .. }) {
        if !global.is_silent() {
            aprintln!("{}", p_g("Infrastructure is up to date."));
        }
        return Ok(());
    }

    if !cmd.force && !matches!(plan, planning::DeployPlan::Busy { .. }) {
        confirm("Apply these changes?", true)?;
    }

    if global.is_verbose() {
        aprintln!("{}", p_b("Applying changes..."));
    }

    deploy::execute_deploy_plan(&dynamo_client, &plan).await?;

    if !global.is_silent() {
        aprintln!("{}", p_g("Infrastructure deployed successfully."));
    }
    Ok(())
}

async fn run_seed(cmd: SeedCommand, global: &crate::Global) -> Result<()> {
    let dynamo_client = connect(global).await?;

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Table:"), cmd.table_name);
        aprintln!("{} {}", p_b("Record count:"), cmd.count);
        aprintln!();
    }

    if client::get_table_state(&dynamo_client, &cmd.table_name)
        .await?
        .is_none()
    {
        return Err(DynamodbError::TableNotFound {
            table_name: cmd.table_name,
        });
    }

    let records = feedrecords_core::record::generate_mock_records(cmd.count, chrono::Utc::now());

    if !global.is_silent() {
        aprintln!("{}", p_c("Records to create:"));
        for record in records.iter().take(5) {
            aprintln!("  {}", seed::describe_record(record));
        }
        if records.len() > 5 {
            aprintln!("  ... and {} more", records.len() - 5);
        }
        aprintln!();
    }

    if !cmd.force {
        confirm(format!("Insert {} records?", records.len()), true)?;
    }

    let inserted = seed::seed_records(&dynamo_client, &cmd.table_name, &records).await?;

    if !global.is_silent() {
        aprintln!("{} {} records inserted.", p_g("Success:"), inserted);
    }
    Ok(())
}
