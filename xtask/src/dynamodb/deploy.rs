//! Table deployment operations (Imperative Shell).

use std::time::Duration;

use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode as SdkBillingMode, CreateGlobalSecondaryIndexAction,
    GlobalSecondaryIndex, GlobalSecondaryIndexUpdate, KeySchemaElement, KeyType, Projection,
    ProjectionType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;

use super::client;
use super::config::{BillingMode, GsiConfig, KeyAttribute, TableConfig};
use super::error::{DynamodbError, Result};
use super::planning::{DeployPlan, DestroyPlan};

const ACTIVATION_ATTEMPTS: u32 = 60;
const ACTIVATION_DELAY: Duration = Duration::from_secs(2);

pub async fn execute_deploy_plan(client: &Client, plan: &DeployPlan) -> Result<()> {
    match plan {
        DeployPlan::CreateTable { config } => {
            create_table(client, config).await?;
            wait_for_table_active(client, &config.table_name).await?;
        }
        DeployPlan::AddGsis {
            table_name,
            gsis_to_add,
        } => {
            for gsi in gsis_to_add {
                add_gsi(client, table_name, gsi).await?;
                wait_for_table_active(client, table_name).await?;
            }
        }
        DeployPlan::Busy { table_name, .. } => {
            return Err(DynamodbError::TableBusy {
                table_name: table_name.clone(),
            });
        }
        DeployPlan::NoChanges { .. } => {}
    }
    Ok(())
}

pub async fn execute_destroy_plan(client: &Client, plan: &DestroyPlan) -> Result<()> {
    if let DestroyPlan::DeleteTable { table_name } = plan {
        client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(DynamodbError::sdk)?;
    }
    Ok(())
}

fn key_element(key: &KeyAttribute, key_type: KeyType) -> Result<KeySchemaElement> {
    KeySchemaElement::builder()
        .attribute_name(&key.name)
        .key_type(key_type)
        .build()
        .map_err(DynamodbError::sdk)
}

fn key_schema(
    partition_key: &KeyAttribute,
    sort_key: Option<&KeyAttribute>,
) -> Result<Vec<KeySchemaElement>> {
    let mut schema = vec![key_element(partition_key, KeyType::Hash)?];
    if let Some(sk) = sort_key {
        schema.push(key_element(sk, KeyType::Range)?);
    }
    Ok(schema)
}

/// All key attributes are strings.
fn attribute_definitions<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<AttributeDefinition>> {
    names
        .into_iter()
        .map(|name| {
            AttributeDefinition::builder()
                .attribute_name(name)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(DynamodbError::sdk)
        })
        .collect()
}

fn projection_all() -> Projection {
    Projection::builder()
        .projection_type(ProjectionType::All)
        .build()
}

fn billing_mode(mode: BillingMode) -> SdkBillingMode {
    match mode {
        BillingMode::PayPerRequest => SdkBillingMode::PayPerRequest,
    }
}

async fn create_table(client: &Client, config: &TableConfig) -> Result<()> {
    let gsis = config
        .gsis
        .iter()
        .map(|gsi| {
            GlobalSecondaryIndex::builder()
                .index_name(&gsi.name)
                .set_key_schema(Some(key_schema(
                    &gsi.partition_key,
                    gsi.sort_key.as_ref(),
                )?))
                .projection(projection_all())
                .build()
                .map_err(DynamodbError::sdk)
        })
        .collect::<Result<Vec<_>>>()?;

    client
        .create_table()
        .table_name(&config.table_name)
        .set_key_schema(Some(key_schema(
            &config.partition_key,
            config.sort_key.as_ref(),
        )?))
        .set_attribute_definitions(Some(attribute_definitions(
            config.key_attribute_names(),
        )?))
        .set_global_secondary_indexes((!gsis.is_empty()).then_some(gsis))
        .billing_mode(billing_mode(config.billing_mode))
        .send()
        .await
        .map_err(DynamodbError::sdk)?;

    Ok(())
}

async fn add_gsi(client: &Client, table_name: &str, gsi: &GsiConfig) -> Result<()> {
    let key_names = std::iter::once(gsi.partition_key.name.as_str())
        .chain(gsi.sort_key.as_ref().map(|sk| sk.name.as_str()));

    let create = CreateGlobalSecondaryIndexAction::builder()
        .index_name(&gsi.name)
        .set_key_schema(Some(key_schema(&gsi.partition_key, gsi.sort_key.as_ref())?))
        .projection(projection_all())
        .build()
        .map_err(DynamodbError::sdk)?;

    client
        .update_table()
        .table_name(table_name)
        .set_attribute_definitions(Some(attribute_definitions(key_names)?))
        .global_secondary_index_updates(GlobalSecondaryIndexUpdate::builder().create(create).build())
        .send()
        .await
        .map_err(DynamodbError::sdk)?;

    Ok(())
}

async fn wait_for_table_active(client: &Client, table_name: &str) -> Result<()> {
    for _ in 0..ACTIVATION_ATTEMPTS {
        let state = client::get_table_state(client, table_name).await?;
        if state.is_some_and(|s| s.is_settled()) {
            return Ok(());
        }
        tokio::time::sleep(ACTIVATION_DELAY).await;
    }

    Err(DynamodbError::TableActivationTimeout)
}
