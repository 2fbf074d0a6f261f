//! The email stack
//!
//! One function behind a public URL, one table it reads and writes, and the
//! grants tying them together. Declaration is pure: nothing here touches the
//! filesystem. The artifact is hashed and packaged later, when the plan is
//! synthesized.

use serde_json::json;
use stackkit::{ConstructPath, ProvisioningPlan, RemovalPolicy, Resource, StackContext};

use crate::config::StackConfig;
use crate::resource::{
    Attribute, AuthType, Code, DefaultPolicy, Function, FunctionUrl, PolicyStatement, Runtime,
    ServiceRole, Table,
};

pub const FUNCTION_CONSTRUCT: &str = "RustLambdaFunction";
pub const TABLE_CONSTRUCT: &str = "EmailsTable";
pub const URL_OUTPUT: &str = "Lambda URL";

const TABLE_ACTIONS: &[&str] = &["dynamodb:Scan", "dynamodb:PutItem"];
const EMAIL_ACTIONS: &[&str] = &["ses:SendEmail"];

/// Target environment described by the config
pub fn context(config: &StackConfig) -> StackContext {
    StackContext::new(&config.stack.name)
        .with_env(config.stack.account.clone(), config.stack.region.clone())
        .with_asset_bucket(config.stack.asset_bucket.clone())
}

/// Declare the stack
///
/// The URL is always public and the table is always destroyed with the
/// stack; only names, the artifact and the runtime come from `config`.
pub fn define(ctx: &StackContext, config: &StackConfig) -> stackkit::Result<ProvisioningPlan> {
    log::debug!("Declaring {} for {}", ctx.stack_name, ctx.environment());

    let mut plan = ProvisioningPlan::new();
    if let Some(description) = &config.stack.description {
        plan = plan.with_description(description);
    }

    let function_scope = ConstructPath::root(FUNCTION_CONSTRUCT);
    let table_scope = ConstructPath::root(TABLE_CONSTRUCT);

    let table = Table::new(
        &table_scope,
        &config.table.name,
        Attribute::new(&config.table.partition_key, config.table.partition_key_type),
        RemovalPolicy::Destroy,
    );

    let role = ServiceRole::for_lambda(&function_scope);
    let mut policy = DefaultPolicy::for_role(&function_scope, role.logical_id());
    policy.add_statement(PolicyStatement::allow(
        TABLE_ACTIONS,
        vec![table.arn().to_value()],
    ));
    policy.add_statement(PolicyStatement::allow(EMAIL_ACTIONS, vec![json!("*")]));

    let mut function = Function::new(
        &function_scope,
        Code::from_asset(config.artifact_path()),
        Runtime::parse(&config.function.runtime),
        &config.function.handler,
        role.logical_id(),
    );
    function.add_dependency(policy.logical_id());

    let url = FunctionUrl::new(&function_scope, function.logical_id(), AuthType::None);
    let permission = url.public_invoke_permission(&function_scope);
    let url_value = url.url();

    plan.add_resource(Box::new(role))?;
    plan.add_resource(Box::new(policy))?;
    plan.add_resource(Box::new(function))?;
    plan.add_resource(Box::new(url))?;
    if let Some(permission) = permission {
        plan.add_resource(Box::new(permission))?;
    }
    plan.add_resource(Box::new(table))?;

    plan.add_output(URL_OUTPUT, url_value)?;

    Ok(plan)
}
