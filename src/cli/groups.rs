//! Group commands

use anyhow::Result;

use super::render;
use crate::api::ResourceApi;
use crate::console::Console;
use crate::form::GroupForm;
use crate::model::ResourceKind;

pub async fn list<A: ResourceApi>(console: &mut Console<A>) -> Result<()> {
    console.refresh(ResourceKind::Group).await?;
    print!("{}", render::groups(console.mirror().groups()));
    Ok(())
}

pub async fn add<A: ResourceApi>(
    console: &mut Console<A>,
    jid: String,
    name: String,
    description: Option<String>,
    inactive: bool,
) -> Result<()> {
    let form = GroupForm {
        group_jid: jid,
        group_name: name,
        description: description.unwrap_or_default(),
        is_active: !inactive,
        created_by: String::new(),
    };
    console.add_group(form).await?;
    Ok(())
}

pub async fn set_active<A: ResourceApi>(
    console: &mut Console<A>,
    jid: &str,
    active: bool,
) -> Result<()> {
    console.toggle_group(jid, active).await?;
    Ok(())
}

pub async fn delete<A: ResourceApi>(console: &mut Console<A>, jid: &str) -> Result<()> {
    console.delete(ResourceKind::Group, jid).await?;
    Ok(())
}

/// Groups the bot has joined, with their registration status
pub async fn discover<A: ResourceApi>(console: &mut Console<A>) -> Result<()> {
    console.discover_groups().await?;
    print!("{}", render::discovered(&console.mirror().discovered()));
    Ok(())
}
