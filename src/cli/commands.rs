//! Command management

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::render;
use crate::api::ResourceApi;
use crate::console::Console;
use crate::form::CommandForm;
use crate::model::{CommandVariant, ResourceKind};
use crate::upload::FileSelection;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Trigger token, e.g. ".ping"
    pub command: String,

    #[arg(long)]
    pub title: String,

    /// Response type
    #[arg(short = 't', long = "type", value_enum, default_value = "text")]
    pub variant: CommandVariant,

    /// Reply text (text responses)
    #[arg(long)]
    pub text: Option<String>,

    /// File to upload (media responses)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[arg(long)]
    pub caption: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Create the command disabled
    #[arg(long)]
    pub inactive: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Command to edit
    pub command: String,

    /// New trigger token
    #[arg(long)]
    pub rename: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(short = 't', long = "type", value_enum)]
    pub variant: Option<CommandVariant>,

    #[arg(long)]
    pub text: Option<String>,

    /// Replacement file; without one the stored media is kept
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[arg(long)]
    pub caption: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(long)]
    pub active: Option<bool>,
}

pub async fn list<A: ResourceApi>(console: &mut Console<A>) -> Result<()> {
    console.refresh(ResourceKind::Command).await?;
    print!("{}", render::commands(console.mirror().commands()));
    Ok(())
}

pub async fn show<A: ResourceApi>(console: &mut Console<A>, key: &str) -> Result<()> {
    console.refresh(ResourceKind::Command).await?;
    match console.mirror().command(key) {
        Some(command) => print!("{}", render::command_detail(command)),
        None => println!("Command '{}' not found.", key),
    }
    Ok(())
}

pub async fn add<A: ResourceApi>(console: &mut Console<A>, args: AddArgs) -> Result<()> {
    let form = CommandForm {
        title: args.title,
        description: args.description.unwrap_or_default(),
        category: args.category.unwrap_or_default(),
        caption: args.caption.unwrap_or_default(),
        text_content: args.text.unwrap_or_default(),
        file: args.file.map(FileSelection::new),
        is_active: !args.inactive,
        ..CommandForm::new(args.command, args.variant)
    };
    console.submit_command(form).await?;
    Ok(())
}

/// Prefill from the current record, then apply only the flags given
pub async fn edit<A: ResourceApi>(console: &mut Console<A>, args: EditArgs) -> Result<()> {
    let mut form = console.command_form_for_edit(&args.command).await?;

    if let Some(command) = args.rename {
        form.command = command;
    }
    if let Some(title) = args.title {
        form.title = title;
    }
    if let Some(variant) = args.variant {
        form.variant = variant;
    }
    if let Some(text) = args.text {
        form.text_content = text;
    }
    if let Some(caption) = args.caption {
        form.caption = caption;
    }
    if let Some(category) = args.category {
        form.category = category;
    }
    if let Some(description) = args.description {
        form.description = description;
    }
    if let Some(active) = args.active {
        form.is_active = active;
    }
    form.file = args.file.map(FileSelection::new);

    console.submit_command(form).await?;
    Ok(())
}

pub async fn delete<A: ResourceApi>(console: &mut Console<A>, key: &str) -> Result<()> {
    console.delete(ResourceKind::Command, key).await?;
    Ok(())
}
