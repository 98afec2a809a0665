//! Auto response management

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::render;
use crate::api::ResourceApi;
use crate::console::Console;
use crate::form::AutoResponseForm;
use crate::model::{AutoResponseVariant, ResourceKind};
use crate::upload::FileSelection;

#[derive(Args, Debug)]
pub struct AddArgs {
    pub keyword: String,

    #[arg(short = 't', long = "type", value_enum, default_value = "text")]
    pub variant: AutoResponseVariant,

    #[arg(long)]
    pub text: Option<String>,

    /// Sticker or audio file to upload
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[arg(long)]
    pub inactive: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub keyword: String,

    #[arg(short = 't', long = "type", value_enum)]
    pub variant: Option<AutoResponseVariant>,

    #[arg(long)]
    pub text: Option<String>,

    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[arg(long)]
    pub active: Option<bool>,
}

pub async fn list<A: ResourceApi>(console: &mut Console<A>) -> Result<()> {
    console.refresh(ResourceKind::AutoResponse).await?;
    print!("{}", render::auto_responses(console.mirror().auto_responses()));
    Ok(())
}

pub async fn add<A: ResourceApi>(console: &mut Console<A>, args: AddArgs) -> Result<()> {
    let form = AutoResponseForm {
        text: args.text.unwrap_or_default(),
        file: args.file.map(FileSelection::new),
        is_active: !args.inactive,
        ..AutoResponseForm::new(args.keyword, args.variant)
    };
    console.submit_auto_response(form).await?;
    Ok(())
}

pub async fn edit<A: ResourceApi>(console: &mut Console<A>, args: EditArgs) -> Result<()> {
    let mut form = console.auto_response_form_for_edit(&args.keyword).await?;

    if let Some(variant) = args.variant {
        form.variant = variant;
    }
    if let Some(text) = args.text {
        form.text = text;
    }
    if let Some(active) = args.active {
        form.is_active = active;
    }
    form.file = args.file.map(FileSelection::new);

    console.submit_auto_response(form).await?;
    Ok(())
}

pub async fn delete<A: ResourceApi>(console: &mut Console<A>, keyword: &str) -> Result<()> {
    console.delete(ResourceKind::AutoResponse, keyword).await?;
    Ok(())
}
