//! XRay converter management

use anyhow::Result;
use clap::Args;

use super::render;
use crate::api::ResourceApi;
use crate::console::Console;
use crate::form::ConverterForm;
use crate::model::{ModifyType, ResourceKind};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Command that triggers the conversion, e.g. ".xlvidio"
    pub command: String,

    #[arg(long)]
    pub name: String,

    /// Host the rewritten link points at
    #[arg(long)]
    pub bug_host: String,

    #[arg(short = 'm', long = "modify", value_enum, default_value = "wildcard")]
    pub modify_type: ModifyType,

    #[command(flatten)]
    pub advanced: AdvancedArgs,
}

/// Address templates (custom converters only) and transport overrides
#[derive(Args, Debug, Default)]
pub struct AdvancedArgs {
    #[arg(long)]
    pub server_template: Option<String>,

    #[arg(long)]
    pub host_template: Option<String>,

    #[arg(long)]
    pub sni_template: Option<String>,

    #[arg(long)]
    pub path: Option<String>,

    #[arg(long)]
    pub grpc_service: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Converter to edit
    pub command: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub bug_host: Option<String>,

    #[arg(short = 'm', long = "modify", value_enum)]
    pub modify_type: Option<ModifyType>,

    #[command(flatten)]
    pub advanced: AdvancedArgs,

    /// Drop the port override
    #[arg(long, conflicts_with = "port")]
    pub clear_port: bool,

    #[arg(long)]
    pub active: Option<bool>,
}

impl AdvancedArgs {
    fn apply(self, form: &mut ConverterForm) {
        let fields = [
            (self.server_template, &mut form.server_template),
            (self.host_template, &mut form.host_template),
            (self.sni_template, &mut form.sni_template),
            (self.path, &mut form.path_template),
            (self.grpc_service, &mut form.grpc_service_name),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
        if self.port.is_some() {
            form.port_override = self.port;
        }
    }
}

pub async fn list<A: ResourceApi>(console: &mut Console<A>) -> Result<()> {
    console.refresh(ResourceKind::Converter).await?;
    print!("{}", render::converters(console.mirror().converters()));
    Ok(())
}

pub async fn add<A: ResourceApi>(console: &mut Console<A>, args: AddArgs) -> Result<()> {
    let mut form = ConverterForm {
        display_name: args.name,
        bug_host: args.bug_host,
        ..ConverterForm::new(args.command, args.modify_type)
    };
    args.advanced.apply(&mut form);
    console.submit_converter(form).await?;
    Ok(())
}

pub async fn edit<A: ResourceApi>(console: &mut Console<A>, args: EditArgs) -> Result<()> {
    let mut form = console.converter_form_for_edit(&args.command).await?;

    if let Some(name) = args.name {
        form.display_name = name;
    }
    if let Some(bug_host) = args.bug_host {
        form.bug_host = bug_host;
    }
    if let Some(modify_type) = args.modify_type {
        form.modify_type = modify_type;
    }
    if let Some(active) = args.active {
        form.is_active = active;
    }
    args.advanced.apply(&mut form);
    if args.clear_port {
        form.port_override = None;
    }

    console.submit_converter(form).await?;
    Ok(())
}

pub async fn delete<A: ResourceApi>(console: &mut Console<A>, command: &str) -> Result<()> {
    console.delete(ResourceKind::Converter, command).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advanced_args_only_touch_given_fields() {
        let mut form = ConverterForm {
            path_template: "/vmess".into(),
            port_override: Some(80),
            ..ConverterForm::new(".xl", ModifyType::Ws)
        };
        AdvancedArgs {
            grpc_service: Some("vidio".into()),
            ..AdvancedArgs::default()
        }
        .apply(&mut form);

        assert_eq!(form.path_template, "/vmess");
        assert_eq!(form.grpc_service_name, "vidio");
        assert_eq!(form.port_override, Some(80));
    }
}
