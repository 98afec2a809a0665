//! Forbidden words per group

use anyhow::Result;

use super::render;
use crate::api::ResourceApi;
use crate::console::Console;
use crate::form::ForbiddenWordForm;

pub async fn list<A: ResourceApi>(console: &mut Console<A>, group_jid: &str) -> Result<()> {
    console.forbidden_words(group_jid).await?;
    print!(
        "{}",
        render::forbidden_words(group_jid, console.mirror().forbidden_words(group_jid))
    );
    Ok(())
}

pub async fn add<A: ResourceApi>(
    console: &mut Console<A>,
    group_jid: String,
    word: String,
) -> Result<()> {
    let form = ForbiddenWordForm {
        group_jid,
        word,
        created_by: String::new(),
    };
    console.add_forbidden_word(form).await?;
    Ok(())
}

pub async fn delete<A: ResourceApi>(console: &mut Console<A>, group_jid: &str, id: i64) -> Result<()> {
    console.delete_forbidden_word(group_jid, id).await?;
    Ok(())
}
