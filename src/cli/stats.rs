//! Usage statistics

use anyhow::Result;

use super::render;
use crate::api::ResourceApi;
use crate::console::Console;

pub async fn run<A: ResourceApi>(
    console: &mut Console<A>,
    days: Option<u32>,
    top: usize,
    recent: usize,
) -> Result<()> {
    console.refresh_stats(days).await?;
    if let Some(snapshot) = console.mirror().stats() {
        print!("{}", render::stats(snapshot, top, recent));
    }
    Ok(())
}
