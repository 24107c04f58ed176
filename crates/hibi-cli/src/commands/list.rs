use anyhow::Result;
use hibi_core::repository::Repository;
use hibi_core::view::ViewFilters;

use crate::cli::ListCommand;
use crate::config::Config;
use crate::util::{load_state, resolve_owner_id, today};
use crate::views::table::display_view;

pub async fn list_tasks(repo: &(impl Repository + Sync), command: ListCommand, config: &Config) -> Result<()> {
    let state = load_state(repo, resolve_owner_id(repo, config).await?).await?;

    let filters = ViewFilters {
        hide_done: command.hide_done,
        only_repeating: command.only_repeating,
        hide_repeating: command.hide_repeating,
        only_no_due_date: command.no_due,
    };
    let sort = command.sort.unwrap_or(config.default_sort);

    let view = state.view(&filters, sort, &config.collator());
    tracing::debug!(rows = view.rows.len(), orphans = state.index().orphaned_series().len(), "derived view");

    display_view(&view, command.all, today(config)?);

    Ok(())
}
