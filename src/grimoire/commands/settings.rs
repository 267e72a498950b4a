use crate::commands::{CmdMessage, CmdResult, SettingsChange};
use crate::error::Result;
use crate::store::{GrimoireStore, KvBackend};
use tracing::info;

/// Applies the present fields of `change` and returns the resulting settings.
/// Without changes this is a read.
pub fn run<B: KvBackend>(store: &GrimoireStore<B>, change: SettingsChange) -> Result<CmdResult> {
    let mut settings = store.get_settings()?;
    let before = settings;
    let requested = change.theme.is_some() || change.language.is_some();
    if let Some(theme) = change.theme {
        settings.theme = theme;
    }
    if let Some(language) = change.language {
        settings.language = language;
    }

    let mut result = CmdResult::default();
    if settings != before {
        store.save_settings(&settings)?;
        info!(theme = %settings.theme, language = %settings.language, "settings changed");
        result.add_message(CmdMessage::success("Settings saved"));
    } else if requested {
        result.add_message(CmdMessage::info("Settings unchanged"));
    }
    Ok(result.with_settings(settings))
}
