use crate::RetraceContext;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - Failed to set or unset configuration value
/// - Failed to save configuration
pub fn execute(
    ctx: &mut RetraceContext,
    key: Option<&str>,
    value: Option<String>,
    unset: bool,
    list: bool,
) -> Result<()> {
    let Some(key) = key.filter(|_| !list) else {
        show_all_config(ctx);
        return Ok(());
    };

    if unset {
        ctx.config.unset(key)?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Unset {key}"));
    } else if let Some(val) = value {
        ctx.config.set(key, val.clone())?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Set {key} = {val}"));
    } else if let Some(val) = ctx.config.get(key) {
        println!("{val}");
    } else {
        output::warning(&format!("Configuration key '{key}' is not set"));
    }

    Ok(())
}

/// Show all configuration values grouped by section
fn show_all_config(ctx: &RetraceContext) {
    let mut current_section = "";
    for (key, value) in ctx.config.entries() {
        let Some((section, name)) = key.split_once('.') else {
            continue;
        };
        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("{}", format!("[{section}]").bold());
            current_section = section;
        }
        if !value.is_empty() {
            println!("  {name} = {value}");
        }
    }
    output::verbose(&format!("Config file: {}", ctx.config_path.display()));
}
