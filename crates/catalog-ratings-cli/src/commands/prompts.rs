use color_eyre::Result;
use dialoguer::Password;
use std::io::IsTerminal;

/// Prompt for a secret (masked input). Empty input means "leave unchanged".
pub fn prompt_secret(prompt: &str) -> Result<Option<String>> {
    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let value = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read {}: {}", prompt.to_lowercase(), e))?;

    Ok(Some(value).filter(|v| !v.trim().is_empty()))
}
