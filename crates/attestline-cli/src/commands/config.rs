use crate::config::CliConfig;

/// Print the default attestline.toml.
pub fn print_default() -> anyhow::Result<()> {
    print!("{}", CliConfig::default().to_toml_string()?);
    Ok(())
}
