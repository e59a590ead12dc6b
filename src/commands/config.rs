use anyhow::Result;
use calibridge_core::config::CalibridgeConfig;
use calibridge_core::ics::export_file_name;
use owo_colors::OwoColorize;

pub fn run(config: &CalibridgeConfig) -> Result<()> {
    let config_path = CalibridgeConfig::config_path()?;

    if !config_path.exists() {
        CalibridgeConfig::create_default_config(&config_path)?;
        println!("{}", format!("Created {}", config_path.display()).green());
        println!();
    }

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Events:     {}", config.data_path()?.display());

    println!();
    println!("{}", "Settings".bold());
    println!("  Default timezone:  {}", config.default_timezone);
    println!("  Import timezone:   {}", config.local_tz()?);
    println!("  Export name:       {}", export_file_name(Some(&config.export_name)));

    Ok(())
}
