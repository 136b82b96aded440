use anyhow::Result;
use dialoguer::Input;
use hyttebok_core::config::HyttebokConfig;
use hyttebok_core::identity::Identity;
use owo_colors::OwoColorize;

pub fn run(name: Option<String>, color: Option<String>) -> Result<()> {
    let mut config = HyttebokConfig::load()?;

    if let Some(profile) = &config.profile {
        println!(
            "Already set up as {}. Edit {} to change the profile.",
            profile.display_name.bold(),
            HyttebokConfig::config_path()?.display()
        );
        return Ok(());
    }

    let name = match name {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("  Your name")
            .interact_text()?,
    };

    let identity = Identity::generate(name, color);
    config.profile = Some(identity.clone());
    config.save()?;

    println!(
        "{}",
        format!("  You're set up as {}", identity.display_name).green()
    );
    println!("  {}", format!("id: {}", identity.id).dimmed());

    Ok(())
}
