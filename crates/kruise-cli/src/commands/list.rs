//! List command - show what the manifest can deploy

use console::style;
use kruise_core::Catalog;

use crate::error::Result;

/// Run the list command
pub async fn run(debug: bool) -> Result<()> {
    let catalog = super::load(debug).await?;
    print!("{}", render(&catalog));
    Ok(())
}

/// Deployments then profiles, one per line
pub fn render(catalog: &Catalog) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", style("Deployments:").bold()));
    if catalog.deployments().is_empty() {
        out.push_str("  (none)\n");
    }
    for deployment in catalog.deployments() {
        out.push_str(&format!(
            "  {}{}{}\n",
            style(&deployment.name).cyan(),
            aliases(&deployment.aliases),
            describe(&deployment.description.deploy)
        ));
    }

    out.push_str(&format!("\n{}\n", style("Profiles:").bold()));
    if catalog.profiles().is_empty() {
        out.push_str("  (none)\n");
    }
    for profile in catalog.profiles() {
        out.push_str(&format!(
            "  {}{} [{}]{}\n",
            style(&profile.name).cyan(),
            aliases(&profile.aliases),
            profile.items.join(", "),
            describe(&profile.description.deploy)
        ));
    }

    out
}

fn aliases(aliases: &[String]) -> String {
    if aliases.is_empty() {
        String::new()
    } else {
        format!(" ({})", aliases.join(", "))
    }
}

fn describe(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!(" - {}", text)
    }
}
