//! Terminal output for the pkgtools binary.

use console::style;

use crate::manifest::Manifest;

/// Print a styled summary of a manifest document.
pub fn print_manifest_summary(manifest: &Manifest) {
    println!();
    println!(
        "  {} {} {}",
        style(&manifest.name).bold(),
        style("·").dim(),
        manifest.version
    );
    if let Some(homepage) = &manifest.homepage {
        println!("  {} {}", style("Homepage:").bold(), homepage);
    }
    println!(
        "  {} {}",
        style("Post-install actions:").bold(),
        manifest.hooks().len()
    );
    if !manifest.extensions().is_empty() {
        println!(
            "  {} Install hook wired ({} extension entries, {} files, {} dependencies)",
            style("✓").green(),
            manifest.extensions().len(),
            manifest.files().len(),
            manifest.dependencies().len()
        );
    }
    println!();
}
