use anyhow::Result;
use console::{style, Term};
use petrel_core::{ConfigStore, Credentials, Isp};

/// Interactively collect credentials and persist them. Used on first run
/// and when `--reconfigure` is passed.
pub fn collect_and_save(store: &ConfigStore) -> Result<Credentials> {
    let term = Term::stdout();
    term.write_line(&format!(
        "{}",
        style("Enter campus network credentials (stored in plain text)").bold()
    ))?;

    let username = read_nonempty(&term, "Account (student/staff ID): ")?;

    term.write_str("Password: ")?;
    let password = term.read_secure_line()?.trim().to_string();

    term.write_line(
        "Carrier: 1) campus only  2) China Mobile  3) China Unicom  4) China Telecom",
    )?;
    let isp = loop {
        term.write_str("Enter the carrier number: ")?;
        let choice = term.read_line()?;
        match Isp::from_choice(&choice) {
            Some(isp) => break isp,
            None => term.write_line("Invalid choice, enter a number from 1 to 4")?,
        }
    };

    let creds = Credentials {
        username,
        password,
        isp,
    };
    store.save(&creds)?;
    term.write_line(&format!(
        "Saved {} / {} to {}",
        creds.username,
        creds.isp.display_name(),
        store.path().display()
    ))?;
    Ok(creds)
}

fn read_nonempty(term: &Term, prompt: &str) -> Result<String> {
    loop {
        term.write_str(prompt)?;
        let value = term.read_line()?;
        let value = value.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
        term.write_line("Value cannot be empty")?;
    }
}
