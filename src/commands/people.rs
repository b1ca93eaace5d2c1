//! Roster listing and editing command handlers.

use std::collections::BTreeSet;
use std::path::Path;

use roster::Result;
use roster::models::Person;
use roster::services::{NewPerson, RosterService};
use roster::storage::{RosterStore, load_roster, save_roster};

/// Executes the list command.
pub fn cmd_list(store_path: &Path) -> Result<()> {
    let store = load_roster(store_path)?;

    if store.is_empty() {
        println!("Roster is empty ({})", store_path.display());
        return Ok(());
    }

    for person in store.persons() {
        println!("{}", summary_line(person));
    }
    println!();
    println!("{} people", store.len());

    Ok(())
}

/// Executes the add command.
pub fn cmd_add(
    store_path: &Path,
    name: String,
    identity: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    role: Option<String>,
    labels: Option<String>,
) -> Result<()> {
    let mut store = load_roster(store_path)?;

    let request = NewPerson {
        identity,
        name,
        phone: phone.unwrap_or_default(),
        email: email.unwrap_or_default(),
        role: role.unwrap_or_default(),
        labels: parse_labels(labels.as_deref()),
    };
    let identity = RosterService::new(&mut store).add_person(request)?;
    save_roster(store_path, &store)?;

    println!("Added {identity}");
    Ok(())
}

/// Executes the delete command.
pub fn cmd_delete(store_path: &Path, prefix: &str) -> Result<()> {
    let mut store = load_roster(store_path)?;
    let removed = RosterService::new(&mut store).delete_person(prefix)?;
    save_roster(store_path, &store)?;

    println!("Deleted {}", removed.describe());
    Ok(())
}

/// Formats one person for the list command.
fn summary_line(person: &Person) -> String {
    let mut line = person.describe();
    if !person.role.is_empty() {
        line.push_str(&format!(" - {}", person.role));
    }
    if !person.labels.is_empty() {
        let labels: Vec<&str> = person.labels.iter().map(String::as_str).collect();
        line.push_str(&format!(" [{}]", labels.join(", ")));
    }
    if !person.anniversaries.is_empty() {
        line.push_str(&format!(" ({} anniversaries)", person.anniversaries.len()));
    }
    line
}

/// Parses comma-separated labels.
fn parse_labels(labels: Option<&str>) -> BTreeSet<String> {
    labels
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}
