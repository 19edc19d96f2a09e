//! Console rendering of ChangeSets and the interactive confirmation
//! implementation of the [`ConfirmChanges`](crate::check::ConfirmChanges)
//! boundary.

use crate::check::ConfirmChanges;
use crate::reconcile::ChangeSet;
use std::io::{BufRead, Write};

pub fn print_changes(changes: &ChangeSet) {
    println!(
        "{} added, {} modified, {} removed",
        changes.added.len(),
        changes.modified.len(),
        changes.removed.len()
    );

    for line in format_change_lines(changes) {
        println!("{}", line);
    }
}

fn format_change_lines(changes: &ChangeSet) -> Vec<String> {
    let mut lines = Vec::new();

    for (path, digest) in &changes.added {
        lines.push(format!("A  {} ({})", path, truncate_digest(digest)));
    }
    for (path, digests) in &changes.modified {
        lines.push(format!(
            "M  {} ({} -> {})",
            path,
            truncate_digest(&digests.old),
            truncate_digest(&digests.new)
        ));
    }
    for (path, digest) in &changes.removed {
        lines.push(format!("R  {} (was {})", path, truncate_digest(digest)));
    }

    lines
}

fn truncate_digest(digest: &str) -> String {
    if digest.len() > 12 {
        format!("{}...", &digest[..12])
    } else {
        digest.to_string()
    }
}

/// Interactive confirmation over stdin/stdout. Anything other than an
/// affirmative answer declines.
pub struct ConsoleConfirm;

impl ConfirmChanges for ConsoleConfirm {
    fn confirm(&mut self, changes: &ChangeSet) -> std::io::Result<bool> {
        print_changes(changes);

        println!();
        println!("Review the changes above; modified files may indicate corruption.");
        print!("Apply these changes to the digest database? [y/N] ");
        std::io::stdout().flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;

        Ok(is_affirmative(&answer))
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y" | "yes" | "Yes" | "YES")
}
